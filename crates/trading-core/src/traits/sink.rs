//! Audit trail sink.

use crate::error::JournalError;
use crate::types::TradeRecord;

/// Append-only writer for [`TradeRecord`]s.
///
/// A sink is built once per run and handed to the engine or live trader.
/// Records arrive in emission order and are never rewritten.
pub trait TradeSink: Send {
    fn record(&mut self, record: &TradeRecord) -> Result<(), JournalError>;
}

impl<T: TradeSink + ?Sized> TradeSink for &mut T {
    fn record(&mut self, record: &TradeRecord) -> Result<(), JournalError> {
        (**self).record(record)
    }
}

/// Sink that keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTradeSink {
    records: Vec<TradeRecord>,
}

impl MemoryTradeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Only the order rows, skipping the session-start row.
    pub fn orders(&self) -> impl Iterator<Item = &TradeRecord> {
        self.records.iter().filter(|r| r.is_order())
    }
}

impl TradeSink for MemoryTradeSink {
    fn record(&mut self, record: &TradeRecord) -> Result<(), JournalError> {
        self.records.push(record.clone());
        Ok(())
    }
}
