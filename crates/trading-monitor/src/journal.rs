//! CSV trade journal.
//!
//! One file per session, named after the symbol and the session start time.
//! The file is created on the first record, so a run that fails before
//! trading leaves nothing behind.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use trading_core::error::JournalError;
use trading_core::traits::TradeSink;
use trading_core::types::TradeRecord;

/// Column header written before the first row.
pub const JOURNAL_HEADER: [&str; 10] = [
    "Timestamp",
    "Symbol",
    "Action",
    "Side",
    "Quantity",
    "Price",
    "PNL",
    "BalanceAfterTrade",
    "OrderID",
    "Status",
];

const NOT_APPLICABLE: &str = "N/A";

/// Session type, which selects the file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalKind {
    Backtest,
    Live,
}

impl JournalKind {
    fn prefix(&self) -> &'static str {
        match self {
            JournalKind::Backtest => "backtest_log",
            JournalKind::Live => "live_trade_log",
        }
    }
}

/// [`TradeSink`] writing one CSV file per session.
pub struct CsvTradeJournal {
    folder: PathBuf,
    kind: JournalKind,
    session_start: DateTime<Local>,
    writer: Option<csv::Writer<File>>,
    path: Option<PathBuf>,
}

impl CsvTradeJournal {
    pub fn new(folder: impl Into<PathBuf>, kind: JournalKind) -> Self {
        Self {
            folder: folder.into(),
            kind,
            session_start: Local::now(),
            writer: None,
            path: None,
        }
    }

    /// Override the session start used in the file name.
    pub fn with_session_start(mut self, start: DateTime<Local>) -> Self {
        self.session_start = start;
        self
    }

    /// Path of the session file, once the first record has been written.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn open(&mut self, symbol: &str) -> Result<&mut csv::Writer<File>, JournalError> {
        if self.writer.is_none() {
            fs::create_dir_all(&self.folder)?;

            let stem = format!(
                "{}_{}_{}",
                self.kind.prefix(),
                symbol,
                self.session_start.format("%Y-%m-%d_%H-%M-%S")
            );
            let (file, path) = create_fresh(&self.folder, &stem)?;

            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(JOURNAL_HEADER).map_err(write_error)?;
            writer.flush()?;

            info!(path = %path.display(), "Trade journal created");
            self.path = Some(path);
            self.writer = Some(writer);
        }

        self.writer
            .as_mut()
            .ok_or_else(|| JournalError::Write("journal writer unavailable".into()))
    }
}

impl TradeSink for CsvTradeJournal {
    fn record(&mut self, record: &TradeRecord) -> Result<(), JournalError> {
        let row = [
            record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            record.symbol.clone(),
            record.action.to_string(),
            record
                .side
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            format_amount(record.quantity, 8),
            format_amount(record.price, 2),
            format_amount(record.pnl, 2),
            format_amount(record.balance_after, 2),
            record
                .order_id
                .clone()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            record.status.to_string(),
        ];

        let writer = self.open(&record.symbol)?;
        writer.write_record(&row).map_err(write_error)?;
        writer.flush()?;
        Ok(())
    }
}

/// Create `<stem>.csv` in `folder`, or `<stem>_<n>.csv` if that name is
/// already taken.
fn create_fresh(folder: &Path, stem: &str) -> Result<(File, PathBuf), JournalError> {
    for attempt in 0..1000u32 {
        let name = if attempt == 0 {
            format!("{}.csv", stem)
        } else {
            format!("{}_{}.csv", stem, attempt)
        };
        let path = folder.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(JournalError::Write(format!(
        "no free journal file name for {}",
        stem
    )))
}

/// Round to `dp` places and drop trailing zeros.
fn format_amount(value: Decimal, dp: u32) -> String {
    value.round_dp(dp).normalize().to_string()
}

fn write_error(e: csv::Error) -> JournalError {
    JournalError::Write(e.to_string())
}
