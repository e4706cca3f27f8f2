//! Market feed that replays a historical series one candle at a time.

use async_trait::async_trait;
use std::sync::Mutex;
use trading_core::error::DataError;
use trading_core::traits::MarketFeed;
use trading_core::types::{Candle, Series, Timeframe};

/// Replays a [`Series`] as if it were a live kline endpoint.
///
/// Each poll reveals one more candle and returns the latest `limit` candles
/// seen so far. Once the series is exhausted every poll returns the same
/// tail.
pub struct ReplayFeed {
    series: Series,
    cursor: Mutex<usize>,
}

impl ReplayFeed {
    pub fn new(series: Series) -> Self {
        Self {
            series,
            cursor: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Whether every candle has been revealed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor
            .lock()
            .map(|c| *c >= self.series.len())
            .unwrap_or(true)
    }
}

#[async_trait]
impl MarketFeed for ReplayFeed {
    async fn recent_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        if symbol != self.series.symbol() {
            return Ok(Vec::new());
        }

        let mut cursor = self
            .cursor
            .lock()
            .map_err(|_| DataError::ParseError("replay cursor lock poisoned".into()))?;
        *cursor = (*cursor + 1).min(self.series.len());

        let end = *cursor;
        let start = end.saturating_sub(limit);
        Ok(self.series.candles()[start..end].to_vec())
    }

    fn name(&self) -> &str {
        "CSV Replay"
    }
}
