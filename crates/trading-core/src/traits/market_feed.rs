//! Market data feed trait.

use crate::error::DataError;
use crate::types::{Candle, Timeframe};
use async_trait::async_trait;

/// Source of recent closed candles for the live trader.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Fetch up to `limit` of the most recent candles, oldest first.
    ///
    /// An empty vector means nothing is available yet and is not an error.
    async fn recent_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;

    /// Get the feed name.
    fn name(&self) -> &str;
}
