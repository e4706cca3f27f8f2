//! Historical data: CSV loading, file-name metadata and replay feeds.

mod csv_source;
mod naming;
mod replay_feed;

pub use csv_source::{parse_timestamp, CsvSeriesSource};
pub use naming::DataFileName;
pub use replay_feed::ReplayFeed;

use std::path::Path;
use trading_core::error::DataError;
use trading_core::types::{Series, Timeframe};

/// Load a series from a CSV file.
pub fn load_series(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Series, DataError> {
    CsvSeriesSource::new(path)?.load(symbol, timeframe)
}
