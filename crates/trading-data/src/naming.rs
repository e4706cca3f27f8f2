//! Metadata carried in historical data file names.
//!
//! Downloaded files are named `<SYMBOL>_<minutes>m_<anything>.csv`, for
//! example `BTCUSDT_15m_2024-01-01_to_2024-02-01.csv`.

use std::path::Path;
use trading_core::types::Timeframe;

/// Symbol and interval parsed from a data file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileName {
    pub symbol: String,
    pub interval_minutes: u32,
}

impl DataFileName {
    /// Interval as a [`Timeframe`], if it is one the harness knows.
    pub fn timeframe(&self) -> Option<Timeframe> {
        Timeframe::from_minutes(self.interval_minutes)
    }

    /// Parse the final component of `path`. Returns `None` when the name
    /// does not follow the convention.
    pub fn parse(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let stem = name.strip_suffix(".csv")?;

        let mut parts = stem.splitn(3, '_');
        let symbol = parts.next()?;
        let interval = parts.next()?;
        // The trailing segment may be empty but the separator must exist.
        parts.next()?;

        if symbol.len() < 2 || !symbol.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }

        let digits = interval.strip_suffix('m')?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            symbol: symbol.to_string(),
            interval_minutes: digits.parse().ok()?,
        })
    }
}
