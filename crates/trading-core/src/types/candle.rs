//! Candle and series types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::DataError;

/// A single closed candle. Only the close is carried; strategies that need
/// more than the close are out of scope for the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self { timestamp, close }
    }
}

/// An ordered candle series for one symbol.
///
/// Timestamps are strictly increasing and every close is positive. Both are
/// established by [`Series::new`] and never change afterwards; the series
/// hands out shared slices only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
    symbol: String,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

/// Wire form of a [`Series`]; deserialization goes through [`Series::new`].
#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl TryFrom<RawSeries> for Series {
    type Error = DataError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Series::new(raw.symbol, raw.timeframe, raw.candles)
    }
}

impl Series {
    /// Build a series from raw rows in any order.
    ///
    /// Rows are sorted by timestamp. When two rows share a timestamp the one
    /// appearing later in the input wins.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        mut candles: Vec<Candle>,
    ) -> Result<Self, DataError> {
        if let Some((row, bad)) = candles
            .iter()
            .enumerate()
            .find(|(_, c)| c.close <= Decimal::ZERO)
        {
            return Err(DataError::InvalidPrice {
                row,
                value: bad.close.to_string(),
            });
        }

        // Stable sort keeps input order among equal timestamps.
        candles.sort_by_key(|c| c.timestamp);

        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            candles: deduped,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Causal view: candles `0..=index`. Panics if `index` is out of bounds.
    pub fn prefix(&self, index: usize) -> &[Candle] {
        &self.candles[..=index]
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()
    }

    #[test]
    fn test_series_sorts_ascending() {
        let series = Series::new(
            "BTCUSDT",
            Timeframe::Minute1,
            vec![
                Candle::new(at(2), dec!(102)),
                Candle::new(at(0), dec!(100)),
                Candle::new(at(1), dec!(101)),
            ],
        )
        .unwrap();

        let closes: Vec<Decimal> = series.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![dec!(100), dec!(101), dec!(102)]);
        assert!(series
            .candles()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_duplicate_timestamp_keeps_last_row() {
        let series = Series::new(
            "BTCUSDT",
            Timeframe::Minute1,
            vec![
                Candle::new(at(0), dec!(100)),
                Candle::new(at(1), dec!(101)),
                Candle::new(at(1), dec!(111)),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, dec!(111));
    }

    #[test]
    fn test_non_positive_close_rejected() {
        let err = Series::new(
            "BTCUSDT",
            Timeframe::Minute1,
            vec![Candle::new(at(0), dec!(100)), Candle::new(at(1), dec!(0))],
        )
        .unwrap_err();

        assert!(matches!(err, DataError::InvalidPrice { row: 1, .. }));
    }

    #[test]
    fn test_deserialize_validates_rows() {
        let json = serde_json::json!({
            "symbol": "BTCUSDT",
            "timeframe": "1m",
            "candles": [
                { "timestamp": "2024-01-01T00:01:00Z", "close": "101" },
                { "timestamp": "2024-01-01T00:00:00Z", "close": "100" },
                { "timestamp": "2024-01-01T00:01:00Z", "close": "111" }
            ]
        });
        let series: Series = serde_json::from_value(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().timestamp, at(0));
        assert_eq!(series.last().unwrap().close, dec!(111));

        let bad = serde_json::json!({
            "symbol": "BTCUSDT",
            "timeframe": "1m",
            "candles": [{ "timestamp": "2024-01-01T00:00:00Z", "close": "-5" }]
        });
        assert!(serde_json::from_value::<Series>(bad).is_err());
    }

    #[test]
    fn test_prefix_is_causal() {
        let candles: Vec<Candle> = (0..5).map(|m| Candle::new(at(m), dec!(100))).collect();
        let series = Series::new("ETHUSDT", Timeframe::Minute1, candles).unwrap();

        assert_eq!(series.prefix(0).len(), 1);
        assert_eq!(series.prefix(3).len(), 4);
        assert_eq!(series.prefix(3).last().unwrap().timestamp, at(3));
    }
}
