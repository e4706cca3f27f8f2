//! Candle interval.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval. Exchange kline intervals are expressed in minutes, so
/// every variant except the calendar ones has a minute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[default]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
}

impl Timeframe {
    /// Interval length in minutes.
    pub fn as_minutes(&self) -> u32 {
        match self {
            Timeframe::Minute1 => 1,
            Timeframe::Minute3 => 3,
            Timeframe::Minute5 => 5,
            Timeframe::Minute15 => 15,
            Timeframe::Minute30 => 30,
            Timeframe::Hour1 => 60,
            Timeframe::Hour2 => 120,
            Timeframe::Hour4 => 240,
            Timeframe::Hour6 => 360,
            Timeframe::Hour12 => 720,
            Timeframe::Daily => 1440,
            Timeframe::Weekly => 10080,
        }
    }

    pub fn as_secs(&self) -> u64 {
        u64::from(self.as_minutes()) * 60
    }

    /// Map a minute count (as found in data file names like `BTCUSDT_60m_...`)
    /// back to an interval.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::all().iter().copied().find(|tf| tf.as_minutes() == minutes)
    }

    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Minute1,
            Timeframe::Minute3,
            Timeframe::Minute5,
            Timeframe::Minute15,
            Timeframe::Minute30,
            Timeframe::Hour1,
            Timeframe::Hour2,
            Timeframe::Hour4,
            Timeframe::Hour6,
            Timeframe::Hour12,
            Timeframe::Daily,
            Timeframe::Weekly,
        ]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour12 => "12h",
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "1h" | "hour" => return Ok(Timeframe::Hour1),
            "2h" => return Ok(Timeframe::Hour2),
            "4h" => return Ok(Timeframe::Hour4),
            "6h" => return Ok(Timeframe::Hour6),
            "12h" => return Ok(Timeframe::Hour12),
            "1d" | "d" | "day" | "daily" => return Ok(Timeframe::Daily),
            "1w" | "w" | "week" | "weekly" => return Ok(Timeframe::Weekly),
            _ => {}
        }

        // "15", "15m" and "15min" all mean fifteen minutes
        let digits = lower
            .strip_suffix("min")
            .or_else(|| lower.strip_suffix('m'))
            .unwrap_or(&lower);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Timeframe::from_minutes)
            .ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_round_trip_through_all() {
        for tf in Timeframe::all() {
            assert_eq!(Timeframe::from_minutes(tf.as_minutes()), Some(*tf));
        }
        assert_eq!(Timeframe::from_minutes(7), None);
    }

    #[test]
    fn test_parse_minute_forms() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("15").unwrap(), Timeframe::Minute15);
        assert_eq!(Timeframe::from_str("60m").unwrap(), Timeframe::Hour1);
        assert_eq!(Timeframe::from_str("240min").unwrap(), Timeframe::Hour4);
        assert_eq!(Timeframe::from_str("D").unwrap(), Timeframe::Daily);
        assert!(Timeframe::from_str("7m").is_err());
        assert!(Timeframe::from_str("fortnight").is_err());
    }

    #[test]
    fn test_display_and_secs() {
        assert_eq!(Timeframe::Minute5.to_string(), "5m");
        assert_eq!(Timeframe::Hour1.as_secs(), 3600);
        assert_eq!(Timeframe::default(), Timeframe::Minute1);
    }
}
