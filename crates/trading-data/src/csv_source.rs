//! CSV series loader.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use trading_core::error::DataError;
use trading_core::types::{Candle, Series, Timeframe};

const TIMESTAMP_COLUMNS: &[&str] = &["Timestamp", "timestamp", "Date", "date", "start_time", "time"];
// Lowercase wins when both are present.
const CLOSE_COLUMNS: &[&str] = &["close", "Close"];

/// Historical candles stored as CSV.
///
/// Only a timestamp column and a close column are required; any other
/// columns are ignored.
pub struct CsvSeriesSource {
    path: PathBuf,
}

impl CsvSeriesSource {
    /// Create a new CSV source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole file as a sorted, de-duplicated series.
    pub fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Series, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::ParseError(e.to_string()))?
            .clone();
        let ts_col = find_column(&headers, TIMESTAMP_COLUMNS)
            .ok_or_else(|| DataError::MissingColumn("Timestamp".into()))?;
        let close_col = find_column(&headers, CLOSE_COLUMNS)
            .ok_or_else(|| DataError::MissingColumn("close".into()))?;

        let mut candles = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| DataError::ParseError(e.to_string()))?;

            let raw_ts = record.get(ts_col).unwrap_or_default();
            let raw_close = record.get(close_col).unwrap_or_default();

            let timestamp = parse_timestamp(raw_ts)?;
            let close = parse_decimal(raw_close).ok_or_else(|| DataError::InvalidPrice {
                row,
                value: raw_close.to_string(),
            })?;

            candles.push(Candle::new(timestamp, close));
        }

        if candles.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        let series = Series::new(symbol, timeframe, candles)?;
        debug!(
            path = %self.path.display(),
            candles = series.len(),
            "Loaded series"
        );
        Ok(series)
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parse the timestamp formats found in exported kline files.
///
/// Accepts RFC 3339, `YYYY-mm-dd HH:MM:SS` with optional fractional seconds
/// and offset, several date-only forms, and unix seconds or milliseconds.
/// Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DataError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.and_utc());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc());
        }
    }

    if let Ok(ts) = raw.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        let parsed = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        if let Some(dt) = parsed {
            return Ok(dt);
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse timestamp: {}",
        raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-15 10:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00+00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00.000").unwrap(), expected);
        assert_eq!(parse_timestamp("1705314600000").unwrap(), expected);
        assert_eq!(parse_timestamp("1705314600").unwrap(), expected);
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_sorts_and_accepts_capitalized_close() {
        let file = csv_file(
            "Timestamp,Open,Close\n\
             2024-01-01 00:02:00,1,102.5\n\
             2024-01-01 00:00:00,1,100\n\
             2024-01-01 00:01:00,1,101\n",
        );

        let series = CsvSeriesSource::new(file.path())
            .unwrap()
            .load("BTCUSDT", Timeframe::Minute1)
            .unwrap();

        let closes: Vec<Decimal> = series.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![dec!(100), dec!(101), dec!(102.5)]);
        assert_eq!(series.symbol(), "BTCUSDT");
    }

    #[test]
    fn test_lowercase_close_preferred() {
        let file = csv_file("timestamp,Close,close\n1700000000,1,2\n");
        let series = CsvSeriesSource::new(file.path())
            .unwrap()
            .load("BTCUSDT", Timeframe::Minute1)
            .unwrap();
        assert_eq!(series.first().unwrap().close, dec!(2));
    }

    #[test]
    fn test_missing_close_column() {
        let file = csv_file("Timestamp,open\n2024-01-01,1\n");
        let err = CsvSeriesSource::new(file.path())
            .unwrap()
            .load("BTCUSDT", Timeframe::Minute1)
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "close"));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvSeriesSource::new("/definitely/not/here.csv").err().unwrap();
        assert!(matches!(err, DataError::FileNotFound(_)));
    }

    #[test]
    fn test_bad_close_reports_row() {
        let file = csv_file("Timestamp,close\n2024-01-01,100\n2024-01-02,abc\n");
        let err = CsvSeriesSource::new(file.path())
            .unwrap()
            .load("BTCUSDT", Timeframe::Daily)
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidPrice { row: 1, .. }));
    }

    #[test]
    fn test_header_only_file_has_no_data() {
        let file = csv_file("Timestamp,close\n");
        let err = CsvSeriesSource::new(file.path())
            .unwrap()
            .load("BTCUSDT", Timeframe::Minute1)
            .unwrap_err();
        assert!(matches!(err, DataError::NoDataAvailable));
    }
}
