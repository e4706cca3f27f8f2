//! Strategy backed by signals computed elsewhere.
//!
//! Reads a CSV with `timestamp,signal` columns and answers with the signal
//! stored for the newest candle in the history.

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;
use trading_core::{
    error::StrategyError,
    traits::{SignalStrategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_data::parse_timestamp;

/// Configuration for the signal file strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalFileConfig {
    /// CSV with `timestamp` and `signal` columns
    pub path: PathBuf,
    /// Candles required before looking anything up
    pub warmup: usize,
}

impl Default for SignalFileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/signals.csv"),
            warmup: 1,
        }
    }
}

impl StrategyConfig for SignalFileConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.path.as_os_str().is_empty() {
            return Err(StrategyError::InvalidConfig("Signal file path is empty".into()));
        }
        if self.warmup == 0 {
            return Err(StrategyError::InvalidConfig(
                "Warmup must be at least one candle".into(),
            ));
        }
        Ok(())
    }
}

/// Looks signals up by candle timestamp.
pub struct SignalFileStrategy {
    config: SignalFileConfig,
    signals: BTreeMap<DateTime<Utc>, Signal>,
}

impl SignalFileStrategy {
    /// Load the signal file named in `config`.
    pub fn load(config: SignalFileConfig) -> Result<Self, StrategyError> {
        config.validate()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&config.path)
            .map_err(|e| {
                StrategyError::InitializationFailed(format!(
                    "{}: {}",
                    config.path.display(),
                    e
                ))
            })?;

        let headers = reader
            .headers()
            .map_err(|e| StrategyError::InitializationFailed(e.to_string()))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    StrategyError::InitializationFailed(format!("missing column '{}'", name))
                })
        };
        let ts_col = column("timestamp")?;
        let signal_col = column("signal")?;

        let mut signals = BTreeMap::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| StrategyError::InitializationFailed(e.to_string()))?;
            let timestamp = parse_timestamp(record.get(ts_col).unwrap_or_default())
                .map_err(|e| StrategyError::InitializationFailed(format!("row {}: {}", row, e)))?;
            let signal: Signal = record
                .get(signal_col)
                .unwrap_or_default()
                .parse()
                .map_err(|e| StrategyError::InitializationFailed(format!("row {}: {}", row, e)))?;
            signals.insert(timestamp, signal);
        }

        info!(path = %config.path.display(), signals = signals.len(), "Loaded signal file");

        Ok(Self { config, signals })
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl SignalStrategy for SignalFileStrategy {
    fn name(&self) -> &str {
        "signal_file"
    }

    fn description(&self) -> &str {
        "Replays precomputed signals keyed by candle timestamp"
    }

    fn evaluate(&self, history: &[Candle]) -> Signal {
        if !self.is_warmed_up(history.len()) {
            return Signal::Wait;
        }
        history
            .last()
            .and_then(|c| self.signals.get(&c.timestamp))
            .copied()
            .unwrap_or(Signal::Hold)
    }

    fn warmup_period(&self) -> usize {
        self.config.warmup
    }
}
