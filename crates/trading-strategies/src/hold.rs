//! Strategy that never trades.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{SignalStrategy, StrategyConfig},
    types::{Candle, Signal},
};

/// Configuration for the hold strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    /// Candles required before answering HOLD instead of WAIT
    pub warmup: usize,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self { warmup: 1 }
    }
}

impl StrategyConfig for HoldConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.warmup == 0 {
            return Err(StrategyError::InvalidConfig(
                "Warmup must be at least one candle".into(),
            ));
        }
        Ok(())
    }
}

/// Answers HOLD once warmed up. Useful as a baseline and for dry runs of the
/// journal and reporting path.
pub struct HoldStrategy {
    config: HoldConfig,
}

impl HoldStrategy {
    pub fn new(config: HoldConfig) -> Self {
        Self { config }
    }
}

impl Default for HoldStrategy {
    fn default() -> Self {
        Self::new(HoldConfig::default())
    }
}

impl SignalStrategy for HoldStrategy {
    fn name(&self) -> &str {
        "hold"
    }

    fn description(&self) -> &str {
        "Never trades; emits HOLD once warmed up"
    }

    fn evaluate(&self, history: &[Candle]) -> Signal {
        if self.is_warmed_up(history.len()) {
            Signal::Hold
        } else {
            Signal::Wait
        }
    }

    fn warmup_period(&self) -> usize {
        self.config.warmup
    }
}
