//! Strategy that replays a fixed list of signals.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{SignalStrategy, StrategyConfig},
    types::{Candle, Signal},
};

/// Configuration for the scripted strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedConfig {
    /// Signal for each candle index; candles past the end get HOLD
    pub signals: Vec<Signal>,
}

impl StrategyConfig for ScriptedConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        Ok(())
    }
}

/// Emits `signals[i]` for the history ending at candle `i`.
///
/// The answer depends only on the history length, so repeated evaluation of
/// the same history always agrees.
#[derive(Debug, Clone)]
pub struct ScriptedStrategy {
    config: ScriptedConfig,
}

impl ScriptedStrategy {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self::from_config(ScriptedConfig { signals })
    }

    pub fn from_config(config: ScriptedConfig) -> Self {
        Self { config }
    }

    pub fn signals(&self) -> &[Signal] {
        &self.config.signals
    }
}

impl SignalStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn description(&self) -> &str {
        "Replays a configured list of signals by candle index"
    }

    fn needs_full_history(&self) -> bool {
        true
    }

    fn evaluate(&self, history: &[Candle]) -> Signal {
        match history.len() {
            0 => Signal::Wait,
            n => self
                .config
                .signals
                .get(n - 1)
                .copied()
                .unwrap_or(Signal::Hold),
        }
    }
}
