//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{Candle, Signal};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// A signal strategy.
///
/// Strategies are evaluated against the candle history seen so far and hold
/// no mutable state between calls: the same history always yields the same
/// signal. The history is a shared slice, so a strategy cannot alter what the
/// caller or later evaluations see.
pub trait SignalStrategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate the history, oldest candle first, newest last.
    ///
    /// Returns [`Signal::Wait`] while the history is shorter than the
    /// strategy needs.
    fn evaluate(&self, history: &[Candle]) -> Signal;

    /// Number of candles needed before the strategy emits anything but WAIT.
    fn warmup_period(&self) -> usize {
        1
    }

    /// Check whether `len` candles are enough to evaluate.
    fn is_warmed_up(&self, len: usize) -> bool {
        len >= self.warmup_period()
    }

    /// Whether the answer depends on how many candles precede the newest.
    ///
    /// Pollers that normally fetch a capped window hand such strategies every
    /// candle the feed holds, so a poll sees the same history a replay would.
    fn needs_full_history(&self) -> bool {
        false
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

impl<S: SignalStrategy + ?Sized> SignalStrategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, history: &[Candle]) -> Signal {
        (**self).evaluate(history)
    }

    fn warmup_period(&self) -> usize {
        (**self).warmup_period()
    }

    fn needs_full_history(&self) -> bool {
        (**self).needs_full_history()
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
