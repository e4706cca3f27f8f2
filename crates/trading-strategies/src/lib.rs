//! Signal strategies that need no indicator math.
//!
//! - Hold: never trades
//! - Scripted: a fixed signal per candle index
//! - Signal file: precomputed signals looked up by timestamp

mod hold;
mod registry;
mod scripted;
mod signal_file;

pub use hold::{HoldConfig, HoldStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use scripted::{ScriptedConfig, ScriptedStrategy};
pub use signal_file::{SignalFileConfig, SignalFileStrategy};
