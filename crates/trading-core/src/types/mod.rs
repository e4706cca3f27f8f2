//! Core data types for the signal harness.

mod candle;
mod order;
mod position;
mod signal;
mod timeframe;
mod trade;

pub use candle::{Candle, Series};
pub use order::{ExecutionReport, Fill, FillKind, Side};
pub use position::{Account, Position, PositionSide, POSITION_EPSILON};
pub use signal::{OrderIntent, Signal};
pub use timeframe::Timeframe;
pub use trade::{TradeAction, TradeRecord, TradeStatus};
