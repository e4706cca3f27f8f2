//! Strategy signals and the signal/position transition table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Position, PositionSide, Side, TradeAction, TradeStatus};

/// Output of a strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    /// Evaluated, nothing to do.
    Hold,
    /// Not enough history to evaluate yet.
    Wait,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Signal::Buy | Signal::Sell)
    }

    /// Orders needed to bring `position` in line with this signal.
    ///
    /// A reversal yields the close leg first, sized to the whole open
    /// position, followed by an open leg of `trade_quantity`.
    pub fn plan(&self, position: &Position, trade_quantity: Decimal) -> Vec<OrderIntent> {
        let target = match self {
            Signal::Buy => PositionSide::Long,
            Signal::Sell => PositionSide::Short,
            Signal::Hold | Signal::Wait => return Vec::new(),
        };

        let current = if position.is_flat() {
            PositionSide::Flat
        } else {
            position.side
        };

        if current == target {
            return Vec::new();
        }

        let mut intents = Vec::with_capacity(2);
        if let Some(close_side) = current.closing_side() {
            intents.push(OrderIntent::close(close_side, position.size, current));
        }
        intents.push(OrderIntent::open(target, trade_quantity));
        intents
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::Wait => "WAIT",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Signal::Buy),
            "SELL" => Ok(Signal::Sell),
            "HOLD" => Ok(Signal::Hold),
            "WAIT" => Ok(Signal::Wait),
            other => Err(format!("Invalid signal: {}", other)),
        }
    }
}

/// One order the engine or live trader must submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub side: Side,
    pub quantity: Decimal,
    pub action: TradeAction,
    pub status: TradeStatus,
}

impl OrderIntent {
    fn close(side: Side, quantity: Decimal, closing: PositionSide) -> Self {
        let status = match closing {
            PositionSide::Short => TradeStatus::ClosedShort,
            _ => TradeStatus::ClosedLong,
        };
        Self {
            side,
            quantity,
            action: TradeAction::ClosePosition,
            status,
        }
    }

    fn open(target: PositionSide, quantity: Decimal) -> Self {
        let (side, status) = match target {
            PositionSide::Short => (Side::Sell, TradeStatus::ExecutedShort),
            _ => (Side::Buy, TradeStatus::ExecutedLong),
        };
        Self {
            side,
            quantity,
            action: TradeAction::OpenPosition,
            status,
        }
    }

    pub fn is_close(&self) -> bool {
        self.action == TradeAction::ClosePosition
    }
}
