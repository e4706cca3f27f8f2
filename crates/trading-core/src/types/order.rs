//! Order side, fill requests and execution reports.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A market fill request. Quantity and price are expected to be positive;
/// the execution client rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Fill {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            timestamp,
        }
    }
}

/// How a fill was applied to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    /// Opened a position from flat.
    Open,
    /// Added to an existing position on the same side.
    Extend,
    /// Reduced an opposite position. `full` is set when it ended flat.
    Close { full: bool },
}

impl FillKind {
    pub fn is_close(&self) -> bool {
        matches!(self, FillKind::Close { .. })
    }
}

/// Result of a successful execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order_id: String,
    pub kind: FillKind,
    /// Quantity actually applied. Closes are clamped to the open size.
    pub filled_quantity: Decimal,
    /// Realized PnL; zero for opens and extends. Live clients report an
    /// estimate.
    pub pnl: Decimal,
    pub commission: Decimal,
    pub balance_after: Decimal,
}
