//! Audit trail records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Side;

/// What a journal row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// First row of a backtest session.
    #[serde(rename = "START_BACKTEST")]
    StartBacktest,
    /// First row of a live or paper session.
    #[serde(rename = "LIVE_TRADE_INIT")]
    StartLive,
    OpenPosition,
    ClosePosition,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::StartBacktest => "START_BACKTEST",
            TradeAction::StartLive => "LIVE_TRADE_INIT",
            TradeAction::OpenPosition => "OPEN_POSITION",
            TradeAction::ClosePosition => "CLOSE_POSITION",
        };
        write!(f, "{}", s)
    }
}

/// Outcome recorded alongside an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Initialized,
    ExecutedLong,
    ExecutedShort,
    ClosedLong,
    ClosedShort,
    /// Forced liquidation after the last candle.
    ClosedAtEnd,
    /// Live order accepted by the exchange, fill not confirmed.
    Submitted,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStatus::Initialized => "INITIALIZED",
            TradeStatus::ExecutedLong => "EXECUTED_LONG",
            TradeStatus::ExecutedShort => "EXECUTED_SHORT",
            TradeStatus::ClosedLong => "CLOSED_LONG",
            TradeStatus::ClosedShort => "CLOSED_SHORT",
            TradeStatus::ClosedAtEnd => "CLOSED_AT_END",
            TradeStatus::Submitted => "SUBMITTED",
        };
        write!(f, "{}", s)
    }
}

/// One immutable row of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    /// `None` on session-start rows.
    pub side: Option<Side>,
    pub quantity: Decimal,
    pub price: Decimal,
    pub pnl: Decimal,
    pub commission: Decimal,
    pub balance_after: Decimal,
    /// `None` on session-start rows.
    pub order_id: Option<String>,
    pub status: TradeStatus,
    pub is_backtest: bool,
}

impl TradeRecord {
    /// Session-start row carrying the starting balance.
    pub fn session_start(
        timestamp: DateTime<Utc>,
        symbol: impl Into<String>,
        balance: Decimal,
        is_backtest: bool,
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            action: if is_backtest {
                TradeAction::StartBacktest
            } else {
                TradeAction::StartLive
            },
            side: None,
            quantity: Decimal::ZERO,
            price: Decimal::ZERO,
            pnl: Decimal::ZERO,
            commission: Decimal::ZERO,
            balance_after: balance,
            order_id: None,
            status: TradeStatus::Initialized,
            is_backtest,
        }
    }

    pub fn is_order(&self) -> bool {
        matches!(
            self.action,
            TradeAction::OpenPosition | TradeAction::ClosePosition
        )
    }
}
