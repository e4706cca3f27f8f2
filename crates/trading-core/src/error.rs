//! Error types for the signal harness.

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{PositionSide, Side};

/// Top-level error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Strategy initialization failed: {0}")]
    InitializationFailed(String),
}

/// Ledger invariant violations.
///
/// These are never expected while the transition table is followed. Seeing one
/// means the caller and the ledger disagree about the position.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid quantity {quantity}: {reason}")]
    InvalidQuantity { quantity: Decimal, reason: String },
}

/// Execution errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Fill rejected ({order_id}): {side} {quantity} against {position_side} {position_size}: {reason}")]
    RejectedFill {
        order_id: String,
        side: Side,
        quantity: Decimal,
        position_side: PositionSide,
        position_size: Decimal,
        reason: String,
    },

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error(transparent)]
    InvalidState(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    /// Whether this is the simulator's locally-recovered reject branch.
    pub fn is_rejected_fill(&self) -> bool {
        matches!(self, BrokerError::RejectedFill { .. })
    }
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No data available")]
    NoDataAvailable,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid close price at row {row}: {value}")]
    InvalidPrice { row: usize, value: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trade journal errors.
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write error: {0}")]
    Write(String),
}
