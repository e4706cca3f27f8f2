//! Execution client trait.

use crate::error::BrokerError;
use crate::types::{ExecutionReport, Fill, Position};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Something that can fill market orders for a single symbol.
///
/// Implemented by the in-process simulator and by live exchange adapters so
/// the trader loop does not care which one it drives.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Current position for `symbol`; flat when nothing is open.
    async fn get_position(&self, symbol: &str) -> Result<Position, BrokerError>;

    /// Current account balance.
    async fn get_balance(&self) -> Result<Decimal, BrokerError>;

    /// Execute a market fill.
    ///
    /// A simulator that refuses the fill returns [`BrokerError::RejectedFill`]
    /// and leaves its state untouched.
    async fn execute_order(&self, fill: Fill) -> Result<ExecutionReport, BrokerError>;

    /// Get the client name.
    fn name(&self) -> &str;
}
