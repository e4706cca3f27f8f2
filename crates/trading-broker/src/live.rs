//! Execution against a real exchange account.
//!
//! No exchange connector ships with the harness. [`ExchangeApi`] is the seam
//! an adapter implements; [`LiveExecutionClient`] turns it into an
//! [`ExecutionClient`] with the same reporting shape as the simulator.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};
use trading_core::error::BrokerError;
use trading_core::traits::ExecutionClient;
use trading_core::types::{
    ExecutionReport, Fill, FillKind, Position, PositionSide, Side, POSITION_EPSILON,
};

/// Minimal exchange surface needed to trade one symbol with market orders.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Open position as reported by the exchange; flat when none.
    async fn position(&self, symbol: &str) -> Result<Position, BrokerError>;

    /// Wallet balance in the settlement currency.
    async fn wallet_balance(&self) -> Result<Decimal, BrokerError>;

    /// Submit a market order, returning the exchange order id.
    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<String, BrokerError>;

    fn name(&self) -> &str;
}

/// [`ExecutionClient`] over an [`ExchangeApi`].
pub struct LiveExecutionClient<A> {
    api: A,
    settle_delay: Duration,
}

impl<A: ExchangeApi> LiveExecutionClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            settle_delay: Duration::from_secs(5),
        }
    }

    /// Time to wait after a closing order so the exchange settles it before
    /// the next order goes out.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

/// PnL estimate for closing `amount` of `position` at `price`. The exchange's
/// own figure arrives later with the execution report, if at all.
fn estimate_close_pnl(position: &Position, amount: Decimal, price: Decimal) -> Decimal {
    match (position.side, position.entry_price) {
        (PositionSide::Long, Some(entry)) => (price - entry).saturating_mul(amount),
        (PositionSide::Short, Some(entry)) => (entry - price).saturating_mul(amount),
        _ => Decimal::ZERO,
    }
}

#[async_trait]
impl<A: ExchangeApi> ExecutionClient for LiveExecutionClient<A> {
    async fn get_position(&self, symbol: &str) -> Result<Position, BrokerError> {
        self.api.position(symbol).await
    }

    async fn get_balance(&self) -> Result<Decimal, BrokerError> {
        self.api.wallet_balance().await
    }

    async fn execute_order(&self, fill: Fill) -> Result<ExecutionReport, BrokerError> {
        if fill.quantity <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected(format!(
                "quantity {} must be positive",
                fill.quantity
            )));
        }

        let before = self.api.position(&fill.symbol).await?;
        let open = before.size > POSITION_EPSILON;

        let (kind, filled_quantity, pnl) = if open && before.side.is_opposite(fill.side) {
            let amount = fill.quantity.min(before.size);
            let pnl = estimate_close_pnl(&before, amount, fill.price);
            let full = amount >= before.size;
            (FillKind::Close { full }, amount, pnl)
        } else if open {
            (FillKind::Extend, fill.quantity, Decimal::ZERO)
        } else {
            (FillKind::Open, fill.quantity, Decimal::ZERO)
        };

        let order_id = self
            .api
            .place_market_order(&fill.symbol, fill.side, filled_quantity)
            .await?;

        info!(
            exchange = self.api.name(),
            order_id = %order_id,
            side = %fill.side,
            quantity = %filled_quantity,
            "Market order submitted"
        );

        if kind.is_close() && !self.settle_delay.is_zero() {
            debug!(delay = ?self.settle_delay, "Waiting for close to settle");
            tokio::time::sleep(self.settle_delay).await;
        }

        let balance_after = self.api.wallet_balance().await?;

        Ok(ExecutionReport {
            order_id,
            kind,
            filled_quantity,
            pnl,
            commission: Decimal::ZERO,
            balance_after,
        })
    }

    fn name(&self) -> &str {
        self.api.name()
    }
}
