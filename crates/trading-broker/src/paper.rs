//! Simulated execution client for backtests and paper trading.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;
use trading_core::error::BrokerError;
use trading_core::traits::ExecutionClient;
use trading_core::types::{Account, ExecutionReport, Fill, Position};

use crate::simulator::OrderSimulator;

/// [`ExecutionClient`] backed by an [`OrderSimulator`].
///
/// Cloning shares the same simulated account.
#[derive(Debug, Clone)]
pub struct SimulatedExecutionClient {
    simulator: Arc<Mutex<OrderSimulator>>,
    settle_delay: Duration,
}

impl SimulatedExecutionClient {
    pub fn new(simulator: OrderSimulator) -> Self {
        Self {
            simulator: Arc::new(Mutex::new(simulator)),
            settle_delay: Duration::ZERO,
        }
    }

    /// Pause after every close, as the live client does while the exchange
    /// settles. Zero by default.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Convenience constructor for a flat account.
    pub fn with_balance(symbol: impl Into<String>, initial_balance: Decimal) -> Self {
        Self::new(OrderSimulator::new(symbol, initial_balance))
    }

    fn lock(&self) -> Result<MutexGuard<'_, OrderSimulator>, BrokerError> {
        self.simulator
            .lock()
            .map_err(|_| BrokerError::Internal("simulator lock poisoned".to_string()))
    }

    /// Get a snapshot of the simulated account.
    pub fn account_snapshot(&self) -> Result<Account, BrokerError> {
        Ok(self.lock()?.account().clone())
    }
}

#[async_trait]
impl ExecutionClient for SimulatedExecutionClient {
    async fn get_position(&self, symbol: &str) -> Result<Position, BrokerError> {
        let simulator = self.lock()?;
        if simulator.symbol() == symbol {
            Ok(simulator.position().clone())
        } else {
            Ok(Position::flat(symbol))
        }
    }

    async fn get_balance(&self) -> Result<Decimal, BrokerError> {
        Ok(self.lock()?.balance())
    }

    async fn execute_order(&self, fill: Fill) -> Result<ExecutionReport, BrokerError> {
        let report = self.lock()?.execute(&fill)?;
        if report.kind.is_close() && !self.settle_delay.is_zero() {
            debug!(delay = ?self.settle_delay, "Waiting for close to settle");
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(report)
    }

    fn name(&self) -> &str {
        "Simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use trading_core::types::{PositionSide, Side};

    #[tokio::test]
    async fn test_simulated_client_round_trip() {
        let client = SimulatedExecutionClient::with_balance("BTCUSDT", dec!(1000));

        client
            .execute_order(Fill::new("BTCUSDT", Side::Buy, dec!(1), dec!(100), Utc::now()))
            .await
            .unwrap();
        let position = client.get_position("BTCUSDT").await.unwrap();
        assert_eq!(position.side, PositionSide::Long);

        let report = client
            .execute_order(Fill::new("BTCUSDT", Side::Sell, dec!(1), dec!(120), Utc::now()))
            .await
            .unwrap();
        assert_eq!(report.pnl, dec!(20));
        assert_eq!(client.get_balance().await.unwrap(), dec!(1020));
        assert!(client.get_position("BTCUSDT").await.unwrap().is_flat());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_applies_to_closes_only() {
        let client = SimulatedExecutionClient::with_balance("BTCUSDT", dec!(1000))
            .with_settle_delay(Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        client
            .execute_order(Fill::new("BTCUSDT", Side::Buy, dec!(1), dec!(100), Utc::now()))
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        client
            .execute_order(Fill::new("BTCUSDT", Side::Sell, dec!(1), dec!(110), Utc::now()))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unknown_symbol_reads_flat() {
        let client = SimulatedExecutionClient::with_balance("BTCUSDT", dec!(1000));
        let position = client.get_position("ETHUSDT").await.unwrap();
        assert!(position.is_flat());
        assert_eq!(position.symbol, "ETHUSDT");
    }

    #[tokio::test]
    async fn test_clones_share_account() {
        let client = SimulatedExecutionClient::with_balance("BTCUSDT", dec!(1000));
        let other = client.clone();
        other
            .execute_order(Fill::new("BTCUSDT", Side::Sell, dec!(2), dec!(50), Utc::now()))
            .await
            .unwrap();

        let account = client.account_snapshot().unwrap();
        assert_eq!(account.position.size, dec!(2));
    }
}
