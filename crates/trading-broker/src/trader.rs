//! Polling trader for live and paper sessions.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use trading_core::error::{BrokerError, TradingError};
use trading_core::traits::{ExecutionClient, MarketFeed, SignalStrategy, TradeSink};
use trading_core::types::{Fill, OrderIntent, Signal, Timeframe, TradeRecord, TradeStatus};

/// Trader loop settings.
#[derive(Debug, Clone)]
pub struct TraderConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub trade_quantity: Decimal,
    /// Candles requested from the feed per poll.
    pub kline_limit: usize,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    /// Stop after this many polls. `None` runs until shutdown.
    pub max_iterations: Option<u64>,
}

impl TraderConfig {
    pub fn new(symbol: impl Into<String>, trade_quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: Timeframe::Minute1,
            trade_quantity,
            kline_limit: 200,
            poll_interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(300),
            max_iterations: None,
        }
    }
}

/// What one poll did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Feed had nothing to offer.
    NoData,
    /// Strategy ran; `orders` is how many orders were filled.
    Evaluated { signal: Signal, orders: usize },
}

/// Counters reported when the trader stops.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraderSummary {
    pub iterations: u64,
    pub orders: usize,
    pub rejected_fills: usize,
    pub errors: usize,
    pub final_balance: Option<Decimal>,
}

/// Polls a feed, evaluates a strategy and trades the difference.
pub struct LiveTrader {
    config: TraderConfig,
    feed: Arc<dyn MarketFeed>,
    client: Arc<dyn ExecutionClient>,
    strategy: Box<dyn SignalStrategy>,
    sink: Box<dyn TradeSink>,
    summary: TraderSummary,
}

impl LiveTrader {
    pub fn new(
        config: TraderConfig,
        feed: Arc<dyn MarketFeed>,
        client: Arc<dyn ExecutionClient>,
        strategy: Box<dyn SignalStrategy>,
        sink: Box<dyn TradeSink>,
    ) -> Self {
        Self {
            config,
            feed,
            client,
            strategy,
            sink,
            summary: TraderSummary::default(),
        }
    }

    pub fn summary(&self) -> &TraderSummary {
        &self.summary
    }

    /// Run until shutdown is signalled or `max_iterations` polls have run.
    ///
    /// Errors inside a poll are logged and retried after the backoff. Only a
    /// failing trade sink or a ledger invariant violation stops the loop.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<TraderSummary, TradingError> {
        let balance = self.client.get_balance().await?;
        self.sink.record(&TradeRecord::session_start(
            Utc::now(),
            self.config.symbol.clone(),
            balance,
            false,
        ))?;

        info!(
            symbol = %self.config.symbol,
            strategy = self.strategy.name(),
            feed = self.feed.name(),
            client = self.client.name(),
            balance = %balance,
            "Trader started"
        );

        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested");
                break;
            }
            if let Some(max) = self.config.max_iterations {
                if self.summary.iterations >= max {
                    info!(iterations = max, "Iteration limit reached");
                    break;
                }
            }

            self.summary.iterations += 1;
            let wait = match self.step().await {
                Ok(StepOutcome::NoData) => {
                    warn!(symbol = %self.config.symbol, "No candles received, retrying");
                    self.config.poll_interval
                }
                Ok(StepOutcome::Evaluated { signal, orders }) => {
                    debug!(%signal, orders, "Iteration complete");
                    self.config.poll_interval
                }
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => {
                    self.summary.errors += 1;
                    error!(error = %e, backoff = ?self.config.error_backoff, "Iteration failed");
                    self.config.error_backoff
                }
            };

            let last = self
                .config
                .max_iterations
                .is_some_and(|max| self.summary.iterations >= max);
            if !last && wait_or_shutdown(&mut shutdown, wait).await {
                info!("Shutdown requested");
                break;
            }
        }

        self.summary.final_balance = self.client.get_balance().await.ok();
        Ok(self.summary.clone())
    }

    /// Candles requested per poll.
    fn history_limit(&self) -> usize {
        if self.strategy.needs_full_history() {
            usize::MAX
        } else {
            self.config.kline_limit
        }
    }

    /// One poll: fetch, evaluate, trade.
    pub async fn step(&mut self) -> Result<StepOutcome, TradingError> {
        let candles = self
            .feed
            .recent_candles(
                &self.config.symbol,
                self.config.timeframe,
                self.history_limit(),
            )
            .await?;

        let Some(latest) = candles.last().copied() else {
            return Ok(StepOutcome::NoData);
        };

        let signal = self.strategy.evaluate(&candles);
        let position = self.client.get_position(&self.config.symbol).await?;
        let intents = signal.plan(&position, self.config.trade_quantity);

        if intents.is_empty() {
            debug!(%signal, side = %position.side, "No action");
            return Ok(StepOutcome::Evaluated { signal, orders: 0 });
        }

        info!(%signal, side = %position.side, size = %position.size, "Signal requires orders");

        let mut orders = 0;
        for intent in intents {
            match self.submit(&intent, latest.close, latest.timestamp).await {
                Ok(()) => orders += 1,
                Err(TradingError::Broker(e)) if e.is_rejected_fill() => {
                    self.summary.rejected_fills += 1;
                    warn!(error = %e, "Fill rejected, skipping remaining orders");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        self.summary.orders += orders;
        Ok(StepOutcome::Evaluated { signal, orders })
    }

    async fn submit(
        &mut self,
        intent: &OrderIntent,
        price: Decimal,
        timestamp: chrono::DateTime<Utc>,
    ) -> Result<(), TradingError> {
        let fill = Fill::new(
            self.config.symbol.clone(),
            intent.side,
            intent.quantity,
            price,
            timestamp,
        );
        let report = self.client.execute_order(fill).await?;

        let status = if intent.is_close() {
            intent.status
        } else {
            TradeStatus::Submitted
        };

        self.sink.record(&TradeRecord {
            timestamp,
            symbol: self.config.symbol.clone(),
            action: intent.action,
            side: Some(intent.side),
            quantity: report.filled_quantity,
            price,
            pnl: report.pnl,
            commission: report.commission,
            balance_after: report.balance_after,
            order_id: Some(report.order_id),
            status,
            is_backtest: false,
        })?;
        Ok(())
    }
}

fn is_fatal(e: &TradingError) -> bool {
    matches!(
        e,
        TradingError::Journal(_)
            | TradingError::Ledger(_)
            | TradingError::Broker(BrokerError::InvalidState(_))
    )
}

/// Sleep for `duration`, returning early with `true` if shutdown is signalled.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        changed = shutdown.changed() => match changed {
            Ok(()) => *shutdown.borrow(),
            // Sender gone: nobody can ask us to stop any more.
            Err(_) => {
                tokio::time::sleep(duration).await;
                false
            }
        },
    }
}
