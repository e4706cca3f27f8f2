//! Bar-by-bar replay engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use trading_broker::OrderSimulator;
use trading_core::error::{DataError, TradingError};
use trading_core::traits::{SignalStrategy, TradeSink};
use trading_core::types::{
    Candle, ExecutionReport, Fill, OrderIntent, Series, TradeAction, TradeRecord, TradeStatus,
};

use crate::report::BacktestReport;
use crate::statistics::BacktestStats;

/// Backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Quantity of every opening order
    pub trade_quantity: Decimal,
    /// Starting balance
    pub initial_capital: Decimal,
    /// Commission rate per fill, as a fraction of notional
    pub commission_rate: Decimal,
    /// Charge `commission_rate` on fills
    pub apply_commission: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            trade_quantity: dec!(0.1),
            initial_capital: dec!(10000),
            commission_rate: dec!(0.00075),
            apply_commission: false,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), TradingError> {
        if self.trade_quantity <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "trade_quantity must be positive, got {}",
                self.trade_quantity
            )));
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(TradingError::Config(format!(
                "commission_rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        Ok(())
    }
}

/// Replays a series through a strategy against a simulated account.
///
/// A run is synchronous and owns its account from start to finish.
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a backtest.
    ///
    /// Candle `i` is evaluated with exactly `series[0..=i]`. Both legs of a
    /// reversal fill at that candle's close. Whatever is still open after the
    /// last candle is closed at its close with status `CLOSED_AT_END`.
    ///
    /// A rejected fill is logged, counted, and ends the current candle. Ledger
    /// and sink errors abort the run.
    pub fn run(
        &self,
        strategy: &dyn SignalStrategy,
        series: &Series,
        sink: &mut dyn TradeSink,
    ) -> Result<BacktestReport, TradingError> {
        self.config.validate()?;

        let first = series.first().ok_or(DataError::NoDataAvailable)?;
        let symbol = series.symbol().to_string();

        let mut simulator = OrderSimulator::new(symbol.clone(), self.config.initial_capital)
            .with_commission(self.config.commission_rate, self.config.apply_commission);
        let mut stats = BacktestStats::new(self.config.initial_capital);

        sink.record(&TradeRecord::session_start(
            first.timestamp,
            symbol.clone(),
            self.config.initial_capital,
            true,
        ))?;

        info!(
            symbol = %symbol,
            strategy = strategy.name(),
            bars = series.len(),
            capital = %self.config.initial_capital,
            "Starting backtest"
        );

        for (i, candle) in series.iter().enumerate() {
            let signal = strategy.evaluate(series.prefix(i));
            stats.record_signal(signal);

            let intents = signal.plan(simulator.position(), self.config.trade_quantity);
            if intents.is_empty() {
                debug!(bar = i, %signal, "No action");
            }

            for intent in &intents {
                match self.execute(&mut simulator, intent, candle, &symbol) {
                    Ok((record, report)) => {
                        sink.record(&record)?;
                        stats.record_fill(&report);
                    }
                    Err(TradingError::Broker(e)) if e.is_rejected_fill() => {
                        error!(bar = i, error = %e, "Fill rejected, moving to next candle");
                        stats.record_rejection();
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }

            stats.record_equity(candle.timestamp, simulator.account().equity(candle.close));
        }

        if let Some(last) = series.last() {
            self.liquidate(&mut simulator, last, &symbol, sink, &mut stats)?;
        }

        stats.finalize(simulator.balance());

        info!(
            symbol = %symbol,
            final_balance = %stats.final_balance,
            net_pnl = %stats.net_pnl,
            round_trips = stats.round_trips,
            "Backtest complete"
        );

        Ok(BacktestReport {
            config: self.config.clone(),
            symbol,
            strategy: strategy.name().to_string(),
            stats,
            final_account: simulator.account().clone(),
        })
    }

    fn execute(
        &self,
        simulator: &mut OrderSimulator,
        intent: &OrderIntent,
        candle: &Candle,
        symbol: &str,
    ) -> Result<(TradeRecord, ExecutionReport), TradingError> {
        let fill = Fill::new(
            symbol,
            intent.side,
            intent.quantity,
            candle.close,
            candle.timestamp,
        );
        let report = simulator.execute(&fill)?;

        let record = TradeRecord {
            timestamp: candle.timestamp,
            symbol: symbol.to_string(),
            action: intent.action,
            side: Some(intent.side),
            quantity: report.filled_quantity,
            price: candle.close,
            pnl: report.pnl,
            commission: report.commission,
            balance_after: report.balance_after,
            order_id: Some(report.order_id.clone()),
            status: intent.status,
            is_backtest: true,
        };
        Ok((record, report))
    }

    fn liquidate(
        &self,
        simulator: &mut OrderSimulator,
        last: &Candle,
        symbol: &str,
        sink: &mut dyn TradeSink,
        stats: &mut BacktestStats,
    ) -> Result<(), TradingError> {
        let position = simulator.position();
        let Some(side) = position.side.closing_side() else {
            return Ok(());
        };
        if position.is_flat() {
            return Ok(());
        }

        info!(
            side = %position.side,
            size = %position.size,
            price = %last.close,
            "Closing open position at end of data"
        );

        let intent = OrderIntent {
            side,
            quantity: position.size,
            action: TradeAction::ClosePosition,
            status: TradeStatus::ClosedAtEnd,
        };
        let (record, report) = self.execute(simulator, &intent, last, symbol)?;
        sink.record(&record)?;
        stats.record_fill(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trading_core::traits::MemoryTradeSink;
    use trading_core::types::{PositionSide, Side, Signal, Timeframe};
    use trading_strategies::ScriptedStrategy;

    fn series(closes: &[Decimal]) -> Series {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Candle::new(
                    Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    *c,
                )
            })
            .collect();
        Series::new("BTCUSDT", Timeframe::Minute1, candles).unwrap()
    }

    fn engine(qty: Decimal, capital: Decimal) -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            trade_quantity: qty,
            initial_capital: capital,
            ..BacktestConfig::default()
        })
    }

    #[test]
    fn test_reversal_scenario() {
        let data = series(&[dec!(100), dec!(105), dec!(95), dec!(120)]);
        let strategy =
            ScriptedStrategy::new(vec![Signal::Wait, Signal::Wait, Signal::Buy, Signal::Sell]);
        let mut sink = MemoryTradeSink::new();

        let report = engine(dec!(1), dec!(1000))
            .run(&strategy, &data, &mut sink)
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 5);

        assert_eq!(records[0].action, TradeAction::StartBacktest);
        assert_eq!(records[0].balance_after, dec!(1000));

        assert_eq!(records[1].status, TradeStatus::ExecutedLong);
        assert_eq!(records[1].price, dec!(95));
        assert_eq!(records[1].balance_after, dec!(1000));

        assert_eq!(records[2].status, TradeStatus::ClosedLong);
        assert_eq!(records[2].side, Some(Side::Sell));
        assert_eq!(records[2].pnl, dec!(25));
        assert_eq!(records[2].balance_after, dec!(1025));

        assert_eq!(records[3].status, TradeStatus::ExecutedShort);
        assert_eq!(records[3].price, dec!(120));
        assert_eq!(records[3].timestamp, records[2].timestamp);

        assert_eq!(records[4].status, TradeStatus::ClosedAtEnd);
        assert_eq!(records[4].side, Some(Side::Buy));
        assert_eq!(records[4].pnl, Decimal::ZERO);

        assert_eq!(report.final_balance(), dec!(1025));
        assert_eq!(report.net_pnl(), dec!(25));
        assert_eq!(report.final_account.position.side, PositionSide::Flat);
        assert_eq!(report.stats.rejected_fills, 0);
        assert_eq!(report.stats.round_trips, 2);
    }

    #[test]
    fn test_repeated_signal_does_not_pyramid() {
        let data = series(&[dec!(100), dec!(110), dec!(120)]);
        let strategy = ScriptedStrategy::new(vec![Signal::Buy, Signal::Buy, Signal::Buy]);
        let mut sink = MemoryTradeSink::new();

        let report = engine(dec!(1), dec!(1000))
            .run(&strategy, &data, &mut sink)
            .unwrap();

        let opens = sink
            .orders()
            .filter(|r| r.action == TradeAction::OpenPosition)
            .count();
        assert_eq!(opens, 1);
        assert_eq!(report.final_balance(), dec!(1020));
    }

    #[test]
    fn test_single_candle_ends_flat() {
        let data = series(&[dec!(100)]);
        let strategy = ScriptedStrategy::new(vec![Signal::Sell]);
        let mut sink = MemoryTradeSink::new();

        let report = engine(dec!(1), dec!(1000))
            .run(&strategy, &data, &mut sink)
            .unwrap();

        assert!(report.final_account.position.is_flat());
        assert_eq!(report.final_balance(), dec!(1000));
        assert_eq!(sink.orders().count(), 2);
    }

    #[test]
    fn test_empty_series_is_data_error() {
        let data = series(&[]);
        let strategy = ScriptedStrategy::new(vec![]);
        let mut sink = MemoryTradeSink::new();

        let err = engine(dec!(1), dec!(1000))
            .run(&strategy, &data, &mut sink)
            .unwrap_err();
        assert!(matches!(err, TradingError::Data(DataError::NoDataAvailable)));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let data = series(&[dec!(100)]);
        let strategy = ScriptedStrategy::new(vec![]);
        let mut sink = MemoryTradeSink::new();

        let err = engine(dec!(0), dec!(1000))
            .run(&strategy, &data, &mut sink)
            .unwrap_err();
        assert!(matches!(err, TradingError::Config(_)));

        let bad_rate = BacktestConfig {
            commission_rate: dec!(1),
            ..BacktestConfig::default()
        };
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_commission_charged_when_enabled() {
        let data = series(&[dec!(100), dec!(110)]);
        let strategy = ScriptedStrategy::new(vec![Signal::Buy, Signal::Hold]);
        let mut sink = MemoryTradeSink::new();

        let report = BacktestEngine::new(BacktestConfig {
            trade_quantity: dec!(1),
            initial_capital: dec!(1000),
            commission_rate: dec!(0.001),
            apply_commission: true,
        })
        .run(&strategy, &data, &mut sink)
        .unwrap();

        // 0.1 on the open at 100, 0.11 on the close at 110
        assert_eq!(report.stats.total_commission, dec!(0.21));
        assert_eq!(report.final_balance(), dec!(1009.79));
    }
}
