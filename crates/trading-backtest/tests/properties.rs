use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Mutex;
use trading_backtest::{BacktestConfig, BacktestEngine};
use trading_core::traits::{MemoryTradeSink, SignalStrategy};
use trading_core::types::{Candle, Series, Signal, Timeframe, TradeStatus};

/// Replays a fixed script and remembers every history it was shown.
struct Recorder {
    script: Vec<Signal>,
    seen: Mutex<Vec<Vec<Candle>>>,
}

impl Recorder {
    fn new(script: Vec<Signal>) -> Self {
        Self {
            script,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl SignalStrategy for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn evaluate(&self, history: &[Candle]) -> Signal {
        self.seen.lock().unwrap().push(history.to_vec());
        self.script
            .get(history.len() - 1)
            .copied()
            .unwrap_or(Signal::Hold)
    }
}

fn signal_strategy() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::Buy),
        Just(Signal::Sell),
        Just(Signal::Hold),
        Just(Signal::Wait),
    ]
}

/// Closes in cents so the arithmetic stays exact.
fn session() -> impl Strategy<Value = (Vec<Decimal>, Vec<Signal>)> {
    (1usize..60).prop_flat_map(|n| {
        (
            prop::collection::vec((1i64..10_000_000).prop_map(|c| Decimal::new(c, 2)), n),
            prop::collection::vec(signal_strategy(), n),
        )
    })
}

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

fn config(apply_commission: bool) -> BacktestConfig {
    BacktestConfig {
        trade_quantity: Decimal::new(25, 2),
        initial_capital: Decimal::new(10_000, 0),
        commission_rate: Decimal::new(75, 5),
        apply_commission,
    }
}

proptest! {
    /// Candle i is evaluated with exactly the first i + 1 candles.
    #[test]
    fn strategy_only_sees_the_past((closes, script) in session()) {
        let data = series(&closes);
        let strategy = Recorder::new(script);
        let mut sink = MemoryTradeSink::new();

        BacktestEngine::new(config(false)).run(&strategy, &data, &mut sink).unwrap();

        let seen = strategy.seen.lock().unwrap();
        prop_assert_eq!(seen.len(), data.len());
        for (i, history) in seen.iter().enumerate() {
            prop_assert_eq!(history.as_slice(), data.prefix(i));
        }
    }

    /// Every run ends flat with no rejected fills.
    #[test]
    fn runs_end_flat((closes, script) in session(), charge in any::<bool>()) {
        let data = series(&closes);
        let strategy = Recorder::new(script);
        let mut sink = MemoryTradeSink::new();

        let report = BacktestEngine::new(config(charge))
            .run(&strategy, &data, &mut sink)
            .unwrap();

        prop_assert!(report.final_account.position.is_flat());
        prop_assert_eq!(report.stats.rejected_fills, 0);
    }

    /// Recorded pnl less commission accounts for the whole balance change.
    #[test]
    fn balance_is_conserved((closes, script) in session(), charge in any::<bool>()) {
        let data = series(&closes);
        let strategy = Recorder::new(script);
        let mut sink = MemoryTradeSink::new();

        let report = BacktestEngine::new(config(charge))
            .run(&strategy, &data, &mut sink)
            .unwrap();

        let pnl: Decimal = sink.orders().map(|r| r.pnl).sum();
        let commission: Decimal = sink.orders().map(|r| r.commission).sum();
        prop_assert_eq!(pnl - commission, report.net_pnl());
        if !charge {
            prop_assert_eq!(commission, Decimal::ZERO);
        }

        let last = sink.records().last().unwrap();
        prop_assert_eq!(last.balance_after, report.final_balance());
    }

    /// HOLD and WAIT candles never produce orders.
    #[test]
    fn hold_and_wait_are_inert((closes, script) in session()) {
        let data = series(&closes);
        let strategy = Recorder::new(script.clone());
        let mut sink = MemoryTradeSink::new();

        BacktestEngine::new(config(false)).run(&strategy, &data, &mut sink).unwrap();

        for (i, signal) in script.iter().enumerate() {
            if signal.is_actionable() {
                continue;
            }
            let ts = data.get(i).unwrap().timestamp;
            let traded = sink
                .orders()
                .any(|r| r.timestamp == ts && r.status != TradeStatus::ClosedAtEnd);
            prop_assert!(!traded, "order emitted on {} candle {}", signal, i);
        }
    }
}

#[test]
fn idle_strategy_leaves_balance_untouched() {
    let data = series(&[Decimal::new(100, 0), Decimal::new(200, 0), Decimal::new(50, 0)]);
    let strategy = Recorder::new(vec![Signal::Wait, Signal::Hold, Signal::Hold]);
    let mut sink = MemoryTradeSink::new();

    let report = BacktestEngine::new(config(true))
        .run(&strategy, &data, &mut sink)
        .unwrap();

    assert_eq!(sink.records().len(), 1);
    assert_eq!(report.net_pnl(), Decimal::ZERO);
    assert_eq!(report.stats.max_drawdown_pct, Decimal::ZERO);
}
