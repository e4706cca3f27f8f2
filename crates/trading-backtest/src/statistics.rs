//! Backtest statistics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trading_core::types::{ExecutionReport, Signal};

/// Signal counts over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
    pub wait: usize,
}

/// Backtest statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestStats {
    /// Initial capital
    pub initial_capital: Decimal,
    /// Balance after terminal liquidation
    pub final_balance: Decimal,
    /// `final_balance - initial_capital`
    pub net_pnl: Decimal,
    /// Total return percentage
    pub total_return_pct: Decimal,
    /// Maximum drawdown of mark-to-market equity, in percent
    pub max_drawdown_pct: Decimal,
    pub signals: SignalCounts,
    /// Successful fills, opens and closes alike
    pub total_orders: usize,
    /// Closing fills
    pub round_trips: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate_pct: Decimal,
    /// Average profit per winning close
    pub avg_win: Decimal,
    /// Average loss per losing close, as a positive number
    pub avg_loss: Decimal,
    /// Gross profit / gross loss; zero when there were no losses
    pub profit_factor: Decimal,
    pub realized_pnl: Decimal,
    pub total_commission: Decimal,
    /// Fills the simulator refused; always zero for a healthy run
    pub rejected_fills: usize,
    pub bars_processed: usize,
    /// Equity after each candle
    pub equity_curve: Vec<(DateTime<Utc>, Decimal)>,
    peak_equity: Decimal,
    gross_profit: Decimal,
    gross_loss: Decimal,
}

impl BacktestStats {
    /// Create new stats tracker.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            final_balance: initial_capital,
            net_pnl: Decimal::ZERO,
            total_return_pct: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            signals: SignalCounts::default(),
            total_orders: 0,
            round_trips: 0,
            winning_trades: 0,
            losing_trades: 0,
            breakeven_trades: 0,
            win_rate_pct: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            rejected_fills: 0,
            bars_processed: 0,
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
        }
    }

    pub fn record_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Buy => self.signals.buy += 1,
            Signal::Sell => self.signals.sell += 1,
            Signal::Hold => self.signals.hold += 1,
            Signal::Wait => self.signals.wait += 1,
        }
    }

    /// Record equity at a timestamp.
    pub fn record_equity(&mut self, timestamp: DateTime<Utc>, equity: Decimal) {
        self.equity_curve.push((timestamp, equity));

        if equity > self.peak_equity {
            self.peak_equity = equity;
        }

        if self.peak_equity > Decimal::ZERO {
            let drawdown = (self.peak_equity - equity) / self.peak_equity * dec!(100);
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }

        self.bars_processed += 1;
    }

    /// Add a successful fill.
    pub fn record_fill(&mut self, report: &ExecutionReport) {
        self.total_orders += 1;
        self.total_commission += report.commission;

        if !report.kind.is_close() {
            return;
        }

        self.round_trips += 1;
        self.realized_pnl += report.pnl;
        if report.pnl > Decimal::ZERO {
            self.winning_trades += 1;
            self.gross_profit += report.pnl;
        } else if report.pnl < Decimal::ZERO {
            self.losing_trades += 1;
            self.gross_loss += report.pnl.abs();
        } else {
            self.breakeven_trades += 1;
        }
    }

    pub fn record_rejection(&mut self) {
        self.rejected_fills += 1;
    }

    /// Calculate final statistics.
    pub fn finalize(&mut self, final_balance: Decimal) {
        self.final_balance = final_balance;
        self.net_pnl = final_balance - self.initial_capital;

        if self.initial_capital > Decimal::ZERO {
            self.total_return_pct = self.net_pnl / self.initial_capital * dec!(100);
        }

        if self.round_trips > 0 {
            self.win_rate_pct =
                Decimal::from(self.winning_trades * 100) / Decimal::from(self.round_trips);
        }
        if self.winning_trades > 0 {
            self.avg_win = self.gross_profit / Decimal::from(self.winning_trades);
        }
        if self.losing_trades > 0 {
            self.avg_loss = self.gross_loss / Decimal::from(self.losing_trades);
        }
        if self.gross_loss > Decimal::ZERO {
            self.profit_factor = self.gross_profit / self.gross_loss;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trading_core::types::FillKind;

    fn close(pnl: Decimal) -> ExecutionReport {
        ExecutionReport {
            order_id: "x".into(),
            kind: FillKind::Close { full: true },
            filled_quantity: dec!(1),
            pnl,
            commission: Decimal::ZERO,
            balance_after: Decimal::ZERO,
        }
    }

    #[test]
    fn test_trade_outcomes() {
        let mut stats = BacktestStats::new(dec!(1000));
        stats.record_fill(&close(dec!(30)));
        stats.record_fill(&close(dec!(10)));
        stats.record_fill(&close(dec!(-20)));
        stats.record_fill(&close(Decimal::ZERO));
        stats.finalize(dec!(1020));

        assert_eq!(stats.round_trips, 4);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.breakeven_trades, 1);
        assert_eq!(stats.win_rate_pct, dec!(50));
        assert_eq!(stats.avg_win, dec!(20));
        assert_eq!(stats.avg_loss, dec!(20));
        assert_eq!(stats.profit_factor, dec!(2));
        assert_eq!(stats.net_pnl, dec!(20));
        assert_eq!(stats.total_return_pct, dec!(2));
    }

    #[test]
    fn test_drawdown_tracks_peak() {
        let mut stats = BacktestStats::new(dec!(1000));
        let t = Utc.timestamp_opt(0, 0).unwrap();
        stats.record_equity(t, dec!(1100));
        stats.record_equity(t, dec!(990));
        stats.record_equity(t, dec!(1050));

        assert_eq!(stats.max_drawdown_pct, dec!(10));
        assert_eq!(stats.bars_processed, 3);
    }

    #[test]
    fn test_signal_counts() {
        let mut stats = BacktestStats::new(dec!(1000));
        for s in [Signal::Wait, Signal::Wait, Signal::Buy, Signal::Hold] {
            stats.record_signal(s);
        }
        assert_eq!(
            stats.signals,
            SignalCounts {
                buy: 1,
                sell: 0,
                hold: 1,
                wait: 2
            }
        );
    }
}
