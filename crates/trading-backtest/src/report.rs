//! Backtest report generation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_core::types::Account;

use crate::{BacktestConfig, BacktestStats};

/// Complete backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Configuration used
    pub config: BacktestConfig,
    pub symbol: String,
    /// Strategy name
    pub strategy: String,
    /// Statistics
    pub stats: BacktestStats,
    /// Account after terminal liquidation
    pub final_account: Account,
}

impl BacktestReport {
    pub fn final_balance(&self) -> Decimal {
        self.stats.final_balance
    }

    pub fn net_pnl(&self) -> Decimal {
        self.stats.net_pnl
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let rule = "───────────────────────────────────────────────────────────\n";

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!(
            "  Trade Quantity:      {}\n",
            self.config.trade_quantity.normalize()
        ));
        s.push('\n');

        s.push_str("PERFORMANCE\n");
        s.push_str(rule);
        s.push_str(&format!(
            "  Initial Capital:     ${:.2}\n",
            self.stats.initial_capital
        ));
        s.push_str(&format!(
            "  Final Balance:       ${:.2}\n",
            self.stats.final_balance
        ));
        s.push_str(&format!("  Net PnL:             ${:.2}\n", self.stats.net_pnl));
        s.push_str(&format!(
            "  Total Return:        {:.2}%\n",
            self.stats.total_return_pct
        ));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}%\n",
            self.stats.max_drawdown_pct
        ));
        s.push_str(&format!(
            "  Commission Paid:     ${:.2}{}\n",
            self.stats.total_commission,
            if self.config.apply_commission {
                ""
            } else {
                " (not charged)"
            }
        ));
        s.push('\n');

        s.push_str("SIGNALS\n");
        s.push_str(rule);
        s.push_str(&format!(
            "  BUY / SELL:          {} / {}\n",
            self.stats.signals.buy, self.stats.signals.sell
        ));
        s.push_str(&format!(
            "  HOLD / WAIT:         {} / {}\n",
            self.stats.signals.hold, self.stats.signals.wait
        ));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str(rule);
        s.push_str(&format!("  Orders Filled:       {}\n", self.stats.total_orders));
        s.push_str(&format!("  Round Trips:         {}\n", self.stats.round_trips));
        s.push_str(&format!(
            "  Winning Trades:      {}\n",
            self.stats.winning_trades
        ));
        s.push_str(&format!(
            "  Losing Trades:       {}\n",
            self.stats.losing_trades
        ));
        s.push_str(&format!(
            "  Breakeven Trades:    {}\n",
            self.stats.breakeven_trades
        ));
        s.push_str(&format!(
            "  Win Rate:            {:.2}%\n",
            self.stats.win_rate_pct
        ));
        s.push_str(&format!("  Avg Win:             ${:.2}\n", self.stats.avg_win));
        s.push_str(&format!("  Avg Loss:            ${:.2}\n", self.stats.avg_loss));
        s.push_str(&format!(
            "  Profit Factor:       {:.2}\n",
            self.stats.profit_factor
        ));
        s.push('\n');

        s.push_str("EXECUTION\n");
        s.push_str(rule);
        s.push_str(&format!(
            "  Bars Processed:      {}\n",
            self.stats.bars_processed
        ));
        s.push_str(&format!(
            "  Rejected Fills:      {}\n",
            self.stats.rejected_fills
        ));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV (equity curve only).
    pub fn equity_to_csv(&self) -> String {
        let mut csv = String::from("timestamp,equity\n");
        for (ts, equity) in &self.stats.equity_curve {
            csv.push_str(&format!("{},{}\n", ts.to_rfc3339(), equity));
        }
        csv
    }
}
