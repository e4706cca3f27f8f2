//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use trading_core::error::TradingError;
use trading_core::types::Timeframe;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub journal: JournalSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
}

impl AppConfig {
    /// Check the values the engine and trader rely on.
    pub fn validate(&self) -> Result<(), TradingError> {
        if self.trading.symbol.trim().is_empty() {
            return Err(TradingError::Config("trading.symbol must not be empty".into()));
        }
        if self.trading.trade_quantity <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "trading.trade_quantity must be positive, got {}",
                self.trading.trade_quantity
            )));
        }
        if self.trading.kline_limit == 0 {
            return Err(TradingError::Config(
                "trading.kline_limit must be at least 1".into(),
            ));
        }
        if self.backtest.initial_capital <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "backtest.initial_capital must be positive, got {}",
                self.backtest.initial_capital
            )));
        }
        let rate = self.backtest.commission_rate;
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(TradingError::Config(format!(
                "backtest.commission_rate must be in [0, 1), got {}",
                rate
            )));
        }
        if self.strategy.name.trim().is_empty() {
            return Err(TradingError::Config("strategy.name must not be empty".into()));
        }
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signal-harness".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Symbol, sizing and live polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingSettings {
    pub symbol: String,
    pub interval: Timeframe,
    pub trade_quantity: Decimal,
    pub check_interval_secs: u64,
    pub error_backoff_secs: u64,
    pub kline_limit: usize,
    /// Pause between a live close and the following open
    pub settle_delay_secs: u64,
}

impl TradingSettings {
    /// Wait between polls of the live loop.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Wait after a failed poll.
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Timeframe::Minute1,
            trade_quantity: dec!(0.1),
            check_interval_secs: 60,
            error_backoff_secs: 300,
            kline_limit: 200,
            settle_delay_secs: 5,
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub historical_data_file: Option<PathBuf>,
    pub initial_capital: Decimal,
    pub commission_rate: Decimal,
    /// Charge `commission_rate` on every fill
    pub apply_commission: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            historical_data_file: None,
            initial_capital: dec!(10000),
            commission_rate: dec!(0.00075),
            apply_commission: false,
        }
    }
}

/// Trade journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    pub log_folder: PathBuf,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from("data"),
        }
    }
}

/// Strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Registry key
    pub name: String,
    /// Strategy-specific parameters; `null` means defaults
    pub params: serde_json::Value,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            name: "hold".to_string(),
            params: serde_json::Value::Null,
        }
    }
}
