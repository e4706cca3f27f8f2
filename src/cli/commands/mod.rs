//! CLI command implementations.

pub mod backtest;
pub mod paper;
pub mod strategies;
pub mod validate;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use trading_config::AppConfig;
use trading_core::traits::SignalStrategy;
use trading_core::types::Series;
use trading_data::{load_series, DataFileName};
use trading_strategies::StrategyRegistry;

use crate::cli::MarketArgs;

/// Fold command-line overrides into the loaded configuration.
pub(crate) fn apply_overrides(config: &mut AppConfig, args: &MarketArgs) -> Result<()> {
    if let Some(data) = &args.data {
        config.backtest.historical_data_file = Some(data.clone());
    }
    if let Some(symbol) = &args.symbol {
        config.trading.symbol = symbol.clone();
    }
    if let Some(strategy) = &args.strategy {
        config.strategy.name = strategy.clone();
    }
    if let Some(path) = &args.strategy_config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read strategy config {}", path.display()))?;
        config.strategy.params = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid strategy config {}", path.display()))?;
    }
    if let Some(capital) = args.capital {
        config.backtest.initial_capital = capital;
    }
    if let Some(quantity) = args.quantity {
        config.trading.trade_quantity = quantity;
    }
    if let Some(rate) = args.commission_rate {
        config.backtest.commission_rate = rate;
    }
    if args.apply_commission {
        config.backtest.apply_commission = true;
    }
    if let Some(folder) = &args.log_folder {
        config.journal.log_folder = folder.clone();
    }

    config.validate()?;
    Ok(())
}

/// Load the configured data file.
///
/// Symbol and interval come from a `<SYMBOL>_<N>m_...csv` file name when
/// there is one. An explicit `--symbol` still wins over the file name.
pub(crate) fn load_market_data(config: &mut AppConfig, explicit_symbol: bool) -> Result<Series> {
    let path: PathBuf = match &config.backtest.historical_data_file {
        Some(path) => path.clone(),
        None => bail!(
            "No data file configured. Pass --data or set backtest.historical_data_file"
        ),
    };
    if !path.exists() {
        bail!("Data file '{}' does not exist", path.display());
    }

    match DataFileName::parse(&path) {
        Some(name) => {
            if !explicit_symbol {
                config.trading.symbol = name.symbol.clone();
            }
            match name.timeframe() {
                Some(tf) => config.trading.interval = tf,
                None => warn!(
                    minutes = name.interval_minutes,
                    "Unsupported interval in data file name, keeping {}", config.trading.interval
                ),
            }
        }
        None => warn!(
            path = %path.display(),
            symbol = %config.trading.symbol,
            "Could not read symbol and interval from file name, using configured values"
        ),
    }

    let series = load_series(&path, &config.trading.symbol, config.trading.interval)
        .with_context(|| format!("Failed to load historical data from {}", path.display()))?;

    info!(
        symbol = series.symbol(),
        interval = %series.timeframe(),
        candles = series.len(),
        "Loaded historical data"
    );
    Ok(series)
}

/// Build the configured strategy from the registry.
pub(crate) fn create_strategy(config: &AppConfig) -> Result<Box<dyn SignalStrategy>> {
    let registry = StrategyRegistry::new();
    let strategy = registry
        .create(&config.strategy.name, config.strategy.params.clone())
        .with_context(|| format!("Failed to create strategy '{}'", config.strategy.name))?;
    info!(strategy = strategy.name(), "Strategy ready");
    Ok(strategy)
}
