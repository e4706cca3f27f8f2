//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::load_config;
use trading_strategies::StrategyRegistry;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }
    if !StrategyRegistry::new().exists(&config.strategy.name) {
        anyhow::bail!("Unknown strategy '{}'", config.strategy.name);
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Symbol: {}", config.trading.symbol);
    println!("Interval: {}", config.trading.interval);
    println!("Trade quantity: {}", config.trading.trade_quantity);
    println!("Check interval: {}s", config.trading.check_interval_secs);
    println!("Initial capital: {}", config.backtest.initial_capital);
    println!(
        "Commission: {} ({})",
        config.backtest.commission_rate,
        if config.backtest.apply_commission {
            "charged"
        } else {
            "not charged"
        }
    );
    match &config.backtest.historical_data_file {
        Some(path) => println!("Historical data: {}", path.display()),
        None => println!("Historical data: (not set)"),
    }
    println!("Journal folder: {}", config.journal.log_folder.display());
    println!("Strategy: {}", config.strategy.name);

    Ok(())
}
