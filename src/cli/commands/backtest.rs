//! Backtest command implementation.

use anyhow::{Context, Result};
use trading_backtest::{BacktestConfig, BacktestEngine};
use trading_config::AppConfig;
use trading_core::traits::{MemoryTradeSink, TradeSink};
use trading_monitor::{CsvTradeJournal, JournalKind};
use tracing::info;

use super::{apply_overrides, create_strategy, load_market_data};
use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, mut config: AppConfig) -> Result<()> {
    apply_overrides(&mut config, &args.market)?;
    let series = load_market_data(&mut config, args.market.symbol.is_some())?;
    let strategy = create_strategy(&config)?;

    let engine = BacktestEngine::new(BacktestConfig {
        trade_quantity: config.trading.trade_quantity,
        initial_capital: config.backtest.initial_capital,
        commission_rate: config.backtest.commission_rate,
        apply_commission: config.backtest.apply_commission,
    });

    info!(
        strategy = strategy.name(),
        symbol = series.symbol(),
        "Starting backtest"
    );

    let mut journal = CsvTradeJournal::new(&config.journal.log_folder, JournalKind::Backtest);
    let mut memory = MemoryTradeSink::new();
    let sink: &mut dyn TradeSink = if args.market.no_journal {
        &mut memory
    } else {
        &mut journal
    };

    let report = engine.run(&*strategy, &series, sink)?;

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(path) = journal.path() {
        println!("Trade journal: {}", path.display());
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    if let Some(csv_path) = &args.equity_csv {
        std::fs::write(csv_path, report.equity_to_csv())
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        info!("Equity curve saved to {:?}", csv_path);
    }

    Ok(())
}
