//! Paper trading command implementation.
//!
//! Drives the live trading loop with a feed that replays the data file one
//! candle per poll and a simulated account in place of an exchange. Polls and
//! closes wait as long as a live session would; `--poll-ms 0 --settle-ms 0`
//! replays at file speed.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use trading_broker::{LiveTrader, OrderSimulator, SimulatedExecutionClient, TraderConfig};
use trading_config::AppConfig;
use trading_core::traits::{MemoryTradeSink, TradeSink};
use trading_data::ReplayFeed;
use trading_monitor::{CsvTradeJournal, JournalKind};
use tracing::{info, warn};

use super::{apply_overrides, create_strategy, load_market_data};
use crate::cli::PaperArgs;

pub async fn run(args: PaperArgs, mut config: AppConfig) -> Result<()> {
    apply_overrides(&mut config, &args.market)?;
    let series = load_market_data(&mut config, args.market.symbol.is_some())?;
    let strategy = create_strategy(&config)?;

    let trader_config = TraderConfig {
        symbol: series.symbol().to_string(),
        timeframe: series.timeframe(),
        trade_quantity: config.trading.trade_quantity,
        kline_limit: config.trading.kline_limit,
        poll_interval: args
            .poll_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.trading.check_interval()),
        error_backoff: config.trading.error_backoff(),
        max_iterations: Some(series.len() as u64),
    };

    let client = SimulatedExecutionClient::new(
        OrderSimulator::new(series.symbol(), config.backtest.initial_capital).with_commission(
            config.backtest.commission_rate,
            config.backtest.apply_commission,
        ),
    )
    .with_settle_delay(
        args.settle_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.trading.settle_delay()),
    );
    let feed = ReplayFeed::new(series);

    let sink: Box<dyn TradeSink> = if args.market.no_journal {
        Box::new(MemoryTradeSink::new())
    } else {
        Box::new(CsvTradeJournal::new(
            &config.journal.log_folder,
            JournalKind::Live,
        ))
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current poll");
            let _ = shutdown_tx.send(true);
        }
    });

    info!(
        symbol = %trader_config.symbol,
        strategy = strategy.name(),
        candles = feed.len(),
        "Starting paper trading"
    );

    let mut trader = LiveTrader::new(
        trader_config,
        Arc::new(feed),
        Arc::new(client.clone()),
        strategy,
        sink,
    );
    let result = trader.run(shutdown_rx).await;
    ctrl_c.abort();
    let summary = result?;

    let account = client.account_snapshot()?;

    println!("═══════════════════════════════════════════════════════════");
    println!("                    PAPER TRADING SUMMARY                   ");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Symbol:              {}", account.position.symbol);
    println!("  Polls:               {}", summary.iterations);
    println!("  Orders:              {}", summary.orders);
    println!("  Rejected Fills:      {}", summary.rejected_fills);
    println!("  Errors:              {}", summary.errors);
    println!("  Final Balance:       ${:.2}", account.balance);
    println!(
        "  Open Position:       {} {}",
        account.position.side,
        account.position.size.normalize()
    );
    println!("═══════════════════════════════════════════════════════════");
    if !args.market.no_journal {
        println!("Trade journal folder: {}", config.journal.log_folder.display());
    }

    Ok(())
}
