//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harness")]
#[command(author, version, about = "Single-asset signal backtesting and paper trading harness")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to `logging.level` from the config)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay historical candles through a strategy
    Backtest(BacktestArgs),
    /// Run the live trading loop against a replayed feed and a simulated account
    Paper(PaperArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

/// Options shared by every command that loads candles and a strategy.
#[derive(clap::Args)]
pub struct MarketArgs {
    /// Historical data file (CSV); defaults to `backtest.historical_data_file`
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Symbol; defaults to the one in the data file name, then `trading.symbol`
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Strategy registry key; defaults to `strategy.name`
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Strategy configuration file (JSON)
    #[arg(long)]
    pub strategy_config: Option<PathBuf>,

    /// Starting balance
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Quantity per opened position
    #[arg(short, long)]
    pub quantity: Option<Decimal>,

    /// Commission rate per fill, as a fraction of notional
    #[arg(long)]
    pub commission_rate: Option<Decimal>,

    /// Charge commission on every fill
    #[arg(long)]
    pub apply_commission: bool,

    /// Folder for the trade journal; defaults to `journal.log_folder`
    #[arg(long)]
    pub log_folder: Option<PathBuf>,

    /// Do not write a trade journal
    #[arg(long)]
    pub no_journal: bool,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save the JSON report to file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Save the equity curve as CSV
    #[arg(long)]
    pub equity_csv: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Pause between polls in milliseconds; defaults to `trading.check_interval_secs`
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Pause after each close in milliseconds; defaults to `trading.settle_delay_secs`
    #[arg(long)]
    pub settle_ms: Option<u64>,
}
