//! Collaborator traits for the harness.

mod execution;
mod market_feed;
mod sink;
mod strategy;

pub use execution::ExecutionClient;
pub use market_feed::MarketFeed;
pub use sink::{MemoryTradeSink, TradeSink};
pub use strategy::{SignalStrategy, StrategyConfig};
