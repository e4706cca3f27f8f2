//! Order execution: the simulator, execution clients and the polling trader.

mod live;
mod paper;
mod simulator;
mod trader;

pub use live::{ExchangeApi, LiveExecutionClient};
pub use paper::SimulatedExecutionClient;
pub use simulator::{Classification, CommissionPolicy, OrderSimulator};
pub use trader::{LiveTrader, StepOutcome, TraderConfig, TraderSummary};
