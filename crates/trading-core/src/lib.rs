//! Core types and traits for the signal harness.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Series)
//! - Signals and the signal-to-order transition table
//! - The position ledger and simulated account
//! - Trade records for the audit trail
//! - Collaborator traits for strategies, trade sinks, execution clients and market feeds

pub mod types;
pub mod traits;
pub mod error;

pub use error::TradingError;
pub use types::*;
pub use traits::*;
