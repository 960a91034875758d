//! Mempool Arbitrage Library
//!
//! Polling control loop for Cosmos (CosmWasm) DEX arbitrage: watches the
//! node's mempool, detects opportunities over a set of cyclic paths, and
//! executes with locally sequenced transactions. Detection, pool pricing,
//! message layout, signing and mempool decoding are injected capabilities.

pub mod arbitrage;
pub mod chain;
pub mod config;
pub mod error;
pub mod mempool;
pub mod notify;
pub mod observer;
pub mod pool;
pub mod runner;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use arbitrage::{ArbitrageLoop, Capabilities, StepOutcome};
pub use config::{load_config, BotConfig};
pub use error::{BotError, BotResult};
pub use pool::PoolStore;
pub use types::{OptimalTrade, Path, Pool};
