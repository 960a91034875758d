//! Arbitrage Module
//!
//! Step/reset loop, path cooldown, fee selection and trade execution.
//! Detection, pool refresh and message layout are injected (strategy.rs).

pub mod cooldown;
pub mod executor;
pub mod fees;
pub mod mempool_loop;
pub mod strategy;

pub use cooldown::{CooldownEntry, PathCooldown};
pub use executor::TradeExecutor;
pub use fees::FeeTable;
pub use mempool_loop::{ArbitrageLoop, Capabilities, StepOutcome};
pub use strategy::{MessageBuilder, OpportunityDetector, PoolStateUpdater};
