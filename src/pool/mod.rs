//! Pool state storage for the arbitrage loop.

pub mod state;

pub use state::PoolStore;
