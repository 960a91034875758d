//! Chain Module
//!
//! Node access (queries, mempool, broadcast), signing capability, and the
//! cached signing context.

pub mod client;
pub mod state;
pub mod tendermint;

pub use client::{ChainClient, TxSigner};
pub use state::ChainStateCache;
pub use tendermint::TendermintClient;
