//! Mempool Module
//!
//! Purpose:
//!     Watch the node's pending-transaction pool for size changes and turn
//!     growth into trade intents on tracked pools.
//!
//! Architecture:
//!     types.rs   - MempoolSnapshot, MempoolTrade, SizeChange, PollOutcome
//!     poller.rs  - size comparison, failure bound, parse on growth
//!     parser.rs  - MempoolParser capability + TxMemory dedup helper

pub mod parser;
pub mod poller;
pub mod types;

pub use parser::{MempoolParser, TxMemory};
pub use poller::MempoolPoller;
pub use types::{MempoolSnapshot, MempoolTrade, PollOutcome, RawMempool, SizeChange};
