//! Mempool Type Definitions
//!
//! Purpose:
//!     Snapshot of the node's pending-transaction pool, parsed trade intents,
//!     and the outcomes reported by the poller.
//!
//! Notes:
//!     - Tendermint reports `total_bytes` as a string-encoded integer
//!     - `txs` is `null` on an empty mempool

use crate::error::BotError;
use crate::types::Asset;
use serde::Deserialize;

/// Point-in-time view of the mempool. Transient, re-sampled every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MempoolSnapshot {
    pub total_bytes: u64,
    /// Raw transactions, base64 as returned by the node
    pub entries: Vec<String>,
}

impl MempoolSnapshot {
    pub fn new(total_bytes: u64, entries: Vec<String>) -> Self {
        Self { total_bytes, entries }
    }
}

/// `unconfirmed_txs` result as it comes off the wire
#[derive(Debug, Clone, Deserialize)]
pub struct RawMempool {
    #[serde(default)]
    pub n_txs: Option<String>,
    pub total_bytes: String,
    #[serde(default)]
    pub txs: Option<Vec<String>>,
}

impl TryFrom<RawMempool> for MempoolSnapshot {
    type Error = BotError;

    fn try_from(raw: RawMempool) -> Result<Self, Self::Error> {
        let total_bytes = raw.total_bytes.trim().parse::<u64>().map_err(|e| {
            BotError::TransientPoll(format!("invalid total_bytes '{}': {}", raw.total_bytes, e))
        })?;

        Ok(Self {
            total_bytes,
            entries: raw.txs.unwrap_or_default(),
        })
    }
}

/// Trade intent decoded from one pending transaction that touches a tracked pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolTrade {
    /// Pool contract the pending swap targets
    pub pool_address: String,
    pub offer_asset: Asset,
    pub sender: String,
}

/// Size comparison against the last recorded mempool size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeChange {
    /// Mempool got smaller: a block was likely committed
    Shrunk { previous: u64, current: u64 },
    Unchanged,
    /// Mempool grew; the new size has been recorded
    Grown(MempoolSnapshot),
}

/// Result of one poll, as seen by the arbitrage loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Shrunk,
    /// Same size, or grown without any relevant trade
    Unchanged,
    Grown(Vec<MempoolTrade>),
}
