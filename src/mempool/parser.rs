//! Mempool parser seam
//!
//! Decoding raw mempool entries into trade intents is strategy-specific and
//! injected. `TxMemory` is the dedup helper implementations use so that a
//! pending transaction is projected onto pool state at most once per round.

use super::types::{MempoolSnapshot, MempoolTrade};
use crate::pool::PoolStore;
use std::collections::HashSet;

pub trait MempoolParser: Send + Sync {
    /// Trades in `snapshot` that touch a pool in `pools`
    fn parse(&mut self, snapshot: &MempoolSnapshot, pools: &PoolStore) -> Vec<MempoolTrade>;

    /// Project pending trades onto local pool reserves
    fn apply_to_pools(&self, pools: &mut PoolStore, trades: &[MempoolTrade]);

    /// Forget every transaction seen this round
    fn flush_memory(&mut self);
}

/// Set of mempool entries already handled in the current round
#[derive(Debug, Default, Clone)]
pub struct TxMemory {
    seen: HashSet<String>,
}

impl TxMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `entry` is seen since the last flush
    pub fn first_seen(&mut self, entry: &str) -> bool {
        if self.seen.contains(entry) {
            return false;
        }
        self.seen.insert(entry.to_string())
    }

    pub fn flush(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
