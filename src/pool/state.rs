//! Pool State Storage
//!
//! Owned by the arbitrage loop. Mutated in place by the pool state updater
//! (confirmed state) and by mempool trade projection (pending state).

use crate::types::Pool;
use std::collections::HashMap;
use tracing::debug;

/// Pool states indexed by contract address
#[derive(Debug, Clone, Default)]
pub struct PoolStore {
    pools: HashMap<String, Pool>,
}

impl PoolStore {
    /// Create a new empty PoolStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a pool state
    pub fn update_pool(&mut self, pool: Pool) {
        debug!(
            "Updating pool: {} on {} - assets: {:?}",
            pool.address, pool.dex, pool.assets
        );
        self.pools.insert(pool.address.clone(), pool);
    }

    pub fn get(&self, address: &str) -> Option<&Pool> {
        self.pools.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Pool> {
        self.pools.get_mut(address)
    }

    /// True if the pool is tracked (mempool trades on other pools are ignored)
    pub fn contains(&self, address: &str) -> bool {
        self.pools.contains_key(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pool> {
        self.pools.values_mut()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Get statistics: (pool_count, oldest_block, newest_block)
    pub fn stats(&self) -> (usize, u64, u64) {
        let count = self.pools.len();
        let min_block = self.pools.values().map(|p| p.last_updated).min().unwrap_or(0);
        let max_block = self.pools.values().map(|p| p.last_updated).max().unwrap_or(0);

        (count, min_block, max_block)
    }
}

impl FromIterator<Pool> for PoolStore {
    fn from_iter<I: IntoIterator<Item = Pool>>(iter: I) -> Self {
        Self {
            pools: iter.into_iter().map(|p| (p.address.clone(), p)).collect(),
        }
    }
}
