//! Fee table keyed by message count.
//!
//! Lookup takes the exact count when configured, otherwise the entry with the
//! largest key. Construction rejects an empty table.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::BotError;
use crate::types::Fee;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Fee>")]
pub struct FeeTable(BTreeMap<usize, Fee>);

impl FeeTable {
    pub fn new(entries: BTreeMap<usize, Fee>) -> Result<Self, BotError> {
        if entries.is_empty() {
            return Err(BotError::Config("tx_fees must contain at least one entry".into()));
        }
        Ok(Self(entries))
    }

    /// Fee for a transaction carrying `message_count` messages
    pub fn select(&self, message_count: usize) -> Option<&Fee> {
        self.0
            .get(&message_count)
            .or_else(|| self.0.values().next_back())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.0.keys().next_back().copied().unwrap_or_default()
    }
}

impl TryFrom<BTreeMap<String, Fee>> for FeeTable {
    type Error = BotError;

    fn try_from(raw: BTreeMap<String, Fee>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, fee) in raw {
            let count = key.trim().parse::<usize>().map_err(|_| {
                BotError::Config(format!("tx_fees key '{}' is not a message count", key))
            })?;
            entries.insert(count, fee);
        }
        Self::new(entries)
    }
}
