//! Core data structures shared by the loop, the executor and the strategies.
//!
//! Pools are keyed by contract address. Paths reference pools by address only,
//! so the orchestrator's PoolStore stays the single owner of market state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// An amount of a single denom (native denom or cw20 contract address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub denom: String,
    pub amount: u128,
}

impl Asset {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// DEX pool state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    pub dex: String,
    pub assets: Vec<Asset>,
    /// Block height of the last confirmed-state sync (0 = never synced)
    #[serde(default)]
    pub last_updated: u64,
}

impl Pool {
    pub fn new(address: impl Into<String>, dex: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            address: address.into(),
            dex: dex.into(),
            assets,
            last_updated: 0,
        }
    }

    /// Reserve held by the pool for `denom`
    pub fn reserve_of(&self, denom: &str) -> Option<u128> {
        self.assets.iter().find(|a| a.denom == denom).map(|a| a.amount)
    }

    /// Mutable reserve for `denom`, used when projecting pending trades
    pub fn reserve_mut(&mut self, denom: &str) -> Option<&mut u128> {
        self.assets
            .iter_mut()
            .find(|a| a.denom == denom)
            .map(|a| &mut a.amount)
    }
}

/// Cyclic trade route, as an ordered list of pool addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub pools: Vec<String>,
}

impl Path {
    pub fn new<S: Into<String>>(pools: impl IntoIterator<Item = S>) -> Self {
        Self {
            pools: pools.into_iter().map(Into::into).collect(),
        }
    }

    /// Unique pool addresses traversed by this path
    pub fn addresses(&self) -> HashSet<&str> {
        self.pools.iter().map(String::as_str).collect()
    }

    pub fn contains_pool(&self, address: &str) -> bool {
        self.pools.iter().any(|p| p == address)
    }

    /// Hop count
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pools.join(" -> "))
    }
}

/// Opportunity returned by the detection strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalTrade {
    pub path: Path,
    /// What the first hop offers
    pub offer_asset: Asset,
    /// Expected profit in the offer denom (may be negative for diagnostics)
    pub expected_profit: i128,
}

/// Cosmos SDK coin, amounts kept as strings the way the chain encodes them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Transaction fee for a given message count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas: u64,
}

/// Message object handed to the signer (type url + JSON value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedMessage {
    pub type_url: String,
    pub value: serde_json::Value,
}

/// Output of the message builder. `message_count` selects the fee and may
/// differ from `messages.len()` (e.g. one wrapper message around N swaps).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBatch {
    pub messages: Vec<EncodedMessage>,
    pub message_count: usize,
}

/// Account data returned by the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_number: u64,
    pub sequence: u64,
}

/// Everything the signer needs besides the messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SigningContext {
    pub account_number: u64,
    pub sequence: u64,
    pub chain_id: String,
}

/// Raw result of broadcast_tx_sync (CheckTx only, not inclusion)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub log: String,
}

impl BroadcastResult {
    /// CheckTx accepted the transaction
    pub fn accepted(&self) -> bool {
        self.code == 0
    }
}
