//! Chain capabilities consumed by the loop.
//!
//! `ChainClient` covers node queries and broadcast, `TxSigner` covers signing
//! and binary encoding. Implementations map their failures onto the matching
//! `BotError` variant (ChainQuery, TransientPoll, Broadcast).

use crate::error::BotResult;
use crate::mempool::MempoolSnapshot;
use crate::types::{AccountInfo, BroadcastResult, EncodedMessage, Fee, SigningContext};
use async_trait::async_trait;

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account number and current sequence for `address`
    async fn account(&self, address: &str) -> BotResult<AccountInfo>;

    async fn chain_id(&self) -> BotResult<String>;

    async fn latest_block_height(&self) -> BotResult<u64>;

    /// Current view of the node's pending-transaction pool
    async fn mempool(&self) -> BotResult<MempoolSnapshot>;

    /// Submit signed bytes, returning after CheckTx (not after inclusion)
    async fn broadcast_sync(&self, tx_bytes: Vec<u8>) -> BotResult<BroadcastResult>;
}

#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Sign and encode `messages` into raw transaction bytes
    async fn sign(
        &self,
        signer_address: &str,
        messages: &[EncodedMessage],
        fee: &Fee,
        memo: &str,
        context: &SigningContext,
    ) -> BotResult<Vec<u8>>;
}
