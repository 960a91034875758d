//! Chain State Cache
//!
//! Caches account number, sequence and chain id for signing. The local
//! sequence is the source of truth between re-syncs: it is bumped right after
//! a broadcast is accepted by the node, not after confirmation, so the next
//! trade can go out before the previous one lands.

use super::client::ChainClient;
use crate::error::BotResult;
use crate::types::SigningContext;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct ChainStateCache {
    address: String,
    context: SigningContext,
    /// False until the first refresh, and again after a failed broadcast
    synced: bool,
}

impl ChainStateCache {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            context: SigningContext::default(),
            synced: false,
        }
    }

    /// Re-query sequence, account number and chain id, replacing the cached
    /// values unconditionally. Errors propagate and leave the cache stale.
    pub async fn refresh<C: ChainClient + ?Sized>(&mut self, client: &C) -> BotResult<&SigningContext> {
        let (account, chain_id) =
            tokio::try_join!(client.account(&self.address), client.chain_id())?;

        if self.synced && account.sequence != self.context.sequence {
            debug!(
                "Sequence re-synced: local={} chain={}",
                self.context.sequence, account.sequence
            );
        }

        self.context = SigningContext {
            account_number: account.account_number,
            sequence: account.sequence,
            chain_id,
        };
        self.synced = true;

        info!(
            "Chain state refreshed | account_number={} sequence={} chain_id={}",
            self.context.account_number, self.context.sequence, self.context.chain_id
        );
        Ok(&self.context)
    }

    /// Bump the local sequence after a successful broadcast
    pub fn advance_sequence(&mut self) {
        self.context.sequence += 1;
        debug!("Local sequence advanced to {}", self.context.sequence);
    }

    /// Mark the cache as untrusted. The sequence is left as is.
    pub fn invalidate(&mut self) {
        if self.synced {
            warn!(
                "Chain state marked stale at sequence {}, re-sync required before next broadcast",
                self.context.sequence
            );
        }
        self.synced = false;
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}
