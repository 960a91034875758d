//! Strategy capabilities
//!
//! Profitability, pool pricing and contract message layout are supplied by
//! the caller. The loop only needs these three seams.

use async_trait::async_trait;

use crate::config::BotConfig;
use crate::error::BotResult;
use crate::pool::PoolStore;
use crate::types::{MessageBatch, OptimalTrade, Path};

/// Finds the best trade over the active paths, if any clears the threshold
pub trait OpportunityDetector: Send + Sync {
    fn detect(
        &self,
        paths: &[Path],
        pools: &PoolStore,
        config: &BotConfig,
    ) -> BotResult<Option<OptimalTrade>>;
}

/// Refreshes pool reserves from confirmed chain state
#[async_trait]
pub trait PoolStateUpdater: Send + Sync {
    async fn update_pools(&self, pools: &mut PoolStore) -> BotResult<()>;
}

/// Lays out the contract messages for a trade
pub trait MessageBuilder: Send + Sync {
    fn build_messages(
        &self,
        trade: &OptimalTrade,
        wallet: &str,
        flashloan_router: &str,
    ) -> BotResult<MessageBatch>;
}
