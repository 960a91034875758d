//! Trade Executor
//!
//! Turns a detected opportunity into a signed transaction, submits it with
//! `broadcast_tx_sync` and reconciles the signing context afterwards.
//!
//! Order of side effects:
//!     1. re-sync if the cached context is stale
//!     2. build messages, pick the fee for the message count
//!     3. pre-broadcast event (message JSON)
//!     4. sign, broadcast
//!     5. post-broadcast event (raw result)
//!     6. advance the local sequence
//!     7. settle delay, then refresh chain state
//!
//! Notes:
//!     - No retry and no sequence rollback on a failed sign/broadcast; the
//!       cache is marked stale and the error propagates
//!     - A non-zero CheckTx code still counts as sent: the sequence advances
//!       and the rejection is raised on the Alert channel

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::fees::FeeTable;
use super::strategy::MessageBuilder;
use crate::chain::{ChainClient, ChainStateCache, TxSigner};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::notify::{BotEvent, Channel, EventSink};
use crate::types::{BroadcastResult, OptimalTrade};

pub struct TradeExecutor {
    builder: Arc<dyn MessageBuilder>,
    signer: Arc<dyn TxSigner>,
    client: Arc<dyn ChainClient>,
    sink: Arc<dyn EventSink>,
    fee_table: FeeTable,
    wallet: String,
    flashloan_router: String,
    memo: String,
    settle_delay: Duration,
}

impl TradeExecutor {
    pub fn new(
        builder: Arc<dyn MessageBuilder>,
        signer: Arc<dyn TxSigner>,
        client: Arc<dyn ChainClient>,
        sink: Arc<dyn EventSink>,
        config: &BotConfig,
    ) -> Self {
        Self {
            builder,
            signer,
            client,
            sink,
            fee_table: config.tx_fees.clone(),
            wallet: config.wallet.address.clone(),
            flashloan_router: config.wallet.flashloan_router_address.clone(),
            memo: config.wallet.memo.clone(),
            settle_delay: config.arbitrage.settle_delay(),
        }
    }

    /// Execute `trade`, signing with the context cached in `chain`.
    pub async fn execute(
        &self,
        trade: &OptimalTrade,
        chain: &mut ChainStateCache,
    ) -> BotResult<BroadcastResult> {
        if !chain.is_synced() {
            info!("Signing context stale, re-syncing before broadcast");
            chain.refresh(&*self.client).await?;
        }

        let batch = self
            .builder
            .build_messages(trade, &self.wallet, &self.flashloan_router)?;
        let fee = self
            .fee_table
            .select(batch.message_count)
            .ok_or_else(|| BotError::Config("no fee configured".into()))?
            .clone();

        let messages_json = serde_json::to_string(&batch.messages)
            .map_err(|e| BotError::Strategy(format!("message serialization failed: {}", e)))?;
        self.sink
            .emit(
                &BotEvent::TradeMessages {
                    path: trade.path.clone(),
                    message_count: batch.message_count,
                    messages_json,
                },
                Channel::Console,
            )
            .await;

        let context = chain.context().clone();
        info!(
            "🚀 Executing {} | messages={} | gas={} | sequence={} | expected_profit={}",
            trade.path, batch.message_count, fee.gas, context.sequence, trade.expected_profit
        );

        let tx_bytes = match self
            .signer
            .sign(&self.wallet, &batch.messages, &fee, &self.memo, &context)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                chain.invalidate();
                return Err(into_broadcast_error("signing", e));
            }
        };

        let result = match self.client.broadcast_sync(tx_bytes).await {
            Ok(result) => result,
            Err(e) => {
                chain.invalidate();
                return Err(into_broadcast_error("broadcast", e));
            }
        };

        let event = BotEvent::BroadcastResult {
            path: trade.path.clone(),
            result: result.clone(),
            sequence: context.sequence,
        };
        self.sink.emit(&event, Channel::Console).await;

        if !result.accepted() {
            warn!(
                "CheckTx rejected {} | code={} | log={}",
                result.hash, result.code, result.log
            );
            self.sink.emit(&event, Channel::Alert).await;
        }

        chain.advance_sequence();

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let refreshed = chain.refresh(&*self.client).await.map(|_| ());
        if let Err(e) = refreshed {
            chain.invalidate();
            return Err(e);
        }

        Ok(result)
    }
}

fn into_broadcast_error(stage: &str, err: BotError) -> BotError {
    match err {
        BotError::Broadcast(_) => err,
        other => BotError::Broadcast(format!("{} failed: {}", stage, other)),
    }
}
