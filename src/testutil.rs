//! Test doubles for the loop's capabilities.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::arbitrage::{MessageBuilder, OpportunityDetector, PoolStateUpdater};
use crate::chain::{ChainClient, TxSigner};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::mempool::{MempoolParser, MempoolSnapshot, MempoolTrade, TxMemory};
use crate::notify::{BotEvent, Channel, EventSink};
use crate::pool::PoolStore;
use crate::types::{
    AccountInfo, Asset, BroadcastResult, EncodedMessage, Fee, MessageBatch, OptimalTrade, Path,
    SigningContext,
};

pub fn sample_config() -> BotConfig {
    BotConfig::from_toml_str(
        r#"
        [chain]
        rpc_url = "http://localhost:26657"
        rest_url = "http://localhost:1317"

        [wallet]
        address = "terra1bot"
        flashloan_router_address = "terra1router"

        [arbitrage]
        settle_delay_ms = 0
        step_poll_timeout_ms = 2000

        [tx_fees.1]
        gas = 1000000
        amount = [{ denom = "uluna", amount = "150000" }]

        [tx_fees.2]
        gas = 2000000
        amount = [{ denom = "uluna", amount = "300000" }]

        [tx_fees.3]
        gas = 3000000
        amount = [{ denom = "uluna", amount = "450000" }]
        "#,
    )
    .unwrap()
}

pub fn sample_trade() -> OptimalTrade {
    trade_through(["pool_a", "pool_b", "pool_c"])
}

pub fn trade_through<const N: usize>(pools: [&str; N]) -> OptimalTrade {
    OptimalTrade {
        path: Path::new(pools),
        offer_asset: Asset::new("uluna", 1_000_000),
        expected_profit: 5_000,
    }
}

pub fn trade_on(pool: &str) -> MempoolTrade {
    MempoolTrade {
        pool_address: pool.to_string(),
        offer_asset: Asset::new("uluna", 10_000),
        sender: "terra1whale".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Chain

struct ChainInner {
    account_number: u64,
    sequence: u64,
    chain_id: String,
    height: u64,
    mempool_sizes: VecDeque<u64>,
    last_size: u64,
    mempool_calls: usize,
    fail_mempool: bool,
    mempool_failures_left: u32,
    mempool_failing_calls: Vec<usize>,
    fail_account: bool,
    account_successes_left: Option<u32>,
    fail_broadcast: bool,
    reject_code: Option<u32>,
    advance_on_broadcast: bool,
    broadcasts: usize,
}

pub struct MockChain {
    inner: Mutex<ChainInner>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ChainInner {
                account_number: 1,
                sequence: 0,
                chain_id: "localterra".to_string(),
                height: 1000,
                mempool_sizes: VecDeque::new(),
                last_size: 0,
                mempool_calls: 0,
                fail_mempool: false,
                mempool_failures_left: 0,
                mempool_failing_calls: Vec::new(),
                fail_account: false,
                account_successes_left: None,
                fail_broadcast: false,
                reject_code: None,
                advance_on_broadcast: false,
                broadcasts: 0,
            }),
        }
    }

    pub fn with_account(self, account_number: u64, sequence: u64) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.account_number = account_number;
            inner.sequence = sequence;
        }
        self
    }

    pub fn with_chain_id(self, chain_id: &str) -> Self {
        self.inner.lock().unwrap().chain_id = chain_id.to_string();
        self
    }

    /// Sizes returned by successive mempool fetches; the last one repeats
    pub fn with_mempool_sizes(self, sizes: impl IntoIterator<Item = u64>) -> Self {
        self.inner.lock().unwrap().mempool_sizes.extend(sizes);
        self
    }

    pub fn set_sequence(&self, sequence: u64) {
        self.inner.lock().unwrap().sequence = sequence;
    }

    pub fn fail_account_queries(&self, fail: bool) {
        self.inner.lock().unwrap().fail_account = fail;
    }

    /// Answer `n` more account queries, then fail every one after
    pub fn fail_account_after(&self, n: u32) {
        self.inner.lock().unwrap().account_successes_left = Some(n);
    }

    pub fn fail_mempool(&self, fail: bool) {
        self.inner.lock().unwrap().fail_mempool = fail;
    }

    /// Fail the fetches with these 1-based call numbers
    pub fn fail_mempool_on_calls(&self, calls: impl IntoIterator<Item = usize>) {
        self.inner.lock().unwrap().mempool_failing_calls.extend(calls);
    }

    /// Fail the next `n` mempool fetches, then recover
    pub fn fail_mempool_times(&self, n: u32) {
        self.inner.lock().unwrap().mempool_failures_left = n;
    }

    pub fn fail_broadcasts(&self, fail: bool) {
        self.inner.lock().unwrap().fail_broadcast = fail;
    }

    pub fn reject_with_code(&self, code: Option<u32>) {
        self.inner.lock().unwrap().reject_code = code;
    }

    /// Bump the on-chain sequence for every accepted broadcast
    pub fn advance_on_broadcast(&self, advance: bool) {
        self.inner.lock().unwrap().advance_on_broadcast = advance;
    }

    pub fn broadcast_count(&self) -> usize {
        self.inner.lock().unwrap().broadcasts
    }

    pub fn mempool_calls(&self) -> usize {
        self.inner.lock().unwrap().mempool_calls
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn account(&self, _address: &str) -> BotResult<AccountInfo> {
        let mut inner = self.inner.lock().unwrap();
        let successes_left = inner.account_successes_left;
        match successes_left {
            Some(0) => inner.fail_account = true,
            Some(n) => inner.account_successes_left = Some(n - 1),
            None => {}
        }
        if inner.fail_account {
            return Err(BotError::ChainQuery("account endpoint unavailable".into()));
        }
        Ok(AccountInfo {
            account_number: inner.account_number,
            sequence: inner.sequence,
        })
    }

    async fn chain_id(&self) -> BotResult<String> {
        Ok(self.inner.lock().unwrap().chain_id.clone())
    }

    async fn latest_block_height(&self) -> BotResult<u64> {
        Ok(self.inner.lock().unwrap().height)
    }

    async fn mempool(&self) -> BotResult<MempoolSnapshot> {
        let mut inner = self.inner.lock().unwrap();
        inner.mempool_calls += 1;
        if inner.fail_mempool {
            return Err(BotError::TransientPoll("connection reset".into()));
        }
        let call = inner.mempool_calls;
        if inner.mempool_failing_calls.contains(&call) {
            return Err(BotError::TransientPoll("connection reset".into()));
        }
        if inner.mempool_failures_left > 0 {
            inner.mempool_failures_left -= 1;
            return Err(BotError::TransientPoll("connection reset".into()));
        }

        let size = inner.mempool_sizes.pop_front().unwrap_or(inner.last_size);
        inner.last_size = size;
        let entries = (0..size / 100).map(|i| format!("tx-{}-{}", size, i)).collect();
        Ok(MempoolSnapshot::new(size, entries))
    }

    async fn broadcast_sync(&self, _tx_bytes: Vec<u8>) -> BotResult<BroadcastResult> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_broadcast {
            return Err(BotError::Broadcast("connection refused".into()));
        }
        inner.broadcasts += 1;

        let code = inner.reject_code.unwrap_or(0);
        if code == 0 && inner.advance_on_broadcast {
            inner.sequence += 1;
        }
        Ok(BroadcastResult {
            code,
            hash: format!("HASH{}", inner.broadcasts),
            log: if code == 0 { "[]".into() } else { "rejected".into() },
        })
    }
}

// ---------------------------------------------------------------------------
// Signer

#[derive(Default)]
struct SignerInner {
    fail: bool,
    sequences: Vec<u64>,
    gas: Vec<u64>,
}

#[derive(Default)]
pub struct MockSigner {
    inner: Mutex<SignerInner>,
}

impl MockSigner {
    pub fn fail(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    pub fn signed_sequences(&self) -> Vec<u64> {
        self.inner.lock().unwrap().sequences.clone()
    }

    pub fn signed_gas(&self) -> Vec<u64> {
        self.inner.lock().unwrap().gas.clone()
    }
}

#[async_trait]
impl TxSigner for MockSigner {
    async fn sign(
        &self,
        _signer_address: &str,
        messages: &[EncodedMessage],
        fee: &Fee,
        _memo: &str,
        context: &SigningContext,
    ) -> BotResult<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            return Err(BotError::Strategy("key locked".into()));
        }
        inner.sequences.push(context.sequence);
        inner.gas.push(fee.gas);
        Ok(serde_json::to_vec(messages).unwrap())
    }
}

// ---------------------------------------------------------------------------
// Strategy

pub struct MockBuilder {
    message_count: usize,
    calls: Mutex<usize>,
}

impl MockBuilder {
    pub fn new(message_count: usize) -> Self {
        Self {
            message_count,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl MessageBuilder for MockBuilder {
    fn build_messages(
        &self,
        trade: &OptimalTrade,
        wallet: &str,
        flashloan_router: &str,
    ) -> BotResult<MessageBatch> {
        *self.calls.lock().unwrap() += 1;
        let messages = trade
            .path
            .pools
            .iter()
            .map(|pool| EncodedMessage {
                type_url: "/cosmwasm.wasm.v1.MsgExecuteContract".to_string(),
                value: json!({ "sender": wallet, "contract": pool, "router": flashloan_router }),
            })
            .collect();
        Ok(MessageBatch {
            messages,
            message_count: self.message_count,
        })
    }
}

/// Scripted detector; returns nothing once the script runs out
#[derive(Clone, Default)]
pub struct MockDetector {
    script: Arc<Mutex<VecDeque<Result<Option<OptimalTrade>, String>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockDetector {
    pub fn then_find(self, trade: OptimalTrade) -> Self {
        self.script.lock().unwrap().push_back(Ok(Some(trade)));
        self
    }

    pub fn then_nothing(self) -> Self {
        self.script.lock().unwrap().push_back(Ok(None));
        self
    }

    pub fn then_fail(self, reason: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl OpportunityDetector for MockDetector {
    fn detect(
        &self,
        _paths: &[Path],
        _pools: &PoolStore,
        _config: &BotConfig,
    ) -> BotResult<Option<OptimalTrade>> {
        *self.calls.lock().unwrap() += 1;
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(found)) => Ok(found),
            Some(Err(reason)) => Err(BotError::Strategy(reason)),
            None => Ok(None),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockUpdater {
    calls: Arc<Mutex<usize>>,
}

impl MockUpdater {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PoolStateUpdater for MockUpdater {
    async fn update_pools(&self, _pools: &mut PoolStore) -> BotResult<()> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mempool parser

#[derive(Default)]
struct ParserInner {
    queued: VecDeque<Vec<MempoolTrade>>,
    parse_calls: usize,
    applied: Vec<MempoolTrade>,
    flushes: usize,
    memory: TxMemory,
}

/// Parser double; clones share state so tests can inspect a boxed copy
#[derive(Clone, Default)]
pub struct MockParser {
    inner: Arc<Mutex<ParserInner>>,
}

impl MockParser {
    /// Trades returned by the next parse call
    pub fn queue_trades(&self, trades: Vec<MempoolTrade>) {
        self.inner.lock().unwrap().queued.push_back(trades);
    }

    pub fn parse_calls(&self) -> usize {
        self.inner.lock().unwrap().parse_calls
    }

    pub fn applied(&self) -> Vec<MempoolTrade> {
        self.inner.lock().unwrap().applied.clone()
    }

    pub fn flushes(&self) -> usize {
        self.inner.lock().unwrap().flushes
    }

    pub fn memory_len(&self) -> usize {
        self.inner.lock().unwrap().memory.len()
    }
}

impl MempoolParser for MockParser {
    fn parse(&mut self, snapshot: &MempoolSnapshot, pools: &PoolStore) -> Vec<MempoolTrade> {
        let mut inner = self.inner.lock().unwrap();
        inner.parse_calls += 1;
        for entry in &snapshot.entries {
            inner.memory.first_seen(entry);
        }
        inner
            .queued
            .pop_front()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| pools.is_empty() || pools.contains(&t.pool_address))
            .collect()
    }

    fn apply_to_pools(&self, pools: &mut PoolStore, trades: &[MempoolTrade]) {
        let mut inner = self.inner.lock().unwrap();
        for trade in trades {
            if let Some(reserve) = pools
                .get_mut(&trade.pool_address)
                .and_then(|p| p.reserve_mut(&trade.offer_asset.denom))
            {
                *reserve += trade.offer_asset.amount;
            }
            inner.applied.push(trade.clone());
        }
    }

    fn flush_memory(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.flushes += 1;
        inner.memory.flush();
    }
}

// ---------------------------------------------------------------------------
// Events

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(BotEvent, Channel)>>,
}

impl RecordingSink {
    pub fn events(&self, channel: Channel) -> Vec<BotEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| *c == channel)
            .map(|(e, _)| e.clone())
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: &BotEvent, channel: Channel) {
        self.events.lock().unwrap().push((event.clone(), channel));
    }
}
