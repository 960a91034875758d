//! Arbitrage Loop - step/reset cycle over confirmed state and the mempool
//!
//! Purpose:
//!     One `step()` refreshes pools from confirmed state and looks for an
//!     opportunity. If there is none it watches the mempool: growth with
//!     trades on tracked pools is projected onto local reserves and detection
//!     re-runs; shrinkage means a block landed and the step is abandoned.
//!     `reset()` runs between steps and releases cooled-down paths.
//!
//! Notes:
//!     - Sole owner and mutator of pools, paths and cooldown entries
//!     - Transient poll errors are absorbed until the poller's bound trips
//!     - The polling phase is capped by `step_poll_timeout_ms` (0 = no cap)

use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::cooldown::PathCooldown;
use super::executor::TradeExecutor;
use super::strategy::{MessageBuilder, OpportunityDetector, PoolStateUpdater};
use crate::chain::{ChainClient, ChainStateCache, TxSigner};
use crate::config::BotConfig;
use crate::error::BotResult;
use crate::mempool::{MempoolParser, MempoolPoller, PollOutcome};
use crate::notify::EventSink;
use crate::pool::PoolStore;
use crate::types::{BroadcastResult, OptimalTrade, Path};

/// Injected capabilities
pub struct Capabilities {
    pub client: Arc<dyn ChainClient>,
    pub signer: Arc<dyn TxSigner>,
    pub builder: Arc<dyn MessageBuilder>,
    pub detector: Box<dyn OpportunityDetector>,
    pub updater: Box<dyn PoolStateUpdater>,
    pub parser: Box<dyn MempoolParser>,
    pub sink: Arc<dyn EventSink>,
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A trade was broadcast
    Traded(BroadcastResult),
    /// Mempool shrank before anything turned up
    Abandoned,
    /// Polling phase hit `step_poll_timeout_ms`
    TimedOut,
}

pub struct ArbitrageLoop {
    config: BotConfig,
    pools: PoolStore,
    paths: Vec<Path>,
    cooldown: PathCooldown,
    poller: MempoolPoller,
    chain_state: ChainStateCache,
    executor: TradeExecutor,
    client: Arc<dyn ChainClient>,
    detector: Box<dyn OpportunityDetector>,
    updater: Box<dyn PoolStateUpdater>,
    parser: Box<dyn MempoolParser>,
    sink: Arc<dyn EventSink>,
    iteration: u64,
}

impl ArbitrageLoop {
    pub fn new(config: BotConfig, pools: PoolStore, paths: Vec<Path>, caps: Capabilities) -> Self {
        let executor = TradeExecutor::new(
            caps.builder,
            caps.signer,
            caps.client.clone(),
            caps.sink.clone(),
            &config,
        );

        let (pool_count, oldest, newest) = pools.stats();
        info!(
            "Arbitrage loop created | pools={} (synced blocks {}..{}) | paths={} | cooldown={} iterations",
            pool_count,
            oldest,
            newest,
            paths.len(),
            config.arbitrage.cooldown_blocks
        );

        Self {
            cooldown: PathCooldown::new(config.arbitrage.cooldown_blocks),
            poller: MempoolPoller::new(config.arbitrage.max_consecutive_poll_failures),
            chain_state: ChainStateCache::new(config.wallet.address.clone()),
            executor,
            client: caps.client,
            detector: caps.detector,
            updater: caps.updater,
            parser: caps.parser,
            sink: caps.sink,
            config,
            pools,
            paths,
            iteration: 0,
        }
    }

    /// First sync of the signing context
    pub async fn initialize(&mut self) -> BotResult<()> {
        self.chain_state.refresh(&*self.client).await?;
        Ok(())
    }

    pub async fn step(&mut self) -> BotResult<StepOutcome> {
        self.iteration += 1;
        debug!("Step {} | active={} cooling={}", self.iteration, self.paths.len(), self.cooldown.len());

        self.updater.update_pools(&mut self.pools).await?;

        if let Some(trade) = self.detector.detect(&self.paths, &self.pools, &self.config)? {
            info!("Opportunity on confirmed state: {}", trade.path);
            return self.trade(trade).await.map(StepOutcome::Traded);
        }

        let deadline = self
            .config
            .arbitrage
            .step_poll_timeout()
            .map(|timeout| Instant::now() + timeout);

        loop {
            // Checked on every pass: a fast fetch completes before the
            // timeout wrapper ever looks at the deadline
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                debug!("Step {} polling timed out", self.iteration);
                return Ok(StepOutcome::TimedOut);
            }

            let polled = match deadline {
                Some(deadline) => {
                    let poll = self.poller.poll(&*self.client, self.parser.as_mut(), &self.pools);
                    match tokio::time::timeout_at(deadline, poll).await {
                        Ok(polled) => polled,
                        Err(_) => {
                            debug!("Step {} polling timed out", self.iteration);
                            return Ok(StepOutcome::TimedOut);
                        }
                    }
                }
                None => {
                    self.poller
                        .poll(&*self.client, self.parser.as_mut(), &self.pools)
                        .await
                }
            };

            let outcome = match polled {
                Ok(outcome) => outcome,
                Err(e) if e.is_transient() => {
                    self.pause().await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match outcome {
                PollOutcome::Shrunk => {
                    debug!("Step {} abandoned: mempool shrank", self.iteration);
                    return Ok(StepOutcome::Abandoned);
                }
                PollOutcome::Unchanged => self.pause().await,
                PollOutcome::Grown(trades) => {
                    self.parser.apply_to_pools(&mut self.pools, &trades);
                    if let Some(trade) = self.detector.detect(&self.paths, &self.pools, &self.config)? {
                        info!(
                            "Opportunity after {} pending trade(s): {}",
                            trades.len(),
                            trade.path
                        );
                        return self.trade(trade).await.map(StepOutcome::Traded);
                    }
                }
            }
        }
    }

    /// Between steps: release due paths, zero the recorded mempool size and
    /// flush the parser's dedup memory.
    pub fn reset(&mut self) {
        self.cooldown.release(&mut self.paths, self.iteration);
        self.poller.reset();
        self.parser.flush_memory();
    }

    /// Compensating re-sync of the signing context
    pub async fn resync(&mut self) -> BotResult<()> {
        self.chain_state.refresh(&*self.client).await?;
        Ok(())
    }

    async fn trade(&mut self, trade: OptimalTrade) -> BotResult<BroadcastResult> {
        let result = self.executor.execute(&trade, &mut self.chain_state).await?;
        self.cooldown.retire(&trade.path, &mut self.paths, self.iteration);
        Ok(result)
    }

    async fn pause(&self) {
        let backoff = self.config.arbitrage.poll_backoff();
        if backoff.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(backoff).await;
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn active_paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn cooldown(&self) -> &PathCooldown {
        &self.cooldown
    }

    pub fn pools(&self) -> &PoolStore {
        &self.pools
    }

    pub fn chain_state(&self) -> &ChainStateCache {
        &self.chain_state
    }

    pub fn recorded_mempool_bytes(&self) -> u64 {
        self.poller.last_total_bytes()
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }
}
