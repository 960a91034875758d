//! Mempool Poller
//!
//! Purpose:
//!     Sample the node's pending-transaction pool and classify each sample
//!     against the last recorded total size.
//!
//! Notes:
//!     - smaller → Shrunk, the recorded size is NOT updated
//!     - equal   → Unchanged
//!     - larger  → size recorded, snapshot parsed into trades on tracked pools
//!     - The recorded size starts (and resets) at 0, so the first non-empty
//!       sample of a round is always Grown
//!     - Fetch failures are counted; the bound turns them into a hard error

use super::parser::MempoolParser;
use super::types::{PollOutcome, SizeChange};
use crate::chain::ChainClient;
use crate::error::{BotError, BotResult};
use crate::pool::PoolStore;
use tracing::{debug, warn};

/// Default bound on consecutive failed mempool fetches
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 10;

#[derive(Debug)]
pub struct MempoolPoller {
    last_total_bytes: u64,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
}

impl MempoolPoller {
    pub fn new(max_consecutive_failures: u32) -> Self {
        Self {
            last_total_bytes: 0,
            consecutive_failures: 0,
            max_consecutive_failures: max_consecutive_failures.max(1),
        }
    }

    /// Fetch a snapshot and compare its size to the recorded one.
    pub async fn sample<C: ChainClient + ?Sized>(&mut self, client: &C) -> BotResult<SizeChange> {
        let snapshot = match client.mempool().await {
            Ok(s) => {
                self.consecutive_failures = 0;
                s
            }
            Err(e) => return Err(self.record_failure(e)),
        };

        let previous = self.last_total_bytes;
        let current = snapshot.total_bytes;

        if current < previous {
            debug!("Mempool shrunk | {} -> {} bytes", previous, current);
            Ok(SizeChange::Shrunk { previous, current })
        } else if current == previous {
            Ok(SizeChange::Unchanged)
        } else {
            self.last_total_bytes = current;
            debug!(
                "Mempool grew | {} -> {} bytes | {} txs",
                previous,
                current,
                snapshot.entries.len()
            );
            Ok(SizeChange::Grown(snapshot))
        }
    }

    /// One poll as the arbitrage loop sees it. Growth that yields no trade on
    /// a tracked pool is reported as Unchanged.
    pub async fn poll<C: ChainClient + ?Sized>(
        &mut self,
        client: &C,
        parser: &mut dyn MempoolParser,
        pools: &PoolStore,
    ) -> BotResult<PollOutcome> {
        match self.sample(client).await? {
            SizeChange::Shrunk { .. } => Ok(PollOutcome::Shrunk),
            SizeChange::Unchanged => Ok(PollOutcome::Unchanged),
            SizeChange::Grown(snapshot) => {
                let trades = parser.parse(&snapshot, pools);
                if trades.is_empty() {
                    Ok(PollOutcome::Unchanged)
                } else {
                    debug!("Mempool trades on tracked pools: {}", trades.len());
                    Ok(PollOutcome::Grown(trades))
                }
            }
        }
    }

    fn record_failure(&mut self, err: BotError) -> BotError {
        self.consecutive_failures += 1;
        let last = err.to_string();

        if self.consecutive_failures >= self.max_consecutive_failures {
            let attempts = self.consecutive_failures;
            self.consecutive_failures = 0;
            return BotError::PollFailuresExhausted { attempts, last };
        }

        warn!(
            "Mempool fetch failed ({}/{}): {}",
            self.consecutive_failures, self.max_consecutive_failures, last
        );
        match err {
            BotError::TransientPoll(_) => err,
            other => BotError::TransientPoll(other.to_string()),
        }
    }

    /// Zero the recorded size. Failure count is left alone.
    pub fn reset(&mut self) {
        self.last_total_bytes = 0;
    }

    pub fn last_total_bytes(&self) -> u64 {
        self.last_total_bytes
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

impl Default for MempoolPoller {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSECUTIVE_FAILURES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockChain, MockParser};

    #[tokio::test]
    async fn test_size_sequence_against_recorded_size() {
        let chain = MockChain::new().with_mempool_sizes([100, 100, 100, 150, 90]);
        let mut poller = MempoolPoller::default();

        // First sample after reset establishes the baseline
        assert!(matches!(poller.sample(&chain).await.unwrap(), SizeChange::Grown(_)));
        assert_eq!(poller.last_total_bytes(), 100);

        assert_eq!(poller.sample(&chain).await.unwrap(), SizeChange::Unchanged);
        assert_eq!(poller.sample(&chain).await.unwrap(), SizeChange::Unchanged);
        assert!(matches!(poller.sample(&chain).await.unwrap(), SizeChange::Grown(_)));
        assert_eq!(poller.last_total_bytes(), 150);
        assert_eq!(
            poller.sample(&chain).await.unwrap(),
            SizeChange::Shrunk { previous: 150, current: 90 }
        );
    }

    #[tokio::test]
    async fn test_shrunk_does_not_update_recorded_size() {
        let chain = MockChain::new().with_mempool_sizes([200, 120, 150]);
        let mut poller = MempoolPoller::default();

        poller.sample(&chain).await.unwrap();
        assert!(matches!(poller.sample(&chain).await.unwrap(), SizeChange::Shrunk { .. }));
        assert_eq!(poller.last_total_bytes(), 200);
        // Still below the recorded 200
        assert!(matches!(poller.sample(&chain).await.unwrap(), SizeChange::Shrunk { .. }));
    }

    #[tokio::test]
    async fn test_grown_without_relevant_trades_is_unchanged() {
        let chain = MockChain::new().with_mempool_sizes([100, 180]);
        let mut parser = MockParser::default();
        let pools = PoolStore::new();
        let mut poller = MempoolPoller::default();

        assert_eq!(
            poller.poll(&chain, &mut parser, &pools).await.unwrap(),
            PollOutcome::Unchanged
        );
        assert_eq!(parser.parse_calls(), 1);

        parser.queue_trades(vec![crate::testutil::trade_on("pool_a")]);
        match poller.poll(&chain, &mut parser, &pools).await.unwrap() {
            PollOutcome::Grown(trades) => assert_eq!(trades[0].pool_address, "pool_a"),
            other => panic!("expected Grown, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failures_are_bounded() {
        let chain = MockChain::new();
        chain.fail_mempool(true);
        let mut poller = MempoolPoller::new(3);

        assert!(poller.sample(&chain).await.unwrap_err().is_transient());
        assert!(poller.sample(&chain).await.unwrap_err().is_transient());
        match poller.sample(&chain).await.unwrap_err() {
            BotError::PollFailuresExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected PollFailuresExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let chain = MockChain::new().with_mempool_sizes([10]);
        let mut poller = MempoolPoller::new(3);

        chain.fail_mempool(true);
        let _ = poller.sample(&chain).await;
        let _ = poller.sample(&chain).await;
        assert_eq!(poller.consecutive_failures(), 2);

        chain.fail_mempool(false);
        poller.sample(&chain).await.unwrap();
        assert_eq!(poller.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_reset_zeroes_recorded_size() {
        let chain = MockChain::new().with_mempool_sizes([100, 100]);
        let mut poller = MempoolPoller::default();

        poller.sample(&chain).await.unwrap();
        poller.reset();
        assert_eq!(poller.last_total_bytes(), 0);
        assert!(matches!(poller.sample(&chain).await.unwrap(), SizeChange::Grown(_)));
    }
}
