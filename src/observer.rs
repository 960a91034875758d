//! Mempool observer
//!
//! Samples the node's mempool on a fixed interval and logs growth and
//! shrinkage with the block height. Trades nothing. When the poller's
//! failure bound trips, an Alert goes out before the error is returned.

use std::time::Duration;
use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::error::{BotError, BotResult};
use crate::mempool::{MempoolPoller, SizeChange};
use crate::notify::{BotEvent, Channel, EventSink};

/// Run up to `max_polls` samples (0 = until cancelled). Returns the number taken.
pub async fn observe<C: ChainClient + ?Sized>(
    client: &C,
    sink: &dyn EventSink,
    mut poller: MempoolPoller,
    interval: Duration,
    max_polls: u64,
) -> BotResult<u64> {
    let height = client.latest_block_height().await?;
    info!("Observing mempool | height={} | interval={}ms", height, interval.as_millis());

    let mut polls: u64 = 0;
    while max_polls == 0 || polls < max_polls {
        polls += 1;
        match poller.sample(client).await {
            Ok(SizeChange::Grown(snapshot)) => {
                info!(
                    "📈 Mempool grew | total_bytes={} | txs={}",
                    snapshot.total_bytes,
                    snapshot.entries.len()
                );
            }
            Ok(SizeChange::Shrunk { previous, current }) => {
                let height = client.latest_block_height().await.ok();
                info!(
                    "📉 Mempool shrank | {} -> {} bytes | height={}",
                    previous,
                    current,
                    height.map(|h| h.to_string()).unwrap_or_else(|| "?".into())
                );
                // New round, same as the loop's reset between steps
                poller.reset();
            }
            Ok(SizeChange::Unchanged) => {}
            Err(e @ BotError::PollFailuresExhausted { .. }) => {
                let event = BotEvent::StepFailed {
                    iteration: polls,
                    error: e.to_string(),
                };
                sink.emit(&event, Channel::Alert).await;
                return Err(e);
            }
            Err(e) => warn!("{}", e),
        }
        tokio::time::sleep(interval).await;
    }

    info!("Observation finished after {} samples", polls);
    Ok(polls)
}
