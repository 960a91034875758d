//! Runner
//!
//! Drives the arbitrage loop on a single task: `step()` then `reset()`,
//! until the shutdown future resolves. A failed step is reported on the
//! Alert channel and followed by a chain re-sync; if the re-sync also fails
//! the run ends with that error.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;
use tracing::{debug, error, info};

use crate::arbitrage::{ArbitrageLoop, StepOutcome};
use crate::error::BotResult;
use crate::notify::{BotEvent, Channel};

/// True when a heartbeat is owed. `interval_minutes == 0` disables it.
fn heartbeat_due(last: DateTime<Utc>, now: DateTime<Utc>, interval_minutes: u64) -> bool {
    if interval_minutes == 0 {
        return false;
    }
    let interval = ChronoDuration::minutes(interval_minutes.min(i64::MAX as u64) as i64);
    now - last >= interval
}

pub async fn run<F>(arb: &mut ArbitrageLoop, shutdown: F) -> BotResult<()>
where
    F: Future<Output = ()>,
{
    arb.initialize().await?;

    let sink = arb.sink().clone();
    let heartbeat_minutes = arb.config().arbitrage.sign_of_life_minutes;
    let started = Utc::now();
    let mut last_heartbeat = started;
    let mut trades: u64 = 0;

    info!(
        "Runner started | active_paths={} | sign_of_life={}m",
        arb.active_paths().len(),
        heartbeat_minutes
    );

    tokio::pin!(shutdown);

    loop {
        let stepped = tokio::select! {
            biased;
            _ = &mut shutdown => None,
            result = arb.step() => Some(result),
        };
        let Some(result) = stepped else {
            info!("Shutdown requested | iterations={} | trades={}", arb.iteration(), trades);
            break;
        };

        match result {
            Ok(StepOutcome::Traded(broadcast)) => {
                trades += 1;
                info!(
                    "Step {} traded | hash={} | code={}",
                    arb.iteration(),
                    broadcast.hash,
                    broadcast.code
                );
            }
            Ok(outcome) => debug!("Step {} ended: {:?}", arb.iteration(), outcome),
            Err(e) => {
                error!("Step {} failed: {}", arb.iteration(), e);
                sink.emit(
                    &BotEvent::StepFailed {
                        iteration: arb.iteration(),
                        error: e.to_string(),
                    },
                    Channel::Alert,
                )
                .await;
                if let Err(resync_err) = arb.resync().await {
                    error!("Re-sync after failed step also failed: {}", resync_err);
                    return Err(resync_err);
                }
            }
        }

        arb.reset();

        let now = Utc::now();
        if heartbeat_due(last_heartbeat, now, heartbeat_minutes) {
            last_heartbeat = now;
            sink.emit(
                &BotEvent::SignOfLife {
                    iteration: arb.iteration(),
                    active_paths: arb.active_paths().len(),
                    cooling_paths: arb.cooldown().len(),
                    sequence: arb.chain_state().context().sequence,
                    uptime_minutes: (now - started).num_minutes(),
                },
                Channel::Alert,
            )
            .await;
        }
    }

    Ok(())
}
