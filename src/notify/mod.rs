//! Notify Module
//!
//! Purpose:
//!     Observability sink for the loop. Console events go to tracing only,
//!     Alert events additionally go to Discord when a webhook is configured.
//!
//! Architecture:
//!     mod.rs      - Channel, BotEvent, EventSink, Notifier
//!     discord.rs  - webhook embeds

pub mod discord;

pub use discord::DiscordAlerter;

use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

use crate::types::{BroadcastResult, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Local log only
    Console,
    /// Operator attention: log plus external alert
    Alert,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// Messages about to be signed, as JSON
    TradeMessages {
        path: Path,
        message_count: usize,
        messages_json: String,
    },
    /// Raw node response to a broadcast, with the sequence it was signed at
    BroadcastResult {
        path: Path,
        result: BroadcastResult,
        sequence: u64,
    },
    StepFailed {
        iteration: u64,
        error: String,
    },
    SignOfLife {
        iteration: u64,
        active_paths: usize,
        cooling_paths: usize,
        sequence: u64,
        uptime_minutes: i64,
    },
}

impl fmt::Display for BotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotEvent::TradeMessages { path, message_count, messages_json } => write!(
                f,
                "Trade messages | path={} | count={} | {}",
                path, message_count, messages_json
            ),
            BotEvent::BroadcastResult { path, result, sequence } => write!(
                f,
                "Broadcast result | path={} | code={} | hash={} | sequence={} | log={}",
                path, result.code, result.hash, sequence, result.log
            ),
            BotEvent::StepFailed { iteration, error } => {
                write!(f, "Step failed | iteration={} | {}", iteration, error)
            }
            BotEvent::SignOfLife { iteration, active_paths, cooling_paths, sequence, uptime_minutes } => {
                write!(
                    f,
                    "Sign of life | iteration={} | active={} | cooling={} | sequence={} | uptime={}m",
                    iteration, active_paths, cooling_paths, sequence, uptime_minutes
                )
            }
        }
    }
}

/// Fire-and-forget event delivery. Implementations never fail the caller.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: &BotEvent, channel: Channel);
}

pub struct Notifier {
    discord: DiscordAlerter,
}

impl Notifier {
    pub fn new(discord_webhook: Option<String>) -> Self {
        Self {
            discord: DiscordAlerter::new(discord_webhook),
        }
    }
}

#[async_trait]
impl EventSink for Notifier {
    async fn emit(&self, event: &BotEvent, channel: Channel) {
        match channel {
            Channel::Console => info!("{}", event),
            Channel::Alert => {
                warn!("{}", event);
                self.discord.send(event).await;
            }
        }
    }
}
