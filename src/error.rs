//! Error types
//!
//! One taxonomy for the whole loop. Each variant maps to a recovery policy:
//! transient poll errors are retried inside the inner poll loop, everything
//! else propagates out of `step()` to the runner.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Mempool fetch failed. Retried by re-entering the poll loop.
    #[error("Mempool fetch failed: {0}")]
    TransientPoll(String),

    #[error("Mempool polling failed {attempts} times in a row: {last}")]
    PollFailuresExhausted { attempts: u32, last: String },

    /// Sequence / account number / chain id query failed.
    #[error("Chain query failed: {0}")]
    ChainQuery(String),

    /// Signing or broadcast failed. Never retried, sequence is not rolled back.
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// Opportunity detection, message building or pool state update failed.
    #[error("Strategy failed: {0}")]
    Strategy(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BotError {
    /// True for errors the inner poll loop absorbs and retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, BotError::TransientPoll(_))
    }

    /// True when the failure happened at or after signing, i.e. the local
    /// sequence may no longer match the chain.
    pub fn is_broadcast(&self) -> bool {
        matches!(self, BotError::Broadcast(_))
    }
}

/// Result type alias
pub type BotResult<T> = Result<T, BotError>;
