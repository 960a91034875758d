//! Configuration Loading
//!
//! Loads bot configuration from a TOML file, then applies environment
//! overrides (.env is read first). Endpoint and wallet settings may live in
//! either place; secrets such as the Discord webhook usually stay in .env.
//!
//! Environment overrides:
//!     RPC_URL, REST_URL, WALLET_ADDRESS, DISCORD_WEBHOOK

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::arbitrage::cooldown::DEFAULT_COOLDOWN_ITERATIONS;
use crate::arbitrage::FeeTable;
use crate::error::BotError;
use crate::mempool::poller::DEFAULT_MAX_CONSECUTIVE_FAILURES;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub chain: ChainSection,
    #[serde(default)]
    pub wallet: WalletSection,
    #[serde(default)]
    pub arbitrage: ArbitrageSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub notify: NotifySection,
    /// Fee per message count
    pub tx_fees: FeeTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    /// Tendermint RPC (unconfirmed_txs, status, broadcast_tx_sync)
    #[serde(default)]
    pub rpc_url: String,
    /// Cosmos REST / LCD (account queries)
    #[serde(default)]
    pub rest_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletSection {
    #[serde(default)]
    pub address: String,
    /// Flash-loan router contract handed to the message builder
    #[serde(default)]
    pub flashloan_router_address: String,
    #[serde(default = "default_memo")]
    pub memo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageSection {
    /// Loop iterations a retired path stays out of rotation
    #[serde(default = "default_cooldown_blocks")]
    pub cooldown_blocks: u64,
    /// Wait after broadcast before re-reading chain state
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Sleep between unchanged polls (0 = yield only)
    #[serde(default)]
    pub poll_backoff_ms: u64,
    /// Upper bound on one step's polling phase (0 = unbounded)
    #[serde(default = "default_step_poll_timeout")]
    pub step_poll_timeout_ms: u64,
    #[serde(default = "default_max_poll_failures")]
    pub max_consecutive_poll_failures: u32,
    /// Heartbeat interval (0 = disabled)
    #[serde(default = "default_sign_of_life")]
    pub sign_of_life_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategySection {
    /// Minimum expected profit, in base units of `offer_denom`
    #[serde(default)]
    pub profit_threshold: i64,
    #[serde(default = "default_offer_denom")]
    pub offer_denom: String,
    /// Free-form parameters for the injected strategy
    #[serde(default)]
    pub params: toml::Table,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifySection {
    #[serde(default)]
    pub discord_webhook: Option<String>,
}

fn default_log_level() -> String { "info".to_string() }
fn default_memo() -> String { "memo".to_string() }
fn default_request_timeout() -> u64 { 5000 }
fn default_cooldown_blocks() -> u64 { DEFAULT_COOLDOWN_ITERATIONS }
fn default_settle_delay() -> u64 { 5000 }
fn default_step_poll_timeout() -> u64 { 30_000 }
fn default_max_poll_failures() -> u32 { DEFAULT_MAX_CONSECUTIVE_FAILURES }
fn default_sign_of_life() -> u64 { 30 }
fn default_offer_denom() -> String { "uluna".to_string() }

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            rest_url: String::new(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            address: String::new(),
            flashloan_router_address: String::new(),
            memo: default_memo(),
        }
    }
}

impl Default for ArbitrageSection {
    fn default() -> Self {
        Self {
            cooldown_blocks: default_cooldown_blocks(),
            settle_delay_ms: default_settle_delay(),
            poll_backoff_ms: 0,
            step_poll_timeout_ms: default_step_poll_timeout(),
            max_consecutive_poll_failures: default_max_poll_failures(),
            sign_of_life_minutes: default_sign_of_life(),
        }
    }
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            profit_threshold: 0,
            offer_denom: default_offer_denom(),
            params: toml::Table::new(),
        }
    }
}

impl ArbitrageSection {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_backoff(&self) -> Duration {
        Duration::from_millis(self.poll_backoff_ms)
    }

    pub fn step_poll_timeout(&self) -> Option<Duration> {
        (self.step_poll_timeout_ms > 0).then(|| Duration::from_millis(self.step_poll_timeout_ms))
    }
}

impl BotConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Overlay values from `lookup` (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("RPC_URL") {
            self.chain.rpc_url = v;
        }
        if let Some(v) = non_empty("REST_URL") {
            self.chain.rest_url = v;
        }
        if let Some(v) = non_empty("WALLET_ADDRESS") {
            self.wallet.address = v;
        }
        if let Some(v) = non_empty("DISCORD_WEBHOOK") {
            self.notify.discord_webhook = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), BotError> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(BotError::Config("chain.rpc_url (or RPC_URL) not set".into()));
        }
        if self.chain.rest_url.trim().is_empty() {
            return Err(BotError::Config("chain.rest_url (or REST_URL) not set".into()));
        }
        if self.wallet.address.trim().is_empty() {
            return Err(BotError::Config("wallet.address (or WALLET_ADDRESS) not set".into()));
        }
        if self.arbitrage.cooldown_blocks == 0 {
            return Err(BotError::Config("arbitrage.cooldown_blocks must be > 0".into()));
        }
        if self.arbitrage.max_consecutive_poll_failures == 0 {
            return Err(BotError::Config(
                "arbitrage.max_consecutive_poll_failures must be > 0".into(),
            ));
        }
        if self.tx_fees.is_empty() {
            return Err(BotError::Config("tx_fees must contain at least one entry".into()));
        }
        Ok(())
    }
}

/// Load configuration: .env, TOML file, environment overrides, validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    dotenv::dotenv().ok();

    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = BotConfig::from_toml_str(&content)?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}
