//! Mempool Arbitrage - node observer
//!
//! Operates the node connection without trading:
//!     observe  - sample the mempool and log growth/shrinkage with block height,
//!                alerting (Discord when configured) if polling keeps failing
//!     account  - print the wallet's signing context (account number, sequence, chain id)
//!
//! Trading needs a strategy, signer and mempool parser; those are wired up by
//! the embedding binary through `ArbitrageLoop::new` and `runner::run`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mempool_arb::chain::{ChainStateCache, TendermintClient};
use mempool_arb::config::load_config;
use mempool_arb::mempool::MempoolPoller;
use mempool_arb::notify::Notifier;
use mempool_arb::observer::observe;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Observer polls no faster than this when poll_backoff_ms is 0
const MIN_OBSERVE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "mempool-arb", about = "Mempool-driven arbitrage loop: node observer")]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, env = "BOT_CONFIG", default_value = "config/bot.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch mempool size changes until Ctrl-C
    Observe {
        /// Stop after this many samples (0 = run until interrupted)
        #[arg(long, default_value_t = 0)]
        max_polls: u64,
    },
    /// Print the wallet's signing context as JSON
    Account,
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    init_logging(&config.log_level, args.json_logs);

    info!(
        "Configuration loaded from {} | rpc={} | rest={}",
        args.config.display(),
        config.chain.rpc_url,
        config.chain.rest_url
    );

    let client = TendermintClient::from_config(&config.chain)?;

    match args.command {
        Command::Account => {
            let mut cache = ChainStateCache::new(config.wallet.address.clone());
            let context = cache
                .refresh(&client)
                .await
                .context("Failed to query signing context")?;
            println!("{}", serde_json::to_string_pretty(context)?);
        }
        Command::Observe { max_polls } => {
            let interval = config.arbitrage.poll_backoff().max(MIN_OBSERVE_INTERVAL);
            let poller = MempoolPoller::new(config.arbitrage.max_consecutive_poll_failures);
            let notifier = Notifier::new(config.notify.discord_webhook.clone());
            tokio::select! {
                result = observe(&client, &notifier, poller, interval, max_polls) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        }
    }

    Ok(())
}
