//! Tendermint / Cosmos SDK HTTP client
//!
//! Purpose:
//!     Concrete `ChainClient` over the node's JSON-RPC endpoint
//!     (`unconfirmed_txs`, `status`, `broadcast_tx_sync`) and the Cosmos REST
//!     API (`/cosmos/auth/v1beta1/accounts/{address}`).
//!
//! Notes:
//!     - Every request carries the configured timeout; a hung node surfaces as
//!       an error instead of stalling the loop
//!     - Failures are mapped per call: account/chain id/height → ChainQuery,
//!       mempool → TransientPoll, broadcast → Broadcast

use super::client::ChainClient;
use crate::config::ChainSection;
use crate::error::{BotError, BotResult};
use crate::mempool::{MempoolSnapshot, RawMempool};
use crate::types::{AccountInfo, BroadcastResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    network: String,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: String,
}

pub struct TendermintClient {
    http: reqwest::Client,
    rpc_url: String,
    rest_url: String,
    request_id: AtomicU64,
}

impl TendermintClient {
    pub fn new(rpc_url: &str, rest_url: &str, timeout: Duration) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            rest_url: rest_url.trim_end_matches('/').to_string(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(chain: &ChainSection) -> BotResult<Self> {
        Self::new(
            &chain.rpc_url,
            &chain.rest_url,
            Duration::from_millis(chain.request_timeout_ms),
        )
    }

    /// JSON-RPC 2.0 call against the node. Errors come back as plain strings
    /// so each caller can pick its error variant.
    async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, String> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!("RPC {} id={}", method, id);

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("{} request failed: {}", method, e))?;

        let status = response.status();
        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| format!("{} response decode failed (HTTP {}): {}", method, status, e))?;

        unwrap_rpc(method, envelope)
    }

    async fn status(&self) -> Result<StatusResult, String> {
        self.rpc_call("status", json!({})).await
    }
}

fn unwrap_rpc<T>(method: &str, envelope: RpcResponse<T>) -> Result<T, String> {
    if let Some(err) = envelope.error {
        return Err(format!(
            "{} error {}: {}{}",
            method,
            err.code,
            err.message,
            err.data.map(|d| format!(" ({})", d)).unwrap_or_default()
        ));
    }
    envelope
        .result
        .ok_or_else(|| format!("{} returned neither result nor error", method))
}

/// Extract account number and sequence from an auth module account. Handles
/// plain BaseAccount and the vesting account wrappers.
fn parse_account(body: &Value) -> Option<AccountInfo> {
    let account = body.get("account")?;
    let base = if account.get("account_number").is_some() {
        account
    } else if let Some(base) = account.get("base_account") {
        base
    } else {
        account.get("base_vesting_account")?.get("base_account")?
    };

    let field = |name: &str| -> Option<u64> {
        match base.get(name) {
            None | Some(Value::Null) => Some(0),
            Some(Value::String(s)) => s.parse().ok(),
            Some(Value::Number(n)) => n.as_u64(),
            Some(_) => None,
        }
    };

    Some(AccountInfo {
        account_number: field("account_number")?,
        sequence: field("sequence")?,
    })
}

#[async_trait]
impl ChainClient for TendermintClient {
    async fn account(&self, address: &str) -> BotResult<AccountInfo> {
        let url = format!("{}/cosmos/auth/v1beta1/accounts/{}", self.rest_url, address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::ChainQuery(format!("account request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::ChainQuery(format!(
                "account query for {} returned HTTP {}",
                address, status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::ChainQuery(format!("account response decode failed: {}", e)))?;

        parse_account(&body).ok_or_else(|| {
            BotError::ChainQuery(format!("unrecognised account payload for {}", address))
        })
    }

    async fn chain_id(&self) -> BotResult<String> {
        self.status()
            .await
            .map(|s| s.node_info.network)
            .map_err(BotError::ChainQuery)
    }

    async fn latest_block_height(&self) -> BotResult<u64> {
        let status = self.status().await.map_err(BotError::ChainQuery)?;
        status
            .sync_info
            .latest_block_height
            .parse()
            .map_err(|e| BotError::ChainQuery(format!("invalid block height: {}", e)))
    }

    async fn mempool(&self) -> BotResult<MempoolSnapshot> {
        let raw: RawMempool = self
            .rpc_call("unconfirmed_txs", json!({}))
            .await
            .map_err(BotError::TransientPoll)?;
        MempoolSnapshot::try_from(raw)
    }

    async fn broadcast_sync(&self, tx_bytes: Vec<u8>) -> BotResult<BroadcastResult> {
        let encoded = STANDARD.encode(&tx_bytes);
        debug!("broadcast_tx_sync | {} bytes", tx_bytes.len());
        self.rpc_call("broadcast_tx_sync", json!({ "tx": encoded }))
            .await
            .map_err(BotError::Broadcast)
    }
}
