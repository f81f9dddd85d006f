//! Chain-read client for Metis JSON-RPC endpoints.
//!
//! The balance adapter only ever needs one primitive: a read-only
//! `eth_call` against a contract, returning the raw ABI-encoded output.
//! [`ChainReader`] is that seam; [`RpcChainReader`] is the HTTP
//! implementation used in production.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use ethers::types::{Address, Bytes, U256};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::blockchain::{
    models::RpcError,
    rpc::{Request, Response},
};

/// Read-only contract call facility.
pub trait ChainReader: Send + Sync {
    /// Executes `eth_call` against `to` at the latest block and returns the
    /// raw return data.
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes, RpcError>> + Send;
}

/// JSON-RPC over HTTP chain reader with a per-call timeout.
pub struct RpcChainReader {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl RpcChainReader {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for RPC endpoint")?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = Request::new(id, method, params);
        debug!(id, method, "sending JSON-RPC request");
        let resp: Response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        resp.into_result()
    }

    /// Chain id reported by the node (`eth_chainId`).
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_chainId", json!([])).await?;
        let hex_id = result
            .as_str()
            .ok_or_else(|| RpcError::Malformed(format!("eth_chainId result not a string: {}", result)))?;
        let digits = hex_id.trim_start_matches("0x");
        if digits.is_empty() {
            return Err(RpcError::Malformed(format!("empty chain id '{}'", hex_id)));
        }
        let id = U256::from_str_radix(digits, 16)
            .map_err(|e| RpcError::Malformed(format!("bad chain id '{}': {}", hex_id, e)))?;
        if id > U256::from(u64::MAX) {
            return Err(RpcError::Malformed(format!("chain id {} exceeds u64", id)));
        }
        Ok(id.as_u64())
    }
}

impl ChainReader for RpcChainReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let params = json!([
            {"to": format!("{:?}", to), "data": format!("0x{}", hex::encode(&data))},
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        let s = result
            .as_str()
            .ok_or_else(|| RpcError::Malformed(format!("eth_call result not a string: {}", result)))?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))
            .map_err(|e| RpcError::Malformed(format!("eth_call result is not hex: {}", e)))?;
        Ok(Bytes::from(bytes))
    }
}
