//! JSON-RPC transport for EVM nodes.
//!
//! [`HttpRpcClient`] is a plain single-shot HTTP transport. It carries no
//! retry, backoff or rate limiting: the engine above it performs exactly one
//! step per call and its scheduler owns all pacing decisions.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use blocksync_core::FetchError;

/// Trait for sending a JSON-RPC call to an EVM node.
///
/// Production uses [`HttpRpcClient`]; tests script responses.
#[async_trait]
pub trait EvmRpcClient: Send + Sync {
    /// Send `method` with `params` and return the response `result` value.
    async fn call(&self, method: &str, params: Value) -> Result<Value, FetchError>;
}

/// HTTP JSON-RPC client backed by `reqwest`.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("failed to build reqwest client");

        Self {
            url: url.into(),
            http,
        }
    }

    /// Create with the default 30 second request timeout.
    pub fn default_for(url: impl Into<String>) -> Self {
        Self::new(url, Duration::from_secs(30))
    }
}

#[async_trait]
impl EvmRpcClient for HttpRpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        let req = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Transport(format!("HTTP {status}: {body}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            return Err(FetchError::Transport(format!("rpc error: {err}")));
        }

        tracing::trace!(method, url = %self.url, "rpc call ok");
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}
