//! JSON-RPC connection to a ledger node with timeout and failover handling.
//!
//! # Responsibilities
//! - Submit signed blocks to the primary endpoint
//! - Query execution outcomes, failing over across endpoints
//! - Map transport failures and node errors onto `LedgerError`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

use crate::config::NodeConfig;
use crate::ledger::connection::LedgerConnection;
use crate::ledger::outcome::ExecutionOutcome;
use crate::ledger::types::{BlockDigest, LedgerError, LedgerResult, SignedBlock};

/// Method accepting a `SignedBlock`, answering `{ "digest": .. }`.
pub const SUBMIT_METHOD: &str = "ledger_submitBlock";
/// Method taking a digest, answering an `ExecutionOutcome` or `null`.
pub const OUTCOME_METHOD: &str = "ledger_getBlockOutcome";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Error object returned by the node.
#[derive(Debug, Clone, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    digest: BlockDigest,
}

/// Positional params holding a single value.
fn to_params<T: Serialize>(value: &T) -> LedgerResult<Value> {
    serde_json::to_value(value)
        .map(|value| Value::Array(vec![value]))
        .map_err(|e| LedgerError::Codec(format!("failed to encode params: {}", e)))
}

/// Ledger connection over HTTP JSON-RPC.
#[derive(Clone)]
pub struct RpcConnection {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Url>,
    timeout_duration: Duration,
}

impl RpcConnection {
    /// Create a connection. No network traffic happens here.
    pub fn new(config: &NodeConfig) -> LedgerResult<Self> {
        let primary: Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut endpoints = vec![primary];
        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            timeout_secs = config.request_timeout_secs,
            "Ledger connection configured"
        );

        Ok(Self {
            http,
            endpoints,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Issue one JSON-RPC call. The outer error is transport, the inner one is the node's answer.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        method: &str,
        params: Value,
    ) -> LedgerResult<Result<T, RpcErrorObject>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };

        let fut = async {
            let response = self
                .http
                .post(endpoint.clone())
                .json(&request)
                .send()
                .await
                .map_err(|e| LedgerError::Rpc(format!("{} request failed: {}", method, e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LedgerError::Rpc(format!("{} returned HTTP {}", method, status)));
            }

            response
                .json::<RpcResponse>()
                .await
                .map_err(|e| LedgerError::Codec(format!("{} response: {}", method, e)))
        };

        let response = timeout(self.timeout_duration, fut)
            .await
            .map_err(|_| LedgerError::Timeout(self.timeout_duration.as_secs()))??;

        if let Some(error) = response.error {
            return Ok(Err(error));
        }

        serde_json::from_value(response.result)
            .map(Ok)
            .map_err(|e| LedgerError::Codec(format!("{} result: {}", method, e)))
    }

    /// Endpoints in failover order.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }
}

#[async_trait]
impl LedgerConnection for RpcConnection {
    async fn submit(&self, block: &SignedBlock) -> LedgerResult<BlockDigest> {
        // Primary only: resubmitting elsewhere after a transport error would be a retry.
        let endpoint = &self.endpoints[0];
        let params = to_params(block)?;

        match self.call::<SubmitResponse>(endpoint, SUBMIT_METHOD, params).await? {
            Ok(response) => Ok(response.digest),
            Err(error) => Err(LedgerError::Rejected {
                reason: format!("{} (code {})", error.message, error.code),
            }),
        }
    }

    async fn execution_outcome(
        &self,
        digest: &BlockDigest,
    ) -> LedgerResult<Option<ExecutionOutcome>> {
        let mut last_error = None;

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let params = to_params(digest)?;
            match self.call::<Option<ExecutionOutcome>>(endpoint, OUTCOME_METHOD, params).await {
                Ok(Ok(outcome)) => return Ok(outcome),
                Ok(Err(error)) => {
                    // The node answered; another endpoint would not know better.
                    return Err(LedgerError::Rpc(format!(
                        "{} failed: {} (code {})",
                        OUTCOME_METHOD, error.message, error.code
                    )));
                }
                Err(e) => {
                    tracing::warn!(endpoint_idx = i, error = %e, "RPC error, trying next endpoint");
                    last_error = Some(e);
                }
            }
        }

        Err(LedgerError::Rpc(format!(
            "All RPC endpoints failed: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

impl std::fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConnection")
            .field("endpoints", &self.endpoints.iter().map(Url::as_str).collect::<Vec<_>>())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
