// HTTP Ledger Client
// JSON-RPC 2.0 over HTTP(S) through a shared reqwest client

use crate::identity::Address;
use crate::rpc::jsonrpc::{parse_data, parse_quantity, to_data, Request, Response};
use crate::rpc::{classify_node_error, CallRequest, LedgerClient, RpcError, SubmitError, TxReceipt};
use crate::tx::{decimals_call, decode_decimals, SignedTransaction, TxHash};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, trace};

const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// HTTP CLIENT CONFIG
// ============================================================================

/// Configuration for the HTTP ledger client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Timeout for a single JSON-RPC request in seconds
    pub request_timeout_secs: u64,
    /// How long to wait for a broadcast transaction to be mined, in seconds
    pub receipt_timeout_secs: u64,
    /// Interval between receipt polls in milliseconds
    pub receipt_poll_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            receipt_timeout_secs: 120,
            receipt_poll_ms: 1000,
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_receipt_timeout_secs(mut self, secs: u64) -> Self {
        self.receipt_timeout_secs = secs;
        self
    }

    pub fn with_receipt_poll_ms(mut self, ms: u64) -> Self {
        self.receipt_poll_ms = ms;
        self
    }
}

// ============================================================================
// HTTP LEDGER CLIENT
// ============================================================================

/// Ledger client talking to an Ethereum JSON-RPC node
pub struct HttpLedgerClient {
    url: Url,
    http: reqwest::Client,
    config: HttpClientConfig,
    next_id: AtomicU64,
}

/// Accept `http://` and `https://` endpoints; a bare `host:port` is taken as `http://`
fn parse_endpoint(url: &str) -> Result<Url, RpcError> {
    let url = url.trim();
    let full = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };
    let parsed =
        Url::parse(&full).map_err(|e| RpcError::InvalidEndpoint(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(RpcError::InvalidEndpoint(format!("{}: missing host", url))),
        scheme => Err(RpcError::InvalidEndpoint(format!(
            "unsupported scheme '{}'",
            scheme
        ))),
    }
}

impl HttpLedgerClient {
    /// Create a client for an `http(s)://host[:port][/path]` endpoint
    pub fn new(url: &str, config: HttpClientConfig) -> Result<Self, RpcError> {
        let url = parse_endpoint(url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint URL in normalized form
    pub fn endpoint(&self) -> String {
        self.url.to_string()
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let limit = Duration::from_secs(self.config.request_timeout_secs);
        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                RpcError::Timeout(limit)
            } else {
                RpcError::Transport(format!("{}: {}", self.url, e))
            }
        };

        let response = self
            .http
            .post(self.url.clone())
            .json(&Request::new(id, method, params))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(RpcError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: Response = serde_json::from_slice(&body)
            .map_err(|e| RpcError::MalformedResponse(e.to_string()))?;
        trace!(method, id, "RPC call answered");
        parsed.into_result()
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, RpcError> {
        let waited = Duration::from_secs(self.config.receipt_timeout_secs);
        let poll = Duration::from_millis(self.config.receipt_poll_ms);
        let deadline = Instant::now() + waited;

        loop {
            let value = self
                .call("eth_getTransactionReceipt", json!([hash.to_string()]))
                .await?;
            if !value.is_null() {
                return parse_receipt(hash, &value);
            }
            if Instant::now() >= deadline {
                return Err(RpcError::ReceiptTimeout { hash, waited });
            }
            sleep(poll).await;
        }
    }
}

fn optional_quantity(value: &Value, field: &str) -> Result<Option<u64>, RpcError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_quantity(v).map(Some),
    }
}

fn parse_receipt(hash: TxHash, value: &Value) -> Result<TxReceipt, RpcError> {
    if optional_quantity(value, "status")? == Some(0) {
        return Err(RpcError::Reverted { hash });
    }
    Ok(TxReceipt {
        hash,
        block_number: optional_quantity(value, "blockNumber")?,
        gas_used: optional_quantity(value, "gasUsed")?,
    })
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn sequence_number(&self, address: &Address) -> Result<u64, RpcError> {
        let value = self
            .call(
                "eth_getTransactionCount",
                json!([address.to_checksum(None), "pending"]),
            )
            .await?;
        parse_quantity(&value)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError> {
        let value = self
            .call(
                "eth_estimateGas",
                json!([{
                    "from": call.from.to_checksum(None),
                    "to": call.to.to_checksum(None),
                    "data": to_data(&call.data),
                }]),
            )
            .await?;
        parse_quantity(&value)
    }

    async fn gas_price(&self) -> Result<u64, RpcError> {
        let value = self.call("eth_gasPrice", json!([])).await?;
        parse_quantity(&value)
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<TxReceipt, SubmitError> {
        let value = self
            .call("eth_sendRawTransaction", json!([tx.raw_hex()]))
            .await
            .map_err(|e| match e {
                RpcError::Node { code, message } => classify_node_error(code, &message),
                other => SubmitError::Rpc(other),
            })?;

        let hash = value
            .as_str()
            .and_then(TxHash::from_hex)
            .ok_or_else(|| RpcError::MalformedResponse(format!("bad transaction hash {}", value)))?;
        debug!(%hash, nonce = tx.tx().nonce(), "Transaction broadcast, waiting for receipt");

        Ok(self.wait_for_receipt(hash).await?)
    }

    async fn asset_decimals(&self, asset: &Address) -> Result<u8, RpcError> {
        let value = self
            .call(
                "eth_call",
                json!([{
                    "to": asset.to_checksum(None),
                    "data": to_data(&decimals_call()),
                }, "latest"]),
            )
            .await?;
        let data = parse_data(&value)?;
        decode_decimals(&data).map_err(|e| RpcError::MalformedResponse(e.to_string()))
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        let value = self.call("eth_chainId", json!([])).await?;
        parse_quantity(&value)
    }
}
