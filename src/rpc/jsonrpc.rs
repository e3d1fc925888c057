// JSON-RPC 2.0 envelopes and Ethereum quantity helpers

use crate::rpc::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const JSON_RPC_VERSION: &str = "2.0";

#[derive(Serialize, Debug)]
pub(crate) struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

impl<'a> Request<'a> {
    pub(crate) fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION,
            id,
            method,
            params,
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct Response {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorObject>,
}

impl Response {
    /// Split into the result value or the node's error. A missing result is `null`.
    pub(crate) fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(err) => Err(RpcError::Node {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// `0x` prefixed minimal hex quantity
pub(crate) fn to_quantity(value: u64) -> String {
    format!("{:#x}", value)
}

/// `0x` prefixed hex data
pub(crate) fn to_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a hex quantity such as `"0x1a"`
pub(crate) fn parse_quantity(value: &Value) -> Result<u64, RpcError> {
    let s = value
        .as_str()
        .ok_or_else(|| RpcError::MalformedResponse(format!("expected hex quantity, got {}", value)))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::MalformedResponse(format!("quantity without 0x prefix: {}", s)))?;
    if digits.is_empty() {
        return Err(RpcError::MalformedResponse("empty quantity".to_string()));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::MalformedResponse(format!("bad quantity {}: {}", s, e)))
}

/// Parse `0x` prefixed hex data
pub(crate) fn parse_data(value: &Value) -> Result<Vec<u8>, RpcError> {
    let s = value
        .as_str()
        .ok_or_else(|| RpcError::MalformedResponse(format!("expected hex data, got {}", value)))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| RpcError::MalformedResponse(format!("bad hex data: {}", e)))
}
