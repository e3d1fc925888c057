use crate::tx::TxHash;
use std::time::Duration;
use thiserror::Error;

/// Errors from ledger client calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transaction {hash} reverted")]
    Reverted { hash: TxHash },

    #[error("Transaction {hash} not mined within {waited:?}")]
    ReceiptTimeout { hash: TxHash, waited: Duration },
}

impl RpcError {
    /// Whether the node reported that the sender cannot cover the call
    pub fn is_insufficient_funds(&self) -> bool {
        match self {
            RpcError::Node { message, .. } => is_insufficient_funds_message(message),
            _ => false,
        }
    }
}

/// Errors from submitting a signed transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The node expected a different sequence number for the sender
    #[error("Sequence conflict: {0}")]
    SequenceConflict(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

const SEQUENCE_CONFLICT_MARKERS: &[&str] = &[
    "nonce too low",
    "nonce too high",
    "invalid nonce",
    "replacement transaction underpriced",
];

const INSUFFICIENT_FUNDS_MARKERS: &[&str] = &[
    "insufficient funds",
    "exceeds balance",
    "exceeds allowance",
];

fn is_insufficient_funds_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    INSUFFICIENT_FUNDS_MARKERS.iter().any(|m| lower.contains(m))
}

/// Classify a JSON-RPC error returned for `eth_sendRawTransaction`
pub fn classify_node_error(code: i64, message: &str) -> SubmitError {
    let lower = message.to_ascii_lowercase();
    if SEQUENCE_CONFLICT_MARKERS.iter().any(|m| lower.contains(m)) {
        SubmitError::SequenceConflict(message.to_string())
    } else if is_insufficient_funds_message(message) {
        SubmitError::InsufficientFunds(message.to_string())
    } else {
        SubmitError::Rpc(RpcError::Node {
            code,
            message: message.to_string(),
        })
    }
}
