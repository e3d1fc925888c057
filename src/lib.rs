// dripmint - Idempotent token distribution
// Sends each wallet in a list one token transaction, never crediting anyone twice

pub mod config;
pub mod distribution;
pub mod identity;
pub mod recipients;
pub mod rpc;
pub mod storage;
pub mod telemetry;
pub mod tx;
