// Report Tests
// Tests for the run report as printed and as written to JSON

use crate::support::*;
use dripmint::distribution::{Distributor, FixedAmount};
use dripmint::rpc::{MockLedgerClient, RpcError};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_completed_report_json() {
    let dir = TempDir::new().unwrap();
    let list = recipients(2);
    let mock = Arc::new(MockLedgerClient::new().with_decimals(2));

    let mut distributor = Distributor::new(
        config(),
        mock.clone(),
        json_ledger(&dir.path().join("r.json")),
        sender(),
    )
    .unwrap()
    .with_amount_policy(Box::new(FixedAmount(3)));
    let report = distributor.run(&list).await;

    let json: Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"]["status"], "completed");
    assert_eq!(json["entries"][0]["recipient"], list[0].to_string());
    assert_eq!(json["entries"][0]["outcome"], "confirmed");
    assert_eq!(json["entries"][0]["amount"], 3);
    assert_eq!(json["entries"][0]["smallest_amount"], "300");
    assert_eq!(json["entries"][1]["sequence"], 1);
    assert!(json["entries"][0]["tx_hash"].as_str().unwrap().starts_with("0x"));
    assert!(json["started_at"].is_string());
}

#[tokio::test]
async fn test_aborted_report_json_and_summary() {
    let dir = TempDir::new().unwrap();
    let list = recipients(3);
    let mock = Arc::new(
        MockLedgerClient::new()
            .with_estimate_failure(list[1], RpcError::Transport("connection reset".to_string())),
    );

    let mut distributor = Distributor::new(
        config(),
        mock.clone(),
        json_ledger(&dir.path().join("r.json")),
        sender(),
    )
    .unwrap();
    let report = distributor.run(&list).await;

    let json: Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"]["status"], "aborted");
    assert_eq!(json["status"]["reason"], "fatal");
    assert_eq!(json["status"]["kind"], "rpc");
    assert_eq!(json["status"]["recipient"], list[1].to_string());
    assert_eq!(json["entries"][1]["outcome"], "failed");
    assert_eq!(json["remaining"][0], list[2].to_string());

    let summary = report.to_string();
    assert!(summary.contains("confirmed=1"));
    assert!(summary.contains("not attempted=1"));
    assert!(summary.contains(&format!("aborted at {}", list[1])));
}
