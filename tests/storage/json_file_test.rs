// JSON File Ledger Tests
// Tests for the delivery ledger kept as a JSON array on disk

use dripmint::identity::Address;
use dripmint::storage::{DeliveryLedger, JsonFileLedger, LedgerError};
use std::fs;
use tempfile::TempDir;

fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

// ============================================================================
// LOAD
// ============================================================================

#[test]
fn test_load_creates_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received_addresses.json");
    let mut ledger = JsonFileLedger::new(&path);

    assert!(ledger.load().unwrap().is_empty());
    let contents: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(contents.is_empty());
}

#[test]
fn test_load_existing_does_not_create_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received_addresses.json");
    let mut ledger = JsonFileLedger::new(&path);

    assert!(ledger.load_existing().unwrap().is_empty());
    assert!(!path.exists());

    ledger.record(&addr(3)).unwrap();
    assert!(path.exists());
    assert!(ledger.has(&addr(3)));
}

#[test]
fn test_load_reads_existing_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    fs::write(
        &path,
        r#"["0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"]"#,
    )
    .unwrap();

    let mut ledger = JsonFileLedger::new(&path);
    let set = ledger.load().unwrap();

    assert_eq!(set.len(), 2);
    assert!(ledger.has(&"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap()));
}

#[test]
fn test_load_deduplicates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    let a = addr(1).to_string();
    fs::write(&path, format!("[\"{}\", \"{}\"]", a, a.to_lowercase())).unwrap();

    let mut ledger = JsonFileLedger::new(&path);
    assert_eq!(ledger.load().unwrap().len(), 1);
    assert_eq!(ledger.delivered(), vec![addr(1)]);
}

#[test]
fn test_load_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    fs::write(&path, "{not json").unwrap();

    let mut ledger = JsonFileLedger::new(&path);
    assert!(matches!(ledger.load(), Err(LedgerError::Malformed(_))));
}

#[test]
fn test_load_rejects_bad_address() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    fs::write(&path, format!("[\"{}\", \"0x1234\"]", addr(1))).unwrap();

    let mut ledger = JsonFileLedger::new(&path);
    assert!(matches!(
        ledger.load(),
        Err(LedgerError::InvalidAddress { index: 1, .. })
    ));
}

// ============================================================================
// RECORD
// ============================================================================

#[test]
fn test_record_persists_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");

    {
        let mut ledger = JsonFileLedger::new(&path);
        ledger.load().unwrap();
        ledger.record(&addr(3)).unwrap();
        ledger.record(&addr(1)).unwrap();
    }

    let mut reopened = JsonFileLedger::new(&path);
    reopened.load().unwrap();
    assert_eq!(reopened.delivered(), vec![addr(3), addr(1)]);
    assert!(reopened.has(&addr(3)));
    assert!(!reopened.has(&addr(2)));
}

#[test]
fn test_record_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    let mut ledger = JsonFileLedger::new(&path);
    ledger.load().unwrap();

    ledger.record(&addr(1)).unwrap();
    ledger.record(&addr(1)).unwrap();

    let contents: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(contents, vec![addr(1).to_string()]);
}

#[test]
fn test_record_without_load_keeps_existing_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    fs::write(&path, format!("[\"{}\"]", addr(1))).unwrap();

    let mut ledger = JsonFileLedger::new(&path);
    ledger.record(&addr(2)).unwrap();

    assert_eq!(ledger.delivered(), vec![addr(1), addr(2)]);
}

#[test]
fn test_failed_record_leaves_file_and_memory_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    let mut ledger = JsonFileLedger::new(&path);
    ledger.load().unwrap();
    ledger.record(&addr(1)).unwrap();

    // A directory where the temporary file should go makes the write fail
    fs::create_dir(dir.path().join("received.json.tmp")).unwrap();

    assert!(matches!(ledger.record(&addr(2)), Err(LedgerError::Io(_))));
    assert!(!ledger.has(&addr(2)));

    let contents: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(contents, vec![addr(1).to_string()]);
}

#[test]
fn test_file_is_pretty_checksummed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("received.json");
    let mut ledger = JsonFileLedger::new(&path);
    ledger.load().unwrap();

    let recipient: Address = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359".parse().unwrap();
    ledger.record(&recipient).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"));
    assert!(raw.contains('\n'));
}
