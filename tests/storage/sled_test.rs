// Sled Ledger Tests
// Tests for the delivery ledger on the sled embedded database

use dripmint::identity::Address;
use dripmint::storage::{DeliveryLedger, SledLedger};
use tempfile::TempDir;

fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

#[test]
fn test_open_new_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = SledLedger::open(temp_dir.path()).unwrap();

    assert!(ledger.is_empty());
    assert!(ledger.load().unwrap().is_empty());
}

#[test]
fn test_temporary_ledger_works_in_memory() {
    let mut ledger = SledLedger::temporary().unwrap();
    assert!(ledger.load().unwrap().is_empty());

    ledger.record(&addr(4)).unwrap();
    assert!(ledger.has(&addr(4)));
    assert_eq!(ledger.delivered(), vec![addr(4)]);
}

#[test]
fn test_record_and_has() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = SledLedger::open(temp_dir.path()).unwrap();
    ledger.load().unwrap();

    ledger.record(&addr(1)).unwrap();

    assert!(ledger.has(&addr(1)));
    assert!(!ledger.has(&addr(2)));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_record_twice_stores_once() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = SledLedger::open(temp_dir.path()).unwrap();
    ledger.load().unwrap();

    ledger.record(&addr(1)).unwrap();
    ledger.record(&addr(1)).unwrap();

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.delivered(), vec![addr(1)]);
}

#[test]
fn test_reopen_preserves_order() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut ledger = SledLedger::open(temp_dir.path()).unwrap();
        ledger.load().unwrap();
        for byte in [9u8, 2, 5] {
            ledger.record(&addr(byte)).unwrap();
        }
    }

    {
        let mut ledger = SledLedger::open(temp_dir.path()).unwrap();
        let set = ledger.load().unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(ledger.delivered(), vec![addr(9), addr(2), addr(5)]);
    }
}
