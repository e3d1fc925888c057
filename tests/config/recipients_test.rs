// Recipients Tests
// Tests for loading the ordered wallet list

use dripmint::identity::Address;
use dripmint::recipients::{self, RecipientsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_json_array_keeps_order() {
    let a = Address::new([2; 20]);
    let b = Address::new([1; 20]);
    let list = recipients::parse(&format!("[\"{}\", \"{}\"]", a, b)).unwrap();
    assert_eq!(list, vec![a, b]);
}

#[test]
fn test_json_keeps_duplicates() {
    let a = Address::new([2; 20]).to_string();
    let list = recipients::parse(&format!("[\"{}\", \"{}\"]", a, a)).unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn test_json_bad_entry_reports_position() {
    let a = Address::new([2; 20]);
    let err = recipients::parse(&format!("[\"{}\", \"0xbeef\"]", a)).unwrap_err();
    match err {
        RecipientsError::InvalidAddress { position, .. } => assert_eq!(position, "entry 2"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_json_wrong_shape() {
    assert!(matches!(
        recipients::parse("[1, 2]"),
        Err(RecipientsError::Json(_))
    ));
}

#[test]
fn test_text_bad_line_reports_line() {
    let err = recipients::parse("# header\n0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\nnope\n").unwrap_err();
    match err {
        RecipientsError::InvalidAddress { position, .. } => assert_eq!(position, "line 3"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_empty_inputs() {
    assert!(recipients::parse("").unwrap().is_empty());
    assert!(recipients::parse("[]").unwrap().is_empty());
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wallets.json");
    fs::write(&path, "[\"0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359\"]").unwrap();

    let list = recipients::load(&path).unwrap();
    assert_eq!(list[0].to_string(), "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        recipients::load(dir.path().join("missing.json")),
        Err(RecipientsError::Io(_))
    ));
}
