// Signer Tests
// Tests for EIP-155 transaction signing

use dripmint::identity::{Address, Keypair, Signer, SigningError};
use dripmint::tx::UnsignedTransaction;

const KEY_46: &str = "4646464646464646464646464646464646464646464646464646464646464646";

fn eip155_example() -> UnsignedTransaction {
    UnsignedTransaction::new(
        9,
        20_000_000_000,
        21_000,
        Address::new([0x35; 20]),
        1_000_000_000_000_000_000,
        Vec::new(),
        1,
    )
}

// ============================================================================
// KNOWN VECTOR
// ============================================================================

#[test]
fn test_signing_payload_vector() {
    let tx = eip155_example();
    assert_eq!(
        hex::encode(tx.signing_payload()),
        "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
    );
    assert_eq!(
        hex::encode(tx.signing_hash()),
        "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
    );
}

#[test]
fn test_signed_raw_vector() {
    let keypair = Keypair::from_hex(KEY_46).unwrap();
    let signed = Signer::sign(&eip155_example(), &keypair).unwrap();

    assert_eq!(signed.v(), 37);
    assert_eq!(
        signed.raw_hex(),
        "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
    );
    assert_eq!(
        signed.hash().to_string(),
        "0x33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788"
    );
}

// ============================================================================
// BEHAVIOUR
// ============================================================================

#[test]
fn test_signing_is_deterministic() {
    let keypair = Keypair::generate();
    let a = Signer::sign(&eip155_example(), &keypair).unwrap();
    let b = Signer::sign(&eip155_example(), &keypair).unwrap();
    assert_eq!(a.raw(), b.raw());
}

#[test]
fn test_recover_returns_sender() {
    let keypair = Keypair::generate();
    let tx = UnsignedTransaction::new(
        0,
        1_000_000_000,
        60_000,
        Address::new([7; 20]),
        0,
        vec![1, 2, 3],
        1337,
    );
    let signed = Signer::sign(&tx, &keypair).unwrap();

    assert!(signed.v() == 1337 * 2 + 35 || signed.v() == 1337 * 2 + 36);
    assert_eq!(Signer::recover(&signed).unwrap(), keypair.address());
}

#[test]
fn test_chain_id_binds_signature() {
    let keypair = Keypair::generate();
    let mainnet = Signer::sign(&eip155_example(), &keypair).unwrap();

    let other = UnsignedTransaction::new(
        9,
        20_000_000_000,
        21_000,
        Address::new([0x35; 20]),
        1_000_000_000_000_000_000,
        Vec::new(),
        5,
    );
    let testnet = Signer::sign(&other, &keypair).unwrap();

    assert_ne!(mainnet.hash(), testnet.hash());
    assert_eq!(Signer::recover(&testnet).unwrap(), keypair.address());
}

#[test]
fn test_zero_chain_id_rejected() {
    let keypair = Keypair::generate();
    let tx = UnsignedTransaction::new(0, 1, 21_000, Address::ZERO, 0, Vec::new(), 0);
    assert!(matches!(
        Signer::sign(&tx, &keypair),
        Err(SigningError::InvalidPayload(_))
    ));
}
