// Builder Tests
// Tests for building the per-recipient token transaction

use alloy_primitives::U256;
use dripmint::identity::Address;
use dripmint::tx::{decode_token_call, TokenCall, TransactionBuilder};

fn token() -> Address {
    Address::new([0xcc; 20])
}

#[test]
fn test_build_targets_token_contract() {
    let recipient = Address::new([0x11; 20]);
    let builder = TransactionBuilder::new(token(), 1337);
    let tx = builder.build(&recipient, U256::from(42u64), 7, 60_000, 2_000_000_000);

    assert_eq!(tx.to(), &token());
    assert_eq!(tx.value(), 0);
    assert_eq!(tx.nonce(), 7);
    assert_eq!(tx.gas_limit(), 60_000);
    assert_eq!(tx.gas_price(), 2_000_000_000);
    assert_eq!(tx.chain_id(), 1337);
    assert_eq!(
        decode_token_call(tx.data()),
        Some((TokenCall::Mint, recipient, U256::from(42u64)))
    );
}

#[test]
fn test_build_is_deterministic() {
    let recipient = Address::new([0x22; 20]);
    let builder = TransactionBuilder::new(token(), 1);

    let a = builder.build(&recipient, U256::from(5u64), 0, 21_000, 1);
    let b = builder.build(&recipient, U256::from(5u64), 0, 21_000, 1);
    assert_eq!(a, b);
    assert_eq!(a.signing_hash(), b.signing_hash());
}

#[test]
fn test_estimation_payload_matches_transaction() {
    let recipient = Address::new([0x33; 20]);
    let builder = TransactionBuilder::new(token(), 1).with_call(TokenCall::Transfer);

    let amount = U256::from(9u64);
    let tx = builder.build(&recipient, amount, 3, 50_000, 1);
    assert_eq!(tx.data(), builder.call_data(&recipient, amount).as_slice());
    assert_eq!(builder.call(), TokenCall::Transfer);
}
