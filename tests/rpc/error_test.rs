// RPC Error Tests
// Tests for classifying node rejections of a submitted transaction

use dripmint::rpc::{classify_node_error, RpcError, SubmitError};

#[test]
fn test_nonce_messages_are_conflicts() {
    for message in [
        "nonce too low",
        "Nonce too high",
        "invalid nonce; got 3, expected 5",
        "replacement transaction underpriced",
    ] {
        assert!(
            matches!(
                classify_node_error(-32000, message),
                SubmitError::SequenceConflict(_)
            ),
            "{}",
            message
        );
    }
}

#[test]
fn test_funds_messages() {
    for message in [
        "insufficient funds for gas * price + value",
        "execution reverted: ERC20: transfer amount exceeds balance",
    ] {
        assert!(matches!(
            classify_node_error(-32000, message),
            SubmitError::InsufficientFunds(_)
        ));
    }
}

#[test]
fn test_already_known_is_not_retried() {
    assert_eq!(
        classify_node_error(-32000, "already known"),
        SubmitError::Rpc(RpcError::Node {
            code: -32000,
            message: "already known".to_string()
        })
    );
}

#[test]
fn test_estimate_insufficient_funds() {
    let err = RpcError::Node {
        code: 3,
        message: "execution reverted: insufficient funds".to_string(),
    };
    assert!(err.is_insufficient_funds());
    assert!(!RpcError::Transport("reset".to_string()).is_insufficient_funds());
}
