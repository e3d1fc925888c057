// Tx module - The token transaction
// Call payload encoding, unsigned/signed legacy transactions and their wire format

mod abi;
mod builder;
mod model;
mod rlp;

pub use abi::{decimals_call, decode_decimals, decode_token_call, selector, AbiError, TokenCall};
pub use builder::TransactionBuilder;
pub use model::{SignedTransaction, TxHash, UnsignedTransaction};
pub use rlp::{encode_bytes, RlpList};
