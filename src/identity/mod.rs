// Identity module - Who sends and who receives
// Account addresses, the sender's secp256k1 keypair and transaction signing

mod address;
mod keypair;
mod signer;

pub use address::*;
pub use keypair::*;
pub use signer::*;
