// RPC module - THE NODE (abstract)
// The ledger client capabilities, a JSON-RPC HTTP implementation and a scripted mock

mod error;
mod http;
mod jsonrpc;
mod mock;
mod traits;

pub use error::{classify_node_error, RpcError, SubmitError};
pub use http::{HttpClientConfig, HttpLedgerClient};
pub use mock::{AcceptedTransaction, MockLedgerClient};
pub use traits::{CallRequest, LedgerClient, TxReceipt};
