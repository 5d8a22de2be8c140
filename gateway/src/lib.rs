//! Ledger-access capability boundary.
//!
//! Everything above this crate talks to the chain through the
//! [`LedgerGateway`] trait; call data crossing the boundary is
//! ABI-encoded with the surfaces in [`abi`]. A JSON-RPC reference
//! implementation for unlocked dev nodes lives in [`rpc`].

pub mod abi;
pub mod error;
pub mod ledger;
pub mod rpc;
pub mod types;

pub use error::GatewayError;
pub use ledger::LedgerGateway;
pub use rpc::HttpRpcGateway;
pub use types::{Confirmation, PendingTx};
