use alloy_primitives::B256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("read call failed: {0}")]
    Call(String),

    #[error("submission failed: {0}")]
    Submit(String),

    #[error("transaction reverted: {tx_hash}")]
    TransactionReverted { tx_hash: B256 },

    #[error("no receipt for {tx_hash} after {waited_ms}ms")]
    TransactionTimedOut { tx_hash: B256, waited_ms: u64 },

    #[error("abi decode failed: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    #[error("rpc transport error: {0}")]
    Rpc(#[from] reqwest::Error),
}
