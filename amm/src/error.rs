use alloy_primitives::Address;
use thiserror::Error;

use gateway::GatewayError;

#[derive(Debug, Error)]
pub enum AmmError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("pool pair mismatch: configured ({expected0}, {expected1}), deployed ({actual0}, {actual1})")]
    PairMismatch {
        expected0: Address,
        expected1: Address,
        actual0: Address,
        actual1: Address,
    },
}
