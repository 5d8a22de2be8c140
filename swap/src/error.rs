use alloy_primitives::U256;
use thiserror::Error;

use gateway::GatewayError;

use crate::status::FailureReason;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("not connected")]
    NotConnected,

    #[error("a swap is already in progress")]
    AlreadyInProgress,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: U256, required: U256 },

    #[error("approval failed")]
    ApprovalFailed,

    #[error("swap submission failed")]
    SwapSubmissionFailed,

    #[error("swap transaction reverted")]
    TransactionReverted,

    #[error("swap transaction timed out")]
    TransactionTimedOut,

    /// Pre-sequence read failure (balance or allowance); the machine
    /// never left `Idle`.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<FailureReason> for SwapError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::ApprovalFailed => SwapError::ApprovalFailed,
            FailureReason::SwapSubmissionFailed => SwapError::SwapSubmissionFailed,
            FailureReason::TransactionReverted => SwapError::TransactionReverted,
            FailureReason::TransactionTimedOut => SwapError::TransactionTimedOut,
        }
    }
}
