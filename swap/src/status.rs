use std::fmt;

use serde::Serialize;

/// Why a swap attempt ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ApprovalFailed,
    SwapSubmissionFailed,
    TransactionReverted,
    TransactionTimedOut,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::ApprovalFailed => "ApprovalFailed",
            FailureReason::SwapSubmissionFailed => "SwapSubmissionFailed",
            FailureReason::TransactionReverted => "TransactionReverted",
            FailureReason::TransactionTimedOut => "TransactionTimedOut",
        };
        f.write_str(s)
    }
}

/// Swap-in-flight status, owned exclusively by the orchestrator and
/// published through a watch channel.
///
/// `Confirmed` and `Failed` are terminal for the attempt; a new attempt
/// is accepted only from `Idle` or a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwapStatus {
    Idle,
    AwaitingApproval,
    ApprovalSubmitted,
    AwaitingSwap,
    SwapSubmitted,
    Confirmed { block_number: u64 },
    Failed { reason: FailureReason },
}

impl SwapStatus {
    pub fn accepts_new_attempt(&self) -> bool {
        matches!(
            self,
            SwapStatus::Idle | SwapStatus::Confirmed { .. } | SwapStatus::Failed { .. }
        )
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStatus::Idle => f.write_str("Idle"),
            SwapStatus::AwaitingApproval => f.write_str("AwaitingApproval"),
            SwapStatus::ApprovalSubmitted => f.write_str("ApprovalSubmitted"),
            SwapStatus::AwaitingSwap => f.write_str("AwaitingSwap"),
            SwapStatus::SwapSubmitted => f.write_str("SwapSubmitted"),
            SwapStatus::Confirmed { block_number } => write!(f, "Confirmed({block_number})"),
            SwapStatus::Failed { reason } => write!(f, "Failed({reason})"),
        }
    }
}
