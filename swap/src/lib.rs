//! Swap orchestration: the status state machine and the component that
//! sequences allowance assurance, submission, confirmation, and the
//! post-confirmation state refresh.

pub mod error;
pub mod orchestrator;
pub mod status;

pub use error::SwapError;
pub use orchestrator::SwapOrchestrator;
pub use status::{FailureReason, SwapStatus};
