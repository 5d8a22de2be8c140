use alloy_primitives::Address;
use serde::Serialize;

/// The authenticated, network-validated binding between this client and
/// a signing account.
///
/// Owned exclusively by the [`SessionManager`]; everyone else gets
/// clones and treats them as read-only.
///
/// [`SessionManager`]: crate::manager::SessionManager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub chain_id: u64,
    pub account: Address,
    pub established_at_ms: u64,
}
