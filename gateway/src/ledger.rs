use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{Confirmation, PendingTx};

/// Abstraction over ledger access.
///
/// This trait intentionally hides:
/// - signing and key management
/// - transport details (JSON-RPC, injected wallet provider, ...)
/// - node-specific error formats
///
/// Everything crossing it is ABI-encoded call data; implementations
/// normalize their failures into [`GatewayError`].
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Identity of the network the capability is attached to.
    async fn chain_id(&self) -> Result<u64, GatewayError>;

    /// Account that will sign state-changing submissions.
    async fn signer_account(&self) -> Result<Address, GatewayError>;

    /// Read-only contract call.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, GatewayError>;

    /// State-changing contract call, signed by the signer account.
    ///
    /// Returns as soon as the transaction is accepted into the mempool;
    /// completion is observed via [`await_confirmation`].
    ///
    /// [`await_confirmation`]: LedgerGateway::await_confirmation
    async fn submit(&self, to: Address, data: Bytes) -> Result<PendingTx, GatewayError>;

    /// Wait until the transaction lands in a block.
    ///
    /// Fails with [`GatewayError::TransactionReverted`] when it executed
    /// and reverted, or [`GatewayError::TransactionTimedOut`] when no
    /// receipt appeared inside the implementation's deadline.
    async fn await_confirmation(&self, tx: &PendingTx) -> Result<Confirmation, GatewayError>;
}
