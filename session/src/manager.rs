use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, instrument, warn};

use common::time::now_ms;
use gateway::{GatewayError, LedgerGateway};

use crate::model::Session;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet capability available")]
    NoWalletCapability,

    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Owns the single active [`Session`].
///
/// The ledger capability is injected and may be absent (no wallet
/// installed); `connect` refuses to establish anything on the wrong
/// network and destroys a previously held session when the network no
/// longer matches.
pub struct SessionManager<G> {
    capability: Option<Arc<G>>,
    target_chain_id: u64,
    current: Mutex<Option<Session>>,
}

impl<G: LedgerGateway> SessionManager<G> {
    pub fn new(capability: Option<Arc<G>>, target_chain_id: u64) -> Self {
        Self {
            capability,
            target_chain_id,
            current: Mutex::new(None),
        }
    }

    /// Validate the network and establish a session.
    ///
    /// Idempotent on failure: repeated calls on the wrong network keep
    /// failing with `WrongNetwork` and leave no session behind.
    #[instrument(skip(self), fields(target_chain = self.target_chain_id))]
    pub async fn connect(&self) -> Result<Session, SessionError> {
        let capability = self
            .capability
            .as_ref()
            .ok_or(SessionError::NoWalletCapability)?;

        let actual = capability.chain_id().await?;
        if actual != self.target_chain_id {
            // A held session is no longer valid on a mismatched network.
            if self.current.lock().unwrap().take().is_some() {
                warn!(actual, "network changed underneath an active session; destroyed");
            }
            return Err(SessionError::WrongNetwork {
                expected: self.target_chain_id,
                actual,
            });
        }

        let account = capability.signer_account().await?;
        let session = Session {
            chain_id: actual,
            account,
            established_at_ms: now_ms(),
        };

        info!(%account, chain_id = actual, "session established");
        *self.current.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    pub fn is_connected(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    /// Drop the active session. Called by embedders on wallet-initiated
    /// account or network changes.
    pub fn invalidate(&self) {
        if self.current.lock().unwrap().take().is_some() {
            info!("session invalidated");
        }
    }
}
