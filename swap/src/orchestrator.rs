//! The swap orchestrator.
//!
//! Sequences one user-triggered attempt end to end: preconditions,
//! allowance assurance, swap submission, confirmation, post-confirm
//! refresh. A flight guard held across the whole sequence serializes
//! attempts; status transitions are published through a watch channel
//! and every remote write failure lands in a terminal `Failed` state.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use alloy_primitives::U256;
use tokio::sync::{Mutex, watch};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use amm::{AmmClient, PoolState, PoolStore, QuoteResult, QuoteSynchronizer, Side, SwapIntent};
use common::config::AppConfig;
use common::counters::Counters;
use common::logger::{TraceId, annotate_span, root_span, warn_if_slow};
use gateway::{Confirmation, GatewayError, LedgerGateway, PendingTx};
use session::{Session, SessionError, SessionManager};
use tokens::TokenClient;
use tokens::amount::to_base_units;

use crate::error::SwapError;
use crate::status::{FailureReason, SwapStatus};

/// Clients that exist only when a ledger capability was injected.
struct Remote<G> {
    gateway: Arc<G>,
    token0: TokenClient<G>,
    token1: TokenClient<G>,
    amm: Arc<AmmClient<G>>,
}

pub struct SwapOrchestrator<G> {
    config: AppConfig,
    sessions: SessionManager<G>,
    remote: Option<Remote<G>>,
    pool: PoolStore,
    quotes: QuoteSynchronizer<G>,
    status_tx: watch::Sender<SwapStatus>,
    flight: Mutex<()>,
    counters: Counters,
}

impl<G: LedgerGateway> SwapOrchestrator<G> {
    /// `capability` is the injected wallet/ledger access; `None` models
    /// the capability being absent (connect fails, quotes stay empty).
    pub fn new(config: AppConfig, capability: Option<Arc<G>>, counters: Counters) -> Self {
        let remote = capability.clone().map(|gateway| Remote {
            token0: TokenClient::new(gateway.clone(), config.token0.address),
            token1: TokenClient::new(gateway.clone(), config.token1.address),
            amm: Arc::new(AmmClient::new(
                gateway.clone(),
                config.amm_address,
                config.token0.address,
                config.token1.address,
            )),
            gateway,
        });

        let pair = format!("{}/{}", config.token0.symbol, config.token1.symbol);
        let quotes = QuoteSynchronizer::new(
            remote.as_ref().map(|r| r.amm.clone()),
            config.decimals,
            Duration::from_millis(config.quote_debounce_ms),
            counters.clone(),
        );

        let (status_tx, _) = watch::channel(SwapStatus::Idle);
        Self {
            sessions: SessionManager::new(capability, config.target_chain_id),
            remote,
            pool: PoolStore::new(pair),
            quotes,
            status_tx,
            flight: Mutex::new(()),
            counters,
            config,
        }
    }

    // ---- session -----------------------------------------------------

    /// Establish a session, then bring the pool view and the current
    /// quote up to date.
    pub async fn connect(&self) -> Result<Session, SessionError> {
        let session = self.sessions.connect().await?;
        self.refresh_view().await;
        Ok(session)
    }

    pub fn is_connected(&self) -> bool {
        self.sessions.is_connected()
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.current()
    }

    pub fn invalidate_session(&self) {
        self.sessions.invalidate();
    }

    // ---- read-side views ---------------------------------------------

    /// Forward an input change to the quote synchronizer.
    pub async fn request_quote(&self, intent: SwapIntent) {
        self.quotes.request_quote(intent).await;
    }

    pub fn quote_updates(&self) -> watch::Receiver<QuoteResult> {
        self.quotes.subscribe()
    }

    pub fn pool_updates(&self) -> watch::Receiver<Option<PoolState>> {
        self.pool.subscribe()
    }

    /// Explicit pool refresh; read failures keep the previous snapshot.
    pub async fn refresh_pool(&self) -> bool {
        match &self.remote {
            Some(remote) => self.pool.refresh(&remote.amm).await,
            None => false,
        }
    }

    pub fn status_updates(&self) -> watch::Receiver<SwapStatus> {
        self.status_tx.subscribe()
    }

    pub fn current_status(&self) -> SwapStatus {
        *self.status_tx.borrow()
    }

    // ---- the swap sequence -------------------------------------------

    /// Run one swap attempt end to end.
    ///
    /// Precondition failures return an error without any transition; the
    /// machine stays where it was. Once the sequence starts, every
    /// failure lands in `Failed{reason}` and is returned verbatim.
    pub async fn execute_swap(&self, intent: SwapIntent) -> Result<Confirmation, SwapError> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(SwapError::AlreadyInProgress);
        };
        if !self.current_status().accepts_new_attempt() {
            return Err(SwapError::AlreadyInProgress);
        }

        let session = self.sessions.current().ok_or(SwapError::NotConnected)?;
        let remote = self.remote.as_ref().ok_or(SwapError::NotConnected)?;

        let required = match to_base_units(&intent.amount, self.config.decimals) {
            Ok(v) if !v.is_zero() => v,
            _ => return Err(SwapError::InvalidAmount),
        };

        let attempt_id = Uuid::new_v4();
        let span = root_span("swap", &TraceId::new(attempt_id.to_string()));

        async {
            annotate_span(&intent.side.to_string(), &intent.amount);
            self.run_sequence(remote, &session, intent.side, required)
                .await
        }
        .instrument(span)
        .await
    }

    async fn run_sequence(
        &self,
        remote: &Remote<G>,
        session: &Session,
        side: Side,
        required: U256,
    ) -> Result<Confirmation, SwapError> {
        let token = match side {
            Side::Token0 => &remote.token0,
            Side::Token1 => &remote.token1,
        };

        // Local balance check before any remote write: a swap that
        // cannot be funded is guaranteed to fail on chain.
        let balance = token.balance_of(session.account).await?;
        if balance < required {
            return Err(SwapError::InsufficientBalance { balance, required });
        }

        let allowance = token
            .allowance(session.account, remote.amm.address())
            .await?;

        if !allowance.covers(required) {
            self.set_status(SwapStatus::AwaitingApproval);

            // Exactly the required amount, not unlimited.
            let pending = match token.approve(remote.amm.address(), required).await {
                Ok(p) => p,
                Err(e) => {
                    error!(error = %e, "approval submission failed");
                    return Err(self.fail(FailureReason::ApprovalFailed));
                }
            };
            self.counters
                .approvals_submitted
                .fetch_add(1, Ordering::Relaxed);
            self.set_status(SwapStatus::ApprovalSubmitted);

            if let Err(e) = self.confirm(remote, &pending, "approval_confirmation").await {
                error!(error = %e, "approval confirmation failed");
                return Err(self.fail(FailureReason::ApprovalFailed));
            }
        }

        self.set_status(SwapStatus::AwaitingSwap);

        // Minimum output pinned to zero: no slippage guard by design.
        let pending = match remote
            .amm
            .swap_exact_input(side, required, U256::ZERO, session.account)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "swap submission failed");
                return Err(self.fail(FailureReason::SwapSubmissionFailed));
            }
        };
        self.counters.swaps_submitted.fetch_add(1, Ordering::Relaxed);
        self.set_status(SwapStatus::SwapSubmitted);

        let confirmation = match self.confirm(remote, &pending, "swap_confirmation").await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "swap confirmation failed");
                let reason = match e {
                    GatewayError::TransactionTimedOut { .. } => FailureReason::TransactionTimedOut,
                    GatewayError::TransactionReverted { .. } => FailureReason::TransactionReverted,
                    _ => FailureReason::SwapSubmissionFailed,
                };
                return Err(self.fail(reason));
            }
        };

        self.counters.swaps_confirmed.fetch_add(1, Ordering::Relaxed);
        self.set_status(SwapStatus::Confirmed {
            block_number: confirmation.block_number,
        });
        info!(block_number = confirmation.block_number, "swap confirmed");

        // Reserves moved; bring the cached view and the quote back in
        // line with the chain.
        self.refresh_view().await;

        Ok(confirmation)
    }

    async fn confirm(
        &self,
        remote: &Remote<G>,
        pending: &PendingTx,
        label: &'static str,
    ) -> Result<Confirmation, GatewayError> {
        let slow_after = Duration::from_millis(self.config.confirm_timeout_ms / 2);
        warn_if_slow(label, slow_after, remote.gateway.await_confirmation(pending)).await
    }

    async fn refresh_view(&self) {
        if let Some(remote) = &self.remote {
            self.pool.refresh(&remote.amm).await;
        }
        self.quotes.resync().await;
    }

    fn set_status(&self, status: SwapStatus) {
        info!(status = %status, "swap status");
        self.status_tx.send_replace(status);
    }

    fn fail(&self, reason: FailureReason) -> SwapError {
        self.counters.swaps_failed.fetch_add(1, Ordering::Relaxed);
        self.set_status(SwapStatus::Failed { reason });
        reason.into()
    }

    /// Advisory deployment check: configured token addresses against the
    /// pool contract. See [`AmmClient::verify_pair`].
    pub async fn verify_pair(&self) -> Result<(), amm::AmmError> {
        match &self.remote {
            Some(remote) => remote.amm.verify_pair().await,
            None => Ok(()),
        }
    }
}
