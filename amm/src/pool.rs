use tokio::sync::watch;
use tracing::{debug, warn};

use common::time::now_ms;
use gateway::LedgerGateway;

use crate::client::AmmClient;
use crate::types::PoolState;

/// In-memory store of the latest pool snapshot.
///
/// `None` until the first successful refresh. A failed refresh keeps the
/// previous snapshot (cache semantics) and logs a warning; readers see
/// staleness through `fetched_at_ms`.
pub struct PoolStore {
    pair: String,
    tx: watch::Sender<Option<PoolState>>,
}

impl PoolStore {
    pub fn new(pair: String) -> Self {
        let (tx, _) = watch::channel(None);
        Self { pair, tx }
    }

    /// Fetch reserves and publish a fresh snapshot.
    ///
    /// Returns whether the snapshot was updated. Read-path failures
    /// degrade to the stale view rather than propagating.
    pub async fn refresh<G: LedgerGateway>(&self, client: &AmmClient<G>) -> bool {
        match client.get_reserves().await {
            Ok((reserve_in, reserve_out)) => {
                let snapshot = PoolState {
                    reserve_in,
                    reserve_out,
                    pair: self.pair.clone(),
                    fetched_at_ms: now_ms(),
                };
                debug!(pair = %self.pair, %reserve_in, %reserve_out, "pool snapshot published");
                self.tx.send_replace(Some(snapshot));
                true
            }
            Err(e) => {
                warn!(pair = %self.pair, error = %e, "pool refresh failed; keeping previous snapshot");
                false
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PoolState>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<PoolState> {
        self.tx.borrow().clone()
    }
}
