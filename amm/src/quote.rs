//! Quote synchronizer.
//!
//! Every input change claims a monotonically increasing ticket from an
//! atomic counter; a completion is applied only while its ticket is
//! still the highest issued. A slow response for a superseded intent is
//! silently dropped, so the published [`QuoteResult`] always matches the
//! last intent for which a read completed. A debounce window in front of
//! the remote read collapses keystroke bursts into one call; requests
//! superseded inside the window never reach the ledger at all.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use common::counters::Counters;
use common::time::now_ms;
use gateway::LedgerGateway;
use tokens::amount::to_base_units;

use crate::client::AmmClient;
use crate::types::{QuoteResult, SwapIntent};

pub struct QuoteSynchronizer<G> {
    client: Option<Arc<AmmClient<G>>>,
    decimals: u8,
    debounce: Duration,
    seq: AtomicU64,
    last_intent: Mutex<Option<SwapIntent>>,
    tx: watch::Sender<QuoteResult>,
    counters: Counters,
}

impl<G: LedgerGateway> QuoteSynchronizer<G> {
    /// `client` may be absent when no ledger capability is available;
    /// every request then publishes an empty result.
    pub fn new(
        client: Option<Arc<AmmClient<G>>>,
        decimals: u8,
        debounce: Duration,
        counters: Counters,
    ) -> Self {
        let (tx, _) = watch::channel(QuoteResult::default());
        Self {
            client,
            decimals,
            debounce,
            seq: AtomicU64::new(0),
            last_intent: Mutex::new(None),
            tx,
            counters,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteResult> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> QuoteResult {
        self.tx.borrow().clone()
    }

    /// React to an input change. Claims a ticket immediately (so any
    /// in-flight older request is superseded from this point on), then
    /// debounces before issuing the read.
    pub async fn request_quote(&self, intent: SwapIntent) {
        *self.last_intent.lock().unwrap() = Some(intent.clone());
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.run(ticket, intent, self.debounce).await;
    }

    /// Re-run the most recent intent without debounce. Called after a
    /// connect and after a confirmed swap, when reserves have moved.
    pub async fn resync(&self) {
        let Some(intent) = self.last_intent.lock().unwrap().clone() else {
            return;
        };
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.run(ticket, intent, Duration::ZERO).await;
    }

    async fn run(&self, ticket: u64, intent: SwapIntent, debounce: Duration) {
        // Zero and unparseable input short-circuit: empty result, no
        // remote read, no error surfaced.
        let amount_in = match to_base_units(&intent.amount, self.decimals) {
            Ok(v) if !v.is_zero() => v,
            _ => {
                if self.publish(ticket, QuoteResult::empty(now_ms())) {
                    self.counters
                        .quotes_skipped_empty
                        .fetch_add(1, Ordering::Relaxed);
                }
                return;
            }
        };

        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
            if ticket != self.seq.load(Ordering::SeqCst) {
                // Superseded while waiting; the read is never issued.
                self.counters.quotes_debounced.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let Some(client) = self.client.as_ref() else {
            self.publish(ticket, QuoteResult::empty(now_ms()));
            return;
        };

        self.counters.quotes_issued.fetch_add(1, Ordering::Relaxed);

        match client.get_amount_out(intent.side, amount_in).await {
            Ok(amount_out) => {
                let applied = self.publish(
                    ticket,
                    QuoteResult {
                        amount_out: Some(amount_out),
                        ts_ms: now_ms(),
                    },
                );
                if applied {
                    self.counters.quotes_applied.fetch_add(1, Ordering::Relaxed);
                    debug!(ticket, side = %intent.side, %amount_out, "quote applied");
                }
            }
            Err(e) => {
                // Read-path degrade: empty result, warning, no error to
                // the caller.
                warn!(ticket, side = %intent.side, error = %e, "quote read failed");
                self.publish(ticket, QuoteResult::empty(now_ms()));
            }
        }
    }

    /// Apply a completion only if its ticket is still the highest
    /// issued. Late completions for superseded requests are dropped.
    fn publish(&self, ticket: u64, result: QuoteResult) -> bool {
        if ticket != self.seq.load(Ordering::SeqCst) {
            self.counters
                .quotes_dropped_stale
                .fetch_add(1, Ordering::Relaxed);
            debug!(ticket, "stale quote completion dropped");
            return false;
        }
        self.tx.send_replace(result);
        true
    }
}
