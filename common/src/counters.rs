use std::sync::Arc;
use std::sync::atomic::AtomicU64;

/// Minimal counters for operational visibility.
///
/// Cloning shares the underlying counters; the quote synchronizer and
/// the swap orchestrator each hold a clone.
#[derive(Clone, Default)]
pub struct Counters {
    // Quote discipline
    pub quotes_issued: Arc<AtomicU64>,
    pub quotes_applied: Arc<AtomicU64>,
    pub quotes_dropped_stale: Arc<AtomicU64>,
    pub quotes_debounced: Arc<AtomicU64>,
    pub quotes_skipped_empty: Arc<AtomicU64>,

    // Swap outcomes
    pub approvals_submitted: Arc<AtomicU64>,
    pub swaps_submitted: Arc<AtomicU64>,
    pub swaps_confirmed: Arc<AtomicU64>,
    pub swaps_failed: Arc<AtomicU64>,
}
