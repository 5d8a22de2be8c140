use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use alloy_primitives::{Address, U256};

use amm::{AmmClient, QuoteSynchronizer, Side, SwapIntent};
use common::counters::Counters;
use testkit::{MockLedger, constant_product_out};

const TOKEN0: Address = Address::repeat_byte(0x11);
const TOKEN1: Address = Address::repeat_byte(0x22);
const POOL: Address = Address::repeat_byte(0xbb);

const RESERVE0: u64 = 1_000_000_000;
const RESERVE1: u64 = 2_000_000_000;

fn world() -> Arc<MockLedger> {
    Arc::new(
        MockLedger::new(11_155_111)
            .with_token(TOKEN0, "TK0", 6)
            .with_token(TOKEN1, "TK1", 6)
            .with_pool(
                POOL,
                TOKEN0,
                TOKEN1,
                U256::from(RESERVE0),
                U256::from(RESERVE1),
            ),
    )
}

fn synchronizer(
    ledger: Arc<MockLedger>,
    debounce: Duration,
    counters: Counters,
) -> Arc<QuoteSynchronizer<MockLedger>> {
    let client = Arc::new(AmmClient::new(ledger, POOL, TOKEN0, TOKEN1));
    Arc::new(QuoteSynchronizer::new(Some(client), 6, debounce, counters))
}

fn intent(amount: &str) -> SwapIntent {
    SwapIntent {
        side: Side::Token0,
        amount: amount.to_string(),
    }
}

#[tokio::test]
async fn completed_read_publishes_the_quote() {
    let ledger = world();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, Counters::default());

    sync.request_quote(intent("1")).await;

    let expected = constant_product_out(
        U256::from(1_000_000u64),
        U256::from(RESERVE0),
        U256::from(RESERVE1),
    );
    assert_eq!(sync.current().amount_out, Some(expected));
    assert_eq!(ledger.quote_reads(), 1);
}

#[tokio::test]
async fn zero_input_never_issues_a_read() {
    let ledger = world();
    let counters = Counters::default();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, counters.clone());

    sync.request_quote(intent("0")).await;
    sync.request_quote(intent("0.0000001")).await; // truncates to zero

    assert_eq!(ledger.quote_reads(), 0);
    assert_eq!(sync.current().amount_out, None);
    assert_eq!(counters.quotes_skipped_empty.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn unparseable_input_degrades_to_empty_without_error() {
    let ledger = world();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, Counters::default());

    sync.request_quote(intent("1")).await;
    assert!(sync.current().amount_out.is_some());

    sync.request_quote(intent("not a number")).await;
    assert_eq!(sync.current().amount_out, None);
    assert_eq!(ledger.quote_reads(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_completion_for_superseded_request_is_dropped() {
    let ledger = world();
    let counters = Counters::default();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, counters.clone());

    // A (amount=1) answers slowly, B (amount=2) quickly: completion
    // order is inverted relative to issue order.
    ledger.set_quote_latency(U256::from(1_000_000u64), Duration::from_millis(100));
    ledger.set_quote_latency(U256::from(2_000_000u64), Duration::from_millis(10));

    let a = tokio::spawn({
        let sync = sync.clone();
        async move { sync.request_quote(intent("1")).await }
    });
    // Let A claim its ticket and enter the read before B is issued.
    tokio::time::sleep(Duration::from_millis(1)).await;
    let b = tokio::spawn({
        let sync = sync.clone();
        async move { sync.request_quote(intent("2")).await }
    });

    a.await.unwrap();
    b.await.unwrap();

    // The final result reflects B; A's late response was dropped.
    let expected_b = constant_product_out(
        U256::from(2_000_000u64),
        U256::from(RESERVE0),
        U256::from(RESERVE1),
    );
    assert_eq!(sync.current().amount_out, Some(expected_b));
    assert_eq!(ledger.quote_reads(), 2);
    assert_eq!(counters.quotes_applied.load(Ordering::Relaxed), 1);
    assert_eq!(counters.quotes_dropped_stale.load(Ordering::Relaxed), 1);
}

#[tokio::test(start_paused = true)]
async fn request_superseded_inside_debounce_window_issues_no_read() {
    let ledger = world();
    let counters = Counters::default();
    let sync = synchronizer(ledger.clone(), Duration::from_millis(50), counters.clone());

    let first = tokio::spawn({
        let sync = sync.clone();
        async move { sync.request_quote(intent("1")).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = tokio::spawn({
        let sync = sync.clone();
        async move { sync.request_quote(intent("2")).await }
    });

    first.await.unwrap();
    second.await.unwrap();

    // Only the surviving request reached the ledger.
    assert_eq!(ledger.quote_reads(), 1);
    assert_eq!(counters.quotes_debounced.load(Ordering::Relaxed), 1);

    let expected = constant_product_out(
        U256::from(2_000_000u64),
        U256::from(RESERVE0),
        U256::from(RESERVE1),
    );
    assert_eq!(sync.current().amount_out, Some(expected));
}

#[tokio::test]
async fn resync_reruns_the_last_intent_without_debounce() {
    let ledger = world();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, Counters::default());

    sync.request_quote(intent("1")).await;
    assert_eq!(ledger.quote_reads(), 1);

    sync.resync().await;
    assert_eq!(ledger.quote_reads(), 2);
    assert!(sync.current().amount_out.is_some());

    // Nothing to re-run before any intent was seen.
    let idle = synchronizer(ledger.clone(), Duration::ZERO, Counters::default());
    idle.resync().await;
    assert_eq!(ledger.quote_reads(), 2);
}

#[tokio::test]
async fn missing_ledger_capability_yields_empty_quotes() {
    let sync: QuoteSynchronizer<MockLedger> =
        QuoteSynchronizer::new(None, 6, Duration::ZERO, Counters::default());

    sync.request_quote(intent("1")).await;
    assert_eq!(sync.current().amount_out, None);
}

#[tokio::test]
async fn failed_read_publishes_empty_rather_than_stale() {
    let ledger = world();
    let sync = synchronizer(ledger.clone(), Duration::ZERO, Counters::default());

    sync.request_quote(intent("1")).await;
    assert!(sync.current().amount_out.is_some());

    // Client pointed at a dead address: the read fails, the stale value
    // must not survive under a newer intent.
    let broken = Arc::new(QuoteSynchronizer::new(
        Some(Arc::new(AmmClient::new(
            ledger,
            Address::repeat_byte(0xee),
            TOKEN0,
            TOKEN1,
        ))),
        6,
        Duration::ZERO,
        Counters::default(),
    ));
    broken.request_quote(intent("1")).await;
    assert_eq!(broken.current().amount_out, None);
}
