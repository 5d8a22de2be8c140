use std::fmt;

use alloy_primitives::U256;
use serde::Serialize;

/// Which of the two configured tokens is being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Token0,
    Token1,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Token0 => f.write_str("token0"),
            Side::Token1 => f.write_str("token1"),
        }
    }
}

/// A candidate swap as the user typed it. The amount stays a raw string
/// until it is parsed at the point of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub side: Side,
    pub amount: String,
}

/// Cached view of the pool reserves, oriented token0 → token1.
///
/// Never authoritative: the contract is. This is only the last fetched
/// snapshot, stale until the next refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub pair: String,
    pub fetched_at_ms: u64,
}

/// Latest completed quote. `amount_out` is `None` for zero/unparseable
/// input and after a failed read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteResult {
    pub amount_out: Option<U256>,
    pub ts_ms: u64,
}

impl QuoteResult {
    pub fn empty(ts_ms: u64) -> Self {
        Self {
            amount_out: None,
            ts_ms,
        }
    }
}
