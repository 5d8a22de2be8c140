//! Pool-side reads and writes: the AMM contract client, the cached pool
//! view, and the debounced, sequence-numbered quote synchronizer.

pub mod client;
pub mod error;
pub mod pool;
pub mod quote;
pub mod types;

pub use client::AmmClient;
pub use error::AmmError;
pub use pool::PoolStore;
pub use quote::QuoteSynchronizer;
pub use types::{PoolState, QuoteResult, Side, SwapIntent};
