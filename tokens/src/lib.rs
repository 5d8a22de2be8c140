pub mod amount;
pub mod client;

pub use amount::{AmountError, from_base_units, to_base_units};
pub use client::{AllowanceRecord, TokenClient};
