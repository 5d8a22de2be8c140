pub mod config;
pub mod counters;
pub mod logger;
pub mod time;
