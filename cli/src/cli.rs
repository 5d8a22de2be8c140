use clap::{Parser, Subcommand, ValueEnum};

use amm::Side;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideCli {
    Token0,
    Token1,
}

impl From<SideCli> for Side {
    fn from(s: SideCli) -> Self {
        match s {
            SideCli::Token0 => Side::Token0,
            SideCli::Token1 => Side::Token1,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "poolswap", version)]
pub struct Cli {
    /// JSON-RPC endpoint of a node with unlocked accounts
    #[clap(long, default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Emit JSON logs instead of pretty ones
    #[clap(long)]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and print the pool reserves
    Pool,
    /// Quote the output for an input amount
    Quote {
        #[clap(value_enum)]
        side: SideCli,
        /// Human decimal amount, e.g. "1.5"
        amount: String,
    },
    /// Connect, assure allowance, and execute a swap
    Swap {
        #[clap(value_enum)]
        side: SideCli,
        amount: String,
    },
    /// Check the configured token addresses against the deployed pool
    VerifyPair,
}
