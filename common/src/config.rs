use alloy_primitives::Address;
use anyhow::Context;

/// One side of the configured pool pair.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub address: Address,
    pub symbol: String,
}

/// Deployment-level configuration, loaded once before the engine starts
/// and read-only afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Chain id this deployment targets. Sessions are refused on any
    /// other network.
    pub target_chain_id: u64,

    /// Address of the pool contract.
    pub amm_address: Address,

    /// The two pool tokens, in contract order.
    pub token0: TokenConfig,
    pub token1: TokenConfig,

    /// Fixed-point precision shared by both tokens.
    ///
    /// User-entered decimal strings are scaled by 10^decimals; digits
    /// beyond this precision truncate.
    pub decimals: u8,

    // =========================
    // Quote configuration
    // =========================
    /// How long user input must stay unchanged before a quote read is
    /// issued.
    ///
    /// Collapses a burst of keystrokes into a single remote call; a
    /// request superseded inside this window never reaches the ledger.
    pub quote_debounce_ms: u64,

    // =========================
    // Confirmation configuration
    // =========================
    /// Receipt poll interval for submitted transactions.
    pub confirm_poll_ms: u64,

    /// Give up waiting for a receipt after this long.
    ///
    /// A timed-out transaction may still land later; the engine reports
    /// the timeout and leaves recovery to a fresh user attempt.
    pub confirm_timeout_ms: u64,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Contract addresses are required; everything else falls back to
    /// defaults suitable for a public testnet.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            // 11155111 = sepolia
            target_chain_id: env_or("TARGET_CHAIN_ID", 11_155_111)?,
            amm_address: required_address("AMM_ADDRESS")?,
            token0: TokenConfig {
                address: required_address("TOKEN0_ADDRESS")?,
                symbol: std::env::var("TOKEN0_SYMBOL").unwrap_or_else(|_| "TK0".to_string()),
            },
            token1: TokenConfig {
                address: required_address("TOKEN1_ADDRESS")?,
                symbol: std::env::var("TOKEN1_SYMBOL").unwrap_or_else(|_| "TK1".to_string()),
            },
            decimals: env_or("TOKEN_DECIMALS", 18)?,
            quote_debounce_ms: env_or("QUOTE_DEBOUNCE_MS", 250)?,
            confirm_poll_ms: env_or("CONFIRM_POLL_MS", 1_000)?,
            confirm_timeout_ms: env_or("CONFIRM_TIMEOUT_MS", 90_000)?,
        })
    }
}

fn required_address(key: &str) -> anyhow::Result<Address> {
    let raw = std::env::var(key).with_context(|| format!("{key} must be set"))?;
    raw.parse()
        .with_context(|| format!("{key} is not a valid address"))
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse::<T>().with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}
