pub mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use amm::SwapIntent;
use cli::{Cli, Command};
use common::config::AppConfig;
use common::counters::Counters;
use common::logger::init_tracing;
use gateway::HttpRpcGateway;
use swap::SwapOrchestrator;
use tokens::amount::from_base_units;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.json_logs);

    let config = AppConfig::from_env().context("load configuration")?;
    let decimals = config.decimals;
    let pair = format!("{}/{}", config.token0.symbol, config.token1.symbol);

    let gw = HttpRpcGateway::new(
        args.rpc_url,
        Duration::from_millis(config.confirm_poll_ms),
        Duration::from_millis(config.confirm_timeout_ms),
    )?;
    let orch = SwapOrchestrator::new(config, Some(Arc::new(gw)), Counters::default());

    match args.command {
        Command::Pool => {
            anyhow::ensure!(orch.refresh_pool().await, "pool read failed");
            let snapshot = orch.pool_updates().borrow().clone().unwrap();
            println!(
                "{pair}: reserve_in={} reserve_out={}",
                from_base_units(snapshot.reserve_in, decimals),
                from_base_units(snapshot.reserve_out, decimals),
            );
        }
        Command::Quote { side, amount } => {
            orch.request_quote(SwapIntent {
                side: side.into(),
                amount,
            })
            .await;
            match orch.quote_updates().borrow().amount_out {
                Some(out) => println!("amount_out: {}", from_base_units(out, decimals)),
                None => println!("no quote (zero or invalid input, or read failed)"),
            }
        }
        Command::Swap { side, amount } => {
            let session = orch.connect().await?;
            println!("connected as {} on chain {}", session.account, session.chain_id);

            let confirmation = orch
                .execute_swap(SwapIntent {
                    side: side.into(),
                    amount,
                })
                .await?;
            println!(
                "swap confirmed in block {} (tx {})",
                confirmation.block_number, confirmation.tx_hash
            );
        }
        Command::VerifyPair => {
            orch.verify_pair().await?;
            println!("configured pair matches the deployed pool");
        }
    }

    Ok(())
}
