//! # ShardSim
//!
//! Entry point for the sharding simulator: spawns the beacon and shard
//! actors, starts them, and periodically logs shard 1's view of its own
//! chain until the run duration elapses or an interrupt arrives.
//!
//! Configuration comes from the environment:
//!
//! - `SHARDSIM_SHARDS` — number of shard chains (default 4)
//! - `SHARDSIM_RUN_SECS` — stop after this many seconds (default: run
//!   until Ctrl-C)
//! - `RUST_LOG` — tracing filter (default `info`)

use anyhow::{Context, Result};
use node_runtime::wiring;
use shared_types::{Command, ParamsHandle, SimParams};
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let mut params = SimParams::default();
    if let Some(shards) = env_parse("SHARDSIM_SHARDS") {
        params.shard_count = shards;
    }
    let run_secs: Option<u64> = env_parse("SHARDSIM_RUN_SECS");

    info!(shards = params.shard_count, "starting sharding simulator");
    let simulation = wiring::spawn(ParamsHandle::new(params));
    simulation.control(Command::Run);

    let deadline = run_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut status = interval(Duration::from_secs(5));
    status.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for interrupt")?;
                info!("interrupt received");
                break;
            }
            tick = status.tick() => {
                if let Ok(view) = simulation.query().render_chain(1, 1) {
                    info!("shard 1 chain view:\n{view}");
                }
                if let Ok(height) = simulation.query().finalization_height(0) {
                    info!(height, "beacon finalization height");
                }
                if deadline.is_some_and(|deadline| tick >= deadline) {
                    info!("run duration elapsed");
                    break;
                }
            }
        }
    }

    info!("shutting down");
    simulation.shutdown().await;
    Ok(())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}
