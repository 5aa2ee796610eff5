//! hostwatch poller — lists the instances on a hypervisor host at a fixed
//! interval and prints one JSON snapshot per successful poll on stdout.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hostwatch_models::HostId;
use hostwatch_sdk::{InstanceLister, ListerConfig};
use tracing::info;

mod poller;
mod snapshot;

use crate::poller::Poller;

/// Poll the instances running on a hypervisor host.
///
/// Endpoints and credentials come from `HOSTWATCH_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "hostwatch-poller", about = "Poll the instances running on a hypervisor host")]
struct Args {
    /// Host to watch (overrides HOSTWATCH_TARGET_HOST).
    #[arg(long)]
    host: Option<HostId>,

    /// Seconds between polls.
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Poll a single time and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the snapshots.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ListerConfig::from_env();
    if let Some(host) = args.host {
        config.target_host = host;
    }
    info!(?config, "configuration loaded");

    let host = config.target_host.clone();
    let lister = InstanceLister::new(config).context("failed to build instance lister")?;
    let poller = Poller::new(lister, host, Duration::from_secs(args.interval.max(1)));

    poller.run(std::io::stdout().lock(), args.once).await
}
