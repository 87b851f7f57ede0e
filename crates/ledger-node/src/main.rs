//! ledger-node — the ledgercraft full-node binary.
//!
//! Startup sequence: open the store, bootstrap the chain engine (applying
//! genesis on a fresh data directory), load or generate the node's wallet,
//! bring up the peer layer and the admin API, then run forever.

mod config;
mod error;
mod node;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use config::Config;
use node::Node;

#[derive(Parser, Debug)]
#[command(name = "ledger-node", version, about = "ledgercraft full node")]
struct Args {
    /// Directory for the persistent data store.
    #[arg(long, default_value = "~/.ledgercraft/data")]
    data_dir: PathBuf,

    /// Admin API listen address (overrides API_HOSTNAME).
    #[arg(long)]
    api_host: Option<String>,

    /// Peer layer listen address (overrides P2P_HOSTNAME).
    #[arg(long)]
    p2p_host: Option<String>,

    /// Mining difficulty override.
    #[arg(long)]
    difficulty: Option<u8>,

    /// Disable the admin API entirely.
    #[arg(long)]
    no_api: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ledger=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("ledgercraft node starting");

    let mut config = Config::from_env();
    config.data_path = expand_tilde(&args.data_dir);
    if let Some(host) = args.api_host {
        config.api_host = host;
    }
    if let Some(host) = args.p2p_host {
        config.p2p_host = host;
    }
    if let Some(d) = args.difficulty {
        config.difficulty = d;
    }
    if args.no_api {
        config.enable_api = false;
    }

    let node = Node::new(config).context("initialising node")?;
    info!(wallet = %node.wallet_address, "node initialised");

    node.run().await.context("running node")?;
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
