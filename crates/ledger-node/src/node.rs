use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ledger_api::{ApiState, BearerTokens};
use ledger_chain::ChainEngine;
use ledger_core::{NodeInfo, NodeStatus, Puid};
use ledger_genesis::GenesisParams;
use ledger_peer::PeerLayer;
use ledger_router::Router;
use ledger_store::{Store, StoreKey};
use ledger_wallet::{generate_random_password, Wallet};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::Config;
use crate::error::NodeError;

static SINGLETON_GUARD: OnceCell<()> = OnceCell::new();

/// The process-wide node. `new` is one-shot — a second call in the same
/// process returns `AlreadyInitialised` via `SINGLETON_GUARD`, the one
/// true global this crate keeps; everything else is threaded explicitly.
pub struct Node {
    pub config: Config,
    pub store: Arc<Store>,
    pub chain: Arc<ChainEngine>,
    pub peer: Arc<PeerLayer>,
    pub router: Arc<Router>,
    pub api_state: Option<ApiState>,
    pub wallet_address: String,
}

impl Node {
    /// Startup order: Store → Chain (genesis if needed) → API (conditional)
    /// → Peer Layer → Node Wallet (generated if absent).
    pub fn new(config: Config) -> Result<Arc<Self>, NodeError> {
        config.validate()?;
        SINGLETON_GUARD.set(()).map_err(|_| NodeError::AlreadyInitialised)?;

        std::fs::create_dir_all(&config.data_path)?;
        let store = Arc::new(Store::open(config.data_path.clone())?);

        let genesis_params = GenesisParams {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            block_time_secs: config.block_time_secs,
            transaction_fee: config.transaction_fee,
            min_transaction_fee: config.min_transaction_fee,
            miner_reward_pct: config.miner_reward_pct,
            dev_reward_pct: config.dev_reward_pct,
            token_count: config.token_count,
            token_price: config.token_price,
            allow_new_tokens: config.allow_new_tokens,
            fund_wallet_amount: config.fund_wallet_amount,
            test_kdf: config.testing,
        };
        let chain = ChainEngine::bootstrap(Arc::clone(&store), &genesis_params)?;
        info!(height = chain.height(), "chain engine ready");

        let api_state = config.enable_api.then(|| ApiState::new(Arc::clone(&chain), BearerTokens::new(Default::default())));

        let peer = PeerLayer::with_http_transport();
        let router = Router::new();

        let wallet_address = ensure_node_wallet(&store, config.testing)?;

        Ok(Arc::new(Self { config, store, chain, peer, router, api_state, wallet_address }))
    }

    /// Starts the mining loop, the rollup timer, the peer layer's tick and
    /// inbound listener, and (if enabled) the API server, then blocks
    /// forever — no graceful shutdown is specified for this core.
    pub async fn run(self: &Arc<Self>) -> Result<(), NodeError> {
        self.chain.spawn_mining_loop();
        self.router.spawn_rollup_timer();
        self.peer.spawn_tick(Duration::from_secs(self.config.block_time_secs.max(1)));

        let peer_addr = parse_host(&self.config.p2p_host);
        let peer = Arc::clone(&self.peer);
        let chain = Arc::clone(&self.chain);
        tokio::spawn(async move {
            if let Err(e) = ledger_peer::serve(peer, chain, peer_addr).await {
                tracing::error!(error = %e, "peer listener exited");
            }
        });

        if let Some(api_state) = self.api_state.clone() {
            let addr = parse_host(&self.config.api_host);
            tokio::spawn(async move {
                if let Err(e) = ledger_api::run(addr, api_state).await {
                    tracing::error!(error = %e, "API server exited");
                }
            });
        }

        info!(wallet = %self.wallet_address, "node running");
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Loads the node's own operating wallet from `store`'s singleton file, or
/// generates one (and persists both the wallet and the singleton) on
/// first boot.
fn ensure_node_wallet(store: &Store, test_kdf: bool) -> Result<String, NodeError> {
    match store.get::<NodeInfo>(&StoreKey::Node) {
        Ok(info) => Ok(info.wallet_address),
        Err(ledger_store::StoreError::NotFound(_)) => {
            let passphrase = generate_random_password();
            let mut wallet = Wallet::new(Puid::new(0, 0, 9, 0), &passphrase)?;
            if test_kdf {
                wallet = wallet.with_test_kdf();
            }
            let address = wallet.get_address()?;
            wallet.close(&passphrase, store)?;

            let mut info = NodeInfo::new(unix_timestamp(), address.clone());
            info.status = NodeStatus::Ready;
            store.set(&StoreKey::Node, &info)?;
            info!(%address, "generated node wallet");
            Ok(address)
        }
        Err(e) => Err(e.into()),
    }
}

/// `":8100"`-style host strings bind on all interfaces; anything else is
/// used verbatim.
fn parse_host(host: &str) -> std::net::SocketAddr {
    let normalized = if let Some(port) = host.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else {
        host.to_string()
    };
    normalized.parse().unwrap_or_else(|_| "0.0.0.0:8100".parse().unwrap())
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_expands_colon_port_shorthand() {
        assert_eq!(parse_host(":8100").to_string(), "0.0.0.0:8100");
    }

    #[test]
    fn parse_host_passes_through_full_addresses() {
        assert_eq!(parse_host("127.0.0.1:9000").to_string(), "127.0.0.1:9000");
    }
}
