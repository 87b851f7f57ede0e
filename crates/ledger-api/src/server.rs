use std::net::SocketAddr;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_bearer;
use crate::routes;
use crate::state::ApiState;

/// Builds the admin router: `/version`, `/info`, `/health` are public;
/// everything under `/blockchain` and `/consensus` sits behind the bearer
/// middleware.
pub fn build_router(state: ApiState) -> Router {
    let protected = Router::new()
        .route("/blockchain", get(routes::blockchain))
        .route("/blockchain/blocks", get(routes::blocks))
        .route("/blockchain/blocks/:index", get(routes::block_by_index))
        .route("/blockchain/blocks/:index/transactions", get(routes::block_transactions))
        .route("/blockchain/blocks/:index/transactions/:id", get(routes::block_transaction_by_id))
        .route("/blockchain/transactions/:id", get(routes::tx_lookup_by_id))
        .route("/blockchain/wallets", get(routes::wallets_stub).post(routes::wallets_stub))
        .route("/consensus/tx", post(routes::consensus_stub))
        .route("/consensus/block", post(routes::consensus_stub))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/version", get(routes::version))
        .route("/info", get(routes::info))
        .route("/health", get(routes::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: SocketAddr, state: ApiState) -> std::io::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "admin API listening");
    axum::serve(listener, app.into_make_service()).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_genesis::GenesisParams;
    use tokio::net::TcpListener;

    use crate::auth::BearerTokens;
    use crate::state::ApiState;

    use super::build_router;

    async fn spawn_test_server() -> (std::net::SocketAddr, Arc<ledger_chain::ChainEngine>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ledger_store::Store::open(dir.path()).unwrap());
        let mut params = GenesisParams::default();
        params.test_kdf = true;
        let chain = ledger_chain::ChainEngine::bootstrap(store, &params).unwrap();

        let state = ApiState::new(Arc::clone(&chain), BearerTokens::new(Default::default()));
        let app = build_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        (addr, chain)
    }

    #[tokio::test]
    async fn public_routes_serve_without_a_bearer_token() {
        let (addr, _chain) = spawn_test_server().await;
        let client = reqwest::Client::new();

        let health = client.get(format!("http://{addr}/health")).send().await.unwrap();
        assert!(health.status().is_success());

        let info: serde_json::Value =
            client.get(format!("http://{addr}/info")).send().await.unwrap().json().await.unwrap();
        assert_eq!(info["height"], 0);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_or_unknown_bearer_tokens() {
        let (addr, _chain) = spawn_test_server().await;
        let client = reqwest::Client::new();

        let resp = client.get(format!("http://{addr}/blockchain")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        let resp = client
            .get(format!("http://{addr}/blockchain"))
            .bearer_auth("not-a-real-key")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    }
}
