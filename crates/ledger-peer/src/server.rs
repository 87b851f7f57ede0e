use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use ledger_chain::ChainEngine;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::PeerError;
use crate::message::{PeerAck, PeerMessage};
use crate::PeerLayer;

#[derive(Clone)]
struct PeerState {
    layer: Arc<PeerLayer>,
    chain: Arc<ChainEngine>,
}

async fn handle_peer(State(state): State<PeerState>, Json(message): Json<PeerMessage>) -> Result<Json<PeerAck>, PeerError> {
    let ack = state.layer.process_p2p_transaction(message, &state.chain).await?;
    Ok(Json(ack))
}

/// The inbound half of the HTTP transport `PeerLayer::broadcast_transaction`
/// drives on the sending side: a single `POST /peer` route, no auth — the
/// admin surface (ledger-api) carries the bearer scheme, this one is
/// node-to-node.
pub async fn serve(layer: Arc<PeerLayer>, chain: Arc<ChainEngine>, addr: SocketAddr) -> std::io::Result<()> {
    let state = PeerState { layer, chain };
    let app = Router::new().route("/peer", post(handle_peer)).layer(TraceLayer::new_for_http()).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "peer layer listening");
    axum::serve(listener, app.into_make_service()).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_genesis::GenesisParams;
    use tokio::net::TcpListener;

    use super::*;
    use crate::HttpTransport;

    async fn spawn_test_peer() -> (std::net::SocketAddr, Arc<PeerLayer>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ledger_store::Store::open(dir.path()).unwrap());
        let mut params = GenesisParams::default();
        params.test_kdf = true;
        let chain = ChainEngine::bootstrap(store, &params).unwrap();

        let layer = PeerLayer::new(Box::new(HttpTransport::new()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let layer_for_server = Arc::clone(&layer);
        tokio::spawn(async move {
            let state = PeerState { layer: layer_for_server, chain };
            let app = Router::new().route("/peer", post(handle_peer)).with_state(state);
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        (addr, layer)
    }

    #[tokio::test]
    async fn register_message_is_accepted_over_http() {
        let (addr, layer) = spawn_test_peer().await;
        let client = reqwest::Client::new();

        let body = serde_json::json!({
            "action": "register",
            "node": { "id": "peer-x", "address": "http://127.0.0.1:1", "public_key_der": "" }
        });
        let resp = client.post(format!("http://{addr}/peer")).json(&body).send().await.unwrap();
        assert!(resp.status().is_success());
        let ack: PeerAck = resp.json().await.unwrap();
        assert!(ack.ok);
        assert!(layer.registry.is_registered("peer-x"));
    }
}
