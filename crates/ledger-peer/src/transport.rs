use std::future::Future;
use std::pin::Pin;

use crate::error::PeerError;
use crate::message::{PeerAck, PeerMessage};

/// Delivers a `PeerMessage` to a single peer and waits for its ack. Kept as
/// a manually boxed future rather than pulling in `async-trait` — only two
/// implementations (HTTP, and an in-process fake for tests) ever exist.
pub trait PeerTransport: Send + Sync {
    fn send(&self, address: &str, message: PeerMessage) -> Pin<Box<dyn Future<Output = Result<PeerAck, PeerError>> + Send>>;
}

/// Carries peer messages as plain `POST /peer` JSON bodies, replacing the
/// teacher's libp2p gossip swarm with the HTTP transport C7 settles on.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerTransport for HttpTransport {
    fn send(&self, address: &str, message: PeerMessage) -> Pin<Box<dyn Future<Output = Result<PeerAck, PeerError>> + Send>> {
        let client = self.client.clone();
        let url = format!("{}/peer", address.trim_end_matches('/'));
        Box::pin(async move {
            let resp = client
                .post(&url)
                .json(&message)
                .send()
                .await
                .map_err(|e| PeerError::Transport(e.to_string()))?;
            resp.json::<PeerAck>().await.map_err(|e| PeerError::Transport(e.to_string()))
        })
    }
}
