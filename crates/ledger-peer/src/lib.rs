//! Node registry, gossip state machine, and inbound dispatch for the peer
//! layer. No direct teacher counterpart (the teacher used a libp2p gossip
//! swarm here); the shared-mutex-behind-an-Arc shape follows the Chain
//! Engine and Router, and the transport is plain HTTP+JSON rather than a
//! gossip protocol — see DESIGN.md for the reasoning.

mod error;
mod message;
mod registry;
mod server;
mod state;
mod transport;

pub use error::PeerError;
pub use message::{PeerAck, PeerMessage};
pub use registry::{NodeRecord, NodeRegistry};
pub use server::serve;
pub use state::TxState;
pub use transport::{HttpTransport, PeerTransport};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledger_chain::ChainEngine;
use ledger_core::Transaction;
use tracing::{info, warn};

/// Tracks where each gossiped transaction sits in the broadcast state
/// machine. Held behind its own mutex ("Peer mutex guards `nodes` and
/// `queue`" — this is the queue half; the registry is the nodes half).
#[derive(Default)]
struct Queue {
    states: HashMap<String, TxState>,
}

pub struct PeerLayer {
    pub registry: NodeRegistry,
    transport: Box<dyn PeerTransport>,
    queue: Mutex<Queue>,
}

impl PeerLayer {
    pub fn new(transport: Box<dyn PeerTransport>) -> Arc<Self> {
        Arc::new(Self { registry: NodeRegistry::new(), transport, queue: Mutex::new(Queue::default()) })
    }

    pub fn with_http_transport() -> Arc<Self> {
        Self::new(Box::new(HttpTransport::new()))
    }

    /// The Node runtime's periodic peer-layer duty: report registry size
    /// so connectivity loss is visible in logs. Mirrors the
    /// `tokio::spawn` + `interval` shape `ChainEngine::spawn_mining_loop`
    /// and `Router::spawn_rollup_timer` already use.
    pub fn spawn_tick(self: &Arc<Self>, interval: Duration) {
        let layer = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                info!(peers = layer.registry.len(), "peer layer tick");
            }
        });
    }

    fn set_state(&self, id: &str, state: TxState) {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).states.insert(id.to_string(), state);
    }

    pub fn state_of(&self, id: &str) -> TxState {
        self.queue
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .states
            .get(id)
            .copied()
            .unwrap_or(TxState::None)
    }

    /// Drives the three-phase broadcast to completion: 1/3 of the registry
    /// (ack-gated) → 2/3 (ack-gated) → everyone left over. A phase with zero
    /// selected peers (an empty registry) is vacuously acknowledged so a
    /// lone node can still archive its own transactions.
    pub async fn broadcast_transaction(
        &self,
        sender_public_key_der: &[u8],
        tx: &Transaction,
    ) -> Result<(), PeerError> {
        self.set_state(&tx.id, TxState::Queued);

        let phase1 = self.registry.get_random_one_third();
        self.set_state(&tx.id, TxState::Pnd13);
        self.send_phase(
            &phase1,
            PeerMessage::Validate { transaction: tx.clone(), sender_public_key_der: sender_public_key_der.to_vec() },
        )
        .await?;
        self.set_state(&tx.id, TxState::Valid);

        let phase2 = self.registry.get_random_two_thirds();
        self.set_state(&tx.id, TxState::Pnd23);
        self.send_phase(&phase2, PeerMessage::Add { transaction: tx.clone() }).await?;
        self.set_state(&tx.id, TxState::Final);

        let already_contacted: Vec<String> =
            phase1.iter().chain(phase2.iter()).map(|n| n.id.clone()).collect();
        let phase3 = self.registry.all_except(&already_contacted);
        self.set_state(&tx.id, TxState::Pnd);
        self.send_phase(&phase3, PeerMessage::Add { transaction: tx.clone() }).await?;
        self.set_state(&tx.id, TxState::Archived);

        info!(tx_id = %tx.id, "transaction archived after full broadcast");
        Ok(())
    }

    async fn send_phase(&self, peers: &[NodeRecord], message: PeerMessage) -> Result<(), PeerError> {
        for peer in peers {
            let ack = self.transport.send(&peer.address, message.clone()).await?;
            if !ack.ok {
                return Err(PeerError::Transport(ack.detail.unwrap_or_else(|| "peer declined".to_string())));
            }
        }
        Ok(())
    }

    /// Inbound dispatch. `validate` verifies the envelope's signature and,
    /// on success, hands the transaction to the chain's pending pool.
    /// `register` adds the node and rebroadcasts its record onward so the
    /// rest of the registry converges without a central directory.
    pub async fn process_p2p_transaction(&self, message: PeerMessage, chain: &ChainEngine) -> Result<PeerAck, PeerError> {
        match message {
            PeerMessage::Validate { transaction, sender_public_key_der } => {
                ledger_crypto::verify(&sender_public_key_der, &transaction.signing_digest(), &transaction.signature)
                    .map_err(|_| PeerError::BadSignature)?;
                chain.add_transaction(transaction);
                Ok(PeerAck::ok())
            }
            PeerMessage::Status { id } => {
                let state = self.state_of(&id);
                Ok(PeerAck { ok: true, detail: Some(format!("{state:?}")) })
            }
            PeerMessage::Add { transaction } => {
                chain.add_transaction(transaction);
                Ok(PeerAck::ok())
            }
            PeerMessage::Remove { id } => {
                chain.remove_transaction(&id);
                Ok(PeerAck::ok())
            }
            PeerMessage::Register { node } => {
                let id = node.id.clone();
                self.registry.register(node.clone())?;
                let rest = self.registry.all_except(&[id]);
                if let Err(e) = self.send_phase(&rest, PeerMessage::Register { node }).await {
                    warn!(error = %e, "register rebroadcast failed");
                }
                Ok(PeerAck::ok())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{Transaction, TransactionStatus, TransactionVariant};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: Arc<AtomicUsize>,
    }

    impl PeerTransport for CountingTransport {
        fn send(&self, _address: &str, _message: PeerMessage) -> Pin<Box<dyn Future<Output = Result<PeerAck, PeerError>> + Send>> {
            let calls = Arc::clone(&self.calls);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(PeerAck::ok())
            })
        }
    }

    fn sample_tx() -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            version: "1.0".to_string(),
            from: "alice".to_string(),
            to: "bob".to_string(),
            fee: 0.05,
            signature: vec![0u8; 64],
            status: TransactionStatus::Pending,
            created_at: 0,
            validated_at: None,
            variant: TransactionVariant::Message { message: "hi".to_string() },
        }
    }

    #[tokio::test]
    async fn broadcast_with_empty_registry_archives_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let layer = PeerLayer::new(Box::new(CountingTransport { calls: Arc::clone(&calls) }));
        let tx = sample_tx();
        layer.broadcast_transaction(&[1, 2, 3], &tx).await.unwrap();
        assert_eq!(layer.state_of(&tx.id), TxState::Archived);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn broadcast_archives_through_every_phase_with_peers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let layer = PeerLayer::new(Box::new(CountingTransport { calls: Arc::clone(&calls) }));
        for i in 0..6 {
            layer
                .registry
                .register(NodeRecord { id: format!("n{i}"), address: format!("http://n{i}"), public_key_der: vec![] })
                .unwrap();
        }
        let tx = sample_tx();
        layer.broadcast_transaction(&[1, 2, 3], &tx).await.unwrap();
        assert_eq!(layer.state_of(&tx.id), TxState::Archived);
        // phase sizes (2 + 4) may overlap since disjointness isn't required,
        // but every phase always sends at least once.
        assert!(calls.load(Ordering::SeqCst) >= 6);
    }

    #[test]
    fn register_rejects_duplicate_and_nil_nodes() {
        let layer = PeerLayer::new(Box::new(CountingTransport { calls: Arc::new(AtomicUsize::new(0)) }));
        layer
            .registry
            .register(NodeRecord { id: "n1".into(), address: "http://n1".into(), public_key_der: vec![] })
            .unwrap();
        assert!(layer.registry.is_registered("n1"));
        assert!(matches!(
            layer.registry.register(NodeRecord { id: "n1".into(), address: "http://n1".into(), public_key_der: vec![] }),
            Err(PeerError::AlreadyRegistered(_))
        ));
    }
}
