//! Accepts BANK/MESSAGE transactions, validates them off a deterministic
//! delay, and periodically rolls up everything currently `Validated` into
//! a merkle-committed `RollupBlock`. No direct teacher counterpart — the
//! tokio::spawn/mpsc idiom here follows `chronx-node`'s main loop; the
//! mutex-protects-shared-state shape is the general stdlib pattern used
//! wherever the teacher needs shared mutable state across tasks.

mod error;
mod stats;
mod transaction;

pub use error::RouterError;
pub use stats::{QueueStatus, Stats};
pub use transaction::{Protocol, ProtocolTransaction, RollupBlock};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledger_core::constants::{ROLLUP_INTERVAL_SECS, VALIDATION_DELAY_MS};
use ledger_core::rollup::{leaf_hash, merkle_root, rollup_id};
use ledger_core::TransactionStatus;
use tokio::time::Instant;
use tracing::{info, warn};

pub type OnValidated = Box<dyn Fn(&ProtocolTransaction) -> Result<(), String> + Send + Sync>;
pub type OnFailed = Box<dyn Fn(&ProtocolTransaction, &str) + Send + Sync>;
pub type OnRollup = Box<dyn Fn(&RollupBlock) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    on_validated: Option<OnValidated>,
    on_failed: Option<OnFailed>,
    on_rollup: Option<OnRollup>,
}

struct Queues {
    by_protocol: HashMap<Protocol, VecDeque<ProtocolTransaction>>,
    last_rollup: HashMap<Protocol, RollupBlock>,
    rollup_block_number: u64,
}

impl Default for Queues {
    fn default() -> Self {
        let mut by_protocol = HashMap::new();
        for p in Protocol::ALL {
            by_protocol.insert(p, VecDeque::new());
        }
        Self {
            by_protocol,
            last_rollup: HashMap::new(),
            rollup_block_number: 0,
        }
    }
}

/// Owns the per-protocol queues and stats behind their own mutexes, per
/// the concurrency contract: ingress, validator tasks, and the rollup
/// tick all take the queue mutex, but it's never held across an `.await`.
pub struct Router {
    queues: Mutex<Queues>,
    stats: Mutex<Stats>,
    callbacks: Mutex<Callbacks>,
    validation_delay: Duration,
    rollup_interval: Duration,
}

impl Router {
    pub fn new() -> Arc<Self> {
        Self::with_timing(
            Duration::from_millis(VALIDATION_DELAY_MS),
            Duration::from_secs(ROLLUP_INTERVAL_SECS),
        )
    }

    /// For tests: inject shorter delays so scenarios don't burn wall-clock
    /// time waiting on the production `100ms`/`20s` defaults.
    pub fn with_timing(validation_delay: Duration, rollup_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            queues: Mutex::new(Queues::default()),
            stats: Mutex::new(Stats::default()),
            callbacks: Mutex::new(Callbacks::default()),
            validation_delay,
            rollup_interval,
        })
    }

    pub fn set_callbacks(&self, on_validated: Option<OnValidated>, on_failed: Option<OnFailed>, on_rollup: Option<OnRollup>) {
        let mut cb = self.callbacks.lock().unwrap_or_else(|p| p.into_inner());
        cb.on_validated = on_validated;
        cb.on_failed = on_failed;
        cb.on_rollup = on_rollup;
    }

    /// Accepts a transaction, appends it to its protocol queue, and spawns
    /// its validation task. Returns the queued `ProtocolTransaction`.
    pub fn route_transaction(
        self: &Arc<Self>,
        protocol: &str,
        data: String,
        sender: String,
        recipient: String,
        now: i64,
    ) -> Result<ProtocolTransaction, RouterError> {
        let protocol =
            Protocol::parse(protocol).ok_or_else(|| RouterError::UnsupportedProtocol(protocol.to_string()))?;
        let tx = ProtocolTransaction::new(protocol, data, sender, recipient, now);

        {
            let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
            queues.by_protocol.entry(protocol).or_default().push_back(tx.clone());
        }
        {
            let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
            stats.record_route(protocol);
        }

        let router = Arc::clone(self);
        let tx_id = tx.id.clone();
        tokio::spawn(async move {
            router.validate(protocol, tx_id).await;
        });

        Ok(tx)
    }

    async fn validate(self: Arc<Self>, protocol: Protocol, tx_id: String) {
        let started = Instant::now();
        tokio::time::sleep(self.validation_delay).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let outcome = {
            let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
            let queue = queues.by_protocol.entry(protocol).or_default();
            match queue.iter_mut().find(|t| t.id == tx_id) {
                Some(tx) if tx.status.can_transition_to(TransactionStatus::Validated) => {
                    tx.status = TransactionStatus::Validated;
                    tx.validated_at = Some(unix_now());
                    Some(tx.clone())
                }
                _ => None,
            }
        };

        let Some(validated) = outcome else {
            return;
        };

        {
            let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
            let count_before = stats.total_routed.saturating_sub(1);
            stats.record_validation(count_before, elapsed_ms);
        }

        let callback_result = {
            let cb = self.callbacks.lock().unwrap_or_else(|p| p.into_inner());
            cb.on_validated.as_ref().map(|f| f(&validated))
        };

        if let Some(Err(reason)) = callback_result {
            let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
            let queue = queues.by_protocol.entry(protocol).or_default();
            if let Some(tx) = queue.iter_mut().find(|t| t.id == validated.id) {
                tx.status = TransactionStatus::Failed;
            }
            drop(queues);
            let cb = self.callbacks.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(on_failed) = cb.on_failed.as_ref() {
                on_failed(&validated, &reason);
            }
        }
    }

    /// Runs the rollup tick forever on `self`'s own `tokio::spawn`'d task.
    /// Call once, typically from the Node runtime's startup sequence.
    pub fn spawn_rollup_timer(self: &Arc<Self>) {
        let router = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(router.rollup_interval);
            loop {
                interval.tick().await;
                router.rollup_tick();
            }
        });
    }

    fn rollup_tick(&self) {
        let started = Instant::now();
        for protocol in Protocol::ALL {
            let validated: Vec<ProtocolTransaction> = {
                let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
                let queue = queues.by_protocol.entry(protocol).or_default();
                let (validated, rest): (VecDeque<_>, VecDeque<_>) =
                    queue.drain(..).partition(|t| t.status == TransactionStatus::Validated);
                *queue = rest;
                validated.into_iter().map(|mut t| {
                    t.status = TransactionStatus::RolledUp;
                    t
                }).collect()
            };

            if validated.is_empty() {
                continue;
            }

            let leaves: Vec<[u8; 32]> = validated
                .iter()
                .map(|t| leaf_hash(&t.id, protocol.as_str(), &t.data))
                .collect();
            let root = merkle_root(&leaves);
            let now_nanos = unix_now_nanos();

            let rollup = {
                let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
                queues.rollup_block_number += 1;
                RollupBlock {
                    id: rollup_id(protocol.as_str(), now_nanos),
                    protocol: protocol.as_str().to_string(),
                    transactions: validated.clone(),
                    merkle_root: root,
                    created_at: unix_now(),
                    block_number: queues.rollup_block_number,
                }
            };

            {
                let mut queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
                queues.last_rollup.insert(protocol, rollup.clone());
            }

            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            {
                let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
                stats.record_rollup(elapsed_ms);
            }

            info!(protocol = %protocol, block_number = rollup.block_number, "rollup emitted");

            let cb = self.callbacks.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(on_rollup) = cb.on_rollup.as_ref() {
                on_rollup(&rollup);
            }
        }
    }

    pub fn get_stats(&self) -> Stats {
        self.stats.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn get_queue_status(&self, protocol: &str) -> Option<QueueStatus> {
        let protocol = Protocol::parse(protocol)?;
        let queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
        let queue = queues.by_protocol.get(&protocol)?;
        let mut status = QueueStatus::default();
        for tx in queue {
            match tx.status {
                TransactionStatus::Pending => status.pending += 1,
                TransactionStatus::Validated => status.validated += 1,
                TransactionStatus::Failed => status.failed += 1,
                _ => {}
            }
        }
        Some(status)
    }

    pub fn get_last_rollup(&self, protocol: &str) -> Option<RollupBlock> {
        let protocol = Protocol::parse(protocol)?;
        let queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
        queues.last_rollup.get(&protocol).cloned()
    }

    pub fn get_validated_transactions(&self, protocol: &str) -> Vec<ProtocolTransaction> {
        let Some(protocol) = Protocol::parse(protocol) else {
            warn!(%protocol, "get_validated_transactions: unsupported protocol");
            return Vec::new();
        };
        let queues = self.queues.lock().unwrap_or_else(|p| p.into_inner());
        queues
            .by_protocol
            .get(&protocol)
            .map(|q| q.iter().filter(|t| t.status == TransactionStatus::Validated).cloned().collect())
            .unwrap_or_default()
    }
}

fn unix_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_secs() as i64
}

fn unix_now_nanos() -> i128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_nanos() as i128
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn route_transaction_rejects_unknown_protocol() {
        let router = Router::new();
        let err = router
            .route_transaction("CARRIER_PIGEON", "x".into(), "a".into(), "b".into(), 0)
            .unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedProtocol(_)));
    }

    #[tokio::test]
    async fn routed_transaction_becomes_validated_after_delay() {
        let router = Router::with_timing(Duration::from_millis(5), Duration::from_secs(3600));
        let tx = router
            .route_transaction("BANK", "a".into(), "alice".into(), "bob".into(), 0)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let validated = router.get_validated_transactions("BANK");
        assert!(validated.iter().any(|t| t.id == tx.id));
    }

    #[tokio::test]
    async fn on_validated_failure_moves_transaction_to_failed() {
        let router = Router::with_timing(Duration::from_millis(5), Duration::from_secs(3600));
        let failed_count = Arc::new(AtomicUsize::new(0));
        let failed_count_cb = Arc::clone(&failed_count);
        router.set_callbacks(
            Some(Box::new(|_tx| Err("rejected by policy".to_string()))),
            Some(Box::new(move |_tx, _reason| {
                failed_count_cb.fetch_add(1, Ordering::SeqCst);
            })),
            None,
        );

        router
            .route_transaction("MESSAGE", "hello".into(), "alice".into(), "bob".into(), 0)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(failed_count.load(Ordering::SeqCst), 1);
        assert!(router.get_validated_transactions("MESSAGE").is_empty());
    }

    #[tokio::test]
    async fn rollup_tick_clears_validated_and_sets_merkle_root() {
        let router = Router::with_timing(Duration::from_millis(5), Duration::from_secs(3600));
        for data in ["a", "b", "c"] {
            router
                .route_transaction("BANK", data.into(), "alice".into(), "bob".into(), 0)
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(router.get_validated_transactions("BANK").len(), 3);

        router.rollup_tick();

        assert!(router.get_validated_transactions("BANK").is_empty());
        let rollup = router.get_last_rollup("BANK").expect("rollup should be recorded");
        assert!(!rollup.merkle_root.is_empty());
        assert_eq!(router.get_stats().rollup_blocks_created, 1);
    }

    #[tokio::test]
    async fn rollup_tick_with_nothing_validated_is_a_no_op() {
        let router = Router::new();
        router.rollup_tick();
        assert!(router.get_last_rollup("BANK").is_none());
        assert_eq!(router.get_stats().rollup_blocks_created, 0);
    }
}
