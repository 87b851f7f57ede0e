use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Initializing,
    Ready,
    Active,
    Inactive,
}

/// The persisted shape of the process-wide Node singleton. Lifecycle
/// (`init`/`teardown`, the `AlreadyInitialised` guard) lives on the runtime
/// type in `ledger-node`; this is its durable data. `wallet_address` is the
/// node's own operating wallet, generated once on first boot and reused on
/// every subsequent restart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: uuid::Uuid,
    pub status: NodeStatus,
    pub last_seen: Timestamp,
    pub wallet_address: String,
}

impl NodeInfo {
    pub fn new(now: Timestamp, wallet_address: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            status: NodeStatus::Initializing,
            last_seen: now,
            wallet_address,
        }
    }
}
