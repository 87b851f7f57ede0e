use std::collections::HashMap;
use std::sync::Mutex;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::PeerError;

/// Everything the registry needs to reach a peer and verify what it signs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub address: String,
    #[serde(with = "hex_bytes")]
    pub public_key_der: Vec<u8>,
}

mod hex_bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// The set of known peers, guarded by a single mutex per the concurrency
/// contract ("Peer mutex guards `nodes` and `queue`").
#[derive(Default)]
pub struct NodeRegistry {
    nodes: Mutex<HashMap<String, NodeRecord>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, node: NodeRecord) -> Result<(), PeerError> {
        if node.id.is_empty() {
            return Err(PeerError::NilNode);
        }
        let mut nodes = self.nodes.lock().unwrap_or_else(|p| p.into_inner());
        if nodes.contains_key(&node.id) {
            return Err(PeerError::AlreadyRegistered(node.id));
        }
        nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.nodes.lock().unwrap_or_else(|p| p.into_inner()).contains_key(id)
    }

    pub fn remove_node(&self, id: &str) -> Result<(), PeerError> {
        let mut nodes = self.nodes.lock().unwrap_or_else(|p| p.into_inner());
        nodes.remove(id).map(|_| ()).ok_or_else(|| PeerError::NodeNotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<NodeRecord> {
        self.nodes.lock().unwrap_or_else(|p| p.into_inner()).get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sample(&self, count: usize) -> Vec<NodeRecord> {
        let nodes = self.nodes.lock().unwrap_or_else(|p| p.into_inner());
        let mut all: Vec<&NodeRecord> = nodes.values().collect();
        all.shuffle(&mut rand::thread_rng());
        all.into_iter().take(count).cloned().collect()
    }

    /// floor(N/3), minimum 1, clamped to however many nodes actually exist.
    pub fn get_random_one_third(&self) -> Vec<NodeRecord> {
        let n = self.len();
        let want = (n / 3).max(1).min(n);
        self.sample(want)
    }

    /// floor(2N/3), minimum 2, clamped to however many nodes actually exist.
    pub fn get_random_two_thirds(&self) -> Vec<NodeRecord> {
        let n = self.len();
        let want = (2 * n / 3).max(2).min(n);
        self.sample(want)
    }

    /// All currently registered nodes except the ones already addressed.
    pub fn all_except(&self, exclude: &[String]) -> Vec<NodeRecord> {
        let nodes = self.nodes.lock().unwrap_or_else(|p| p.into_inner());
        nodes.values().filter(|n| !exclude.contains(&n.id)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> NodeRecord {
        NodeRecord { id: id.to_string(), address: format!("http://{id}"), public_key_der: vec![1, 2, 3] }
    }

    #[test]
    fn register_rejects_duplicates_and_nil() {
        let reg = NodeRegistry::new();
        reg.register(record("a")).unwrap();
        assert!(matches!(reg.register(record("a")), Err(PeerError::AlreadyRegistered(_))));
        assert!(matches!(
            reg.register(NodeRecord { id: String::new(), address: String::new(), public_key_der: vec![] }),
            Err(PeerError::NilNode)
        ));
    }

    #[test]
    fn remove_fails_on_absent_node() {
        let reg = NodeRegistry::new();
        assert!(matches!(reg.remove_node("ghost"), Err(PeerError::NodeNotFound(_))));
    }

    #[test]
    fn fan_out_sizes_follow_the_thirds_rule() {
        let reg = NodeRegistry::new();
        for i in 0..9 {
            reg.register(record(&i.to_string())).unwrap();
        }
        assert_eq!(reg.get_random_one_third().len(), 3);
        assert_eq!(reg.get_random_two_thirds().len(), 6);
    }

    #[test]
    fn fan_out_sizes_have_a_floor_at_small_n() {
        let reg = NodeRegistry::new();
        reg.register(record("solo")).unwrap();
        assert_eq!(reg.get_random_one_third().len(), 1);
        assert_eq!(reg.get_random_two_thirds().len(), 1);

        reg.register(record("duo")).unwrap();
        assert_eq!(reg.get_random_one_third().len(), 1);
        assert_eq!(reg.get_random_two_thirds().len(), 2);
    }
}
