use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::TX_LOOKUP_CAPACITY;
use crate::types::BlockIndex;

/// `{blockIndex, txID, txHash}`, merged on disk as `"<index>:<txID>:<txHash>"`.
/// `:` is forbidden inside `tx_id`/`tx_hash` — both are hex strings so this
/// always holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxLookupEntry {
    pub block_index: BlockIndex,
    pub tx_id: String,
    pub tx_hash: String,
}

impl TxLookupEntry {
    pub fn to_merged(&self) -> String {
        format!("{}:{}:{}", self.block_index, self.tx_id, self.tx_hash)
    }

    pub fn from_merged(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, ':');
        let block_index = parts.next()?.parse().ok()?;
        let tx_id = parts.next()?.to_string();
        let tx_hash = parts.next()?.to_string();
        Some(Self {
            block_index,
            tx_id,
            tx_hash,
        })
    }
}

/// Exactly one of `block_index`, `tx_id`, `tx_hash` is populated in a lookup
/// query.
pub enum LookupQuery<'a> {
    BlockIndex(BlockIndex),
    TxId(&'a str),
    TxHash(&'a str),
}

/// FIFO with a hard capacity; insertion evicts the oldest entry when full;
/// duplicates are rejected.
#[derive(Default)]
pub struct TxLookupIndex {
    order: VecDeque<TxLookupEntry>,
    seen: HashSet<String>,
    capacity: usize,
}

impl TxLookupIndex {
    pub fn new() -> Self {
        Self::with_capacity(TX_LOOKUP_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(1024)),
            seen: HashSet::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `false` if `entry` is already present (rejected, not an
    /// error — mirrors the reference's idempotent insert).
    pub fn insert(&mut self, entry: TxLookupEntry) -> bool {
        let key = entry.to_merged();
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted.to_merged());
            }
        }
        self.seen.insert(key);
        self.order.push_back(entry);
        true
    }

    pub fn find(&self, query: LookupQuery<'_>) -> Option<&TxLookupEntry> {
        self.order.iter().find(|e| match query {
            LookupQuery::BlockIndex(i) => e.block_index == i,
            LookupQuery::TxId(id) => e.tx_id == id,
            LookupQuery::TxHash(h) => e.tx_hash == h,
        })
    }

    /// Entries oldest-to-newest, for persisting to a flat snapshot.
    pub fn entries(&self) -> impl Iterator<Item = &TxLookupEntry> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: u64) -> TxLookupEntry {
        TxLookupEntry {
            block_index: i,
            tx_id: format!("id{i}"),
            tx_hash: format!("hash{i}"),
        }
    }

    #[test]
    fn merged_form_round_trips() {
        let e = entry(7);
        assert_eq!(TxLookupEntry::from_merged(&e.to_merged()), Some(e));
    }

    #[test]
    fn capacity_keeps_most_recent_and_no_duplicates() {
        let mut idx = TxLookupIndex::with_capacity(4);
        for i in 0..10u64 {
            idx.insert(entry(i));
        }
        assert_eq!(idx.len(), 4);
        assert!(idx.find(LookupQuery::TxId("id0")).is_none());
        assert!(idx.find(LookupQuery::TxId("id9")).is_some());

        // re-inserting an existing entry is a no-op
        let before = idx.len();
        assert!(!idx.insert(entry(9)));
        assert_eq!(idx.len(), before);
    }

    #[test]
    fn over_capacity_by_much_keeps_capacity_most_recent() {
        let mut idx = TxLookupIndex::with_capacity(65_536);
        for i in 0..70_000u64 {
            idx.insert(entry(i));
        }
        assert_eq!(idx.len(), 65_536);
        assert!(idx.find(LookupQuery::TxId("id4463")).is_none());
        assert!(idx.find(LookupQuery::TxId("id69999")).is_some());
    }
}
