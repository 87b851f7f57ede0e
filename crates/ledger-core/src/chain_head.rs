//! The persisted summary of chain state: tip pointer, current difficulty,
//! and a flat snapshot of the tx-lookup FIFO (reconstituted into a
//! [`TxLookupIndex`] on load — the ring buffer itself isn't stored, just
//! its contents in order).

use serde::{Deserialize, Serialize};

use crate::constants::{DIFFICULTY, TX_LOOKUP_CAPACITY};
use crate::tx_lookup::{TxLookupEntry, TxLookupIndex};
use crate::types::BlockIndex;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainHead {
    pub height: BlockIndex,
    pub tip_hash: String,
    pub difficulty: u8,
    pub tx_lookup: Vec<TxLookupEntry>,
}

impl ChainHead {
    pub fn genesis(tip_hash: String) -> Self {
        Self {
            height: 0,
            tip_hash,
            difficulty: DIFFICULTY,
            tx_lookup: Vec::new(),
        }
    }

    pub fn to_index(&self) -> TxLookupIndex {
        let mut idx = TxLookupIndex::with_capacity(TX_LOOKUP_CAPACITY);
        for entry in &self.tx_lookup {
            idx.insert(entry.clone());
        }
        idx
    }
}
