use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;
use crate::types::{BlockIndex, Timestamp};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_hash: String,
    pub timestamp: Timestamp,
    pub merkle_root: String,
    pub difficulty: u8,
    pub nonce: u64,
}

/// Invariants: for `i>=1`, `blocks[i].header.previous_hash ==
/// blocks[i-1].hash`; `blocks[i].hash` begins with `difficulty` hexadecimal
/// zero characters; `blocks[i].hash == H(header)`. Genesis (`index=0`) has
/// `previous_hash = ""`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: BlockIndex,
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: String,
}

impl BlockHeader {
    /// Deterministic serialisation used both to compute and to verify
    /// `hash`. Field order is fixed so the digest is reproducible.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct Canon<'a> {
            version: u32,
            previous_hash: &'a str,
            timestamp: Timestamp,
            merkle_root: &'a str,
            difficulty: u8,
            nonce: u64,
        }
        serde_json::to_vec(&Canon {
            version: self.version,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            merkle_root: &self.merkle_root,
            difficulty: self.difficulty,
            nonce: self.nonce,
        })
        .expect("header is serialisable")
    }

    /// `H(header)`: SHA-256 of the canonical header bytes, lowercase hex.
    pub fn hash(&self) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(self.canonical_bytes()))
    }
}

impl Block {
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// `b.hash` has at least `b.header.difficulty` leading `'0'` hex chars.
    pub fn satisfies_difficulty(&self) -> bool {
        let want = self.header.difficulty as usize;
        self.hash.bytes().take(want).all(|b| b == b'0')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> BlockHeader {
        BlockHeader {
            version: 1,
            previous_hash: "abc".into(),
            timestamp: 1000,
            merkle_root: String::new(),
            difficulty: 2,
            nonce: 0,
        }
    }

    #[test]
    fn header_hash_is_deterministic() {
        assert_eq!(header().hash(), header().hash());
    }

    #[test]
    fn header_hash_changes_with_nonce() {
        let mut h1 = header();
        let mut h2 = header();
        h2.nonce = 1;
        assert_ne!(h1.hash(), h2.hash());
        h1.nonce = 1;
        assert_eq!(h1.hash(), h2.hash());
    }
}
