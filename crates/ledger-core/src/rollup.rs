/// `id = hex(SHA-256(protocol || ":" || unixNanoTimestamp))`.
///
/// The `RollupBlock` type itself (the internal commitment these helpers
/// build) is owned by `ledger-router`, since its `transactions` field
/// holds router-local `ProtocolTransaction`s, not this crate's chain
/// `Transaction`.
pub fn rollup_id(protocol: &str, unix_nanos: i128) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(protocol.as_bytes());
    hasher.update(b":");
    hasher.update(unix_nanos.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Leaves are `SHA-256(id || ":" || protocol || ":" || data)`. Adjacent
/// hashes are paired (left||right, hashed); an odd trailing element is
/// carried up unchanged. Empty input yields the empty string.
pub fn merkle_root(leaves: &[[u8; 32]]) -> String {
    if leaves.is_empty() {
        return String::new();
    }
    use sha2::{Digest, Sha256};
    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut i = 0;
        while i < level.len() {
            if i + 1 < level.len() {
                let mut hasher = Sha256::new();
                hasher.update(level[i]);
                hasher.update(level[i + 1]);
                next.push(hasher.finalize().into());
            } else {
                next.push(level[i]);
            }
            i += 2;
        }
        level = next;
    }
    hex::encode(level[0])
}

/// `SHA-256(id || ":" || protocol || ":" || data)`, used to build merkle
/// leaves from a validated transaction's identity and opaque data.
pub fn leaf_hash(id: &str, protocol: &str, data: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(b":");
    hasher.update(protocol.as_bytes());
    hasher.update(b":");
    hasher.update(data.as_bytes());
    hasher.finalize().into()
}
