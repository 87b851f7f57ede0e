use std::fmt;

/// The only place path derivation happens, per the design: no other
/// component may construct a Store path directly.
pub enum StoreKey {
    /// The Node singleton: id, status, config.
    Node,
    /// Chain head: tx-lookup, current/next block index.
    ChainHead,
    Block(u64),
    Wallet(String),
}

impl StoreKey {
    pub(crate) fn relative_path(&self) -> String {
        match self {
            StoreKey::Node => "node.json".to_string(),
            StoreKey::ChainHead => "blockchain.json".to_string(),
            StoreKey::Block(index) => format!("blocks/{index}.json"),
            StoreKey::Wallet(address) => format!("wallets/{address}.json"),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path())
    }
}
