use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node is already initialised in this process")]
    AlreadyInitialised,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("store error: {0}")]
    Store(#[from] ledger_store::StoreError),

    #[error("chain error: {0}")]
    Chain(#[from] ledger_chain::ChainError),

    #[error("genesis error: {0}")]
    Genesis(#[from] ledger_genesis::GenesisError),

    #[error("wallet error: {0}")]
    Wallet(#[from] ledger_wallet::WalletError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
