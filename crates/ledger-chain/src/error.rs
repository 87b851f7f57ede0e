use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("genesis error: {0}")]
    Genesis(#[from] ledger_genesis::GenesisError),

    #[error("store error: {0}")]
    Store(#[from] ledger_store::StoreError),

    #[error("chain validation failed: {0}")]
    InvalidChain(String),

    #[error("mining exhausted max nonce before meeting current difficulty")]
    MiningExhausted,
}
