use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("passphrase does not satisfy the strength rule")]
    WeakPassphrase,

    #[error("wallet is already unlocked")]
    AlreadyUnlocked,

    #[error("wallet is locked")]
    Locked,

    #[error("bad passphrase")]
    BadPassphrase,

    #[error("insufficient funds: balance {balance} < amount {amount} + fee {fee}")]
    InsufficientFunds { balance: f64, amount: f64, fee: f64 },

    #[error("key codec error: {0}")]
    KeyCodec(#[from] ledger_crypto::KeyPairError),

    #[error("store error: {0}")]
    Store(#[from] ledger_store::StoreError),

    #[error("corrupt vault: {0}")]
    CorruptVault(String),
}

impl From<ledger_crypto::VaultError> for WalletError {
    fn from(e: ledger_crypto::VaultError) -> Self {
        match e {
            ledger_crypto::VaultError::BadPassphrase => WalletError::BadPassphrase,
            other => WalletError::CorruptVault(other.to_string()),
        }
    }
}
