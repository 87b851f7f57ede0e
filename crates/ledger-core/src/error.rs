use thiserror::Error;

/// Error kinds surfaced at the core boundary. Each variant maps to exactly
/// one of the error kinds named in the design: `InvalidInput`,
/// `InsufficientFunds`, `NotFound`, `Corrupt`, `AuthFailure`,
/// `AlreadyInitialised`, `UnknownAction`, `Transient`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── InvalidInput ─────────────────────────────────────────────────────────
    #[error("nil wallet argument")]
    NilWallet,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("passphrase does not satisfy the strength rule")]
    WeakPassphrase,

    #[error("amount must not be negative: {0}")]
    NegativeAmount(f64),

    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("fee {fee} below minimum {min}")]
    FeeTooLow { fee: f64, min: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── InsufficientFunds ────────────────────────────────────────────────────
    #[error("insufficient funds: balance {balance} < amount {amount} + fee {fee}")]
    InsufficientFunds { balance: f64, amount: f64, fee: f64 },

    // ── NotFound ─────────────────────────────────────────────────────────────
    #[error("not found: {0}")]
    NotFound(String),

    // ── Corrupt ──────────────────────────────────────────────────────────────
    #[error("corrupt entry: {0}")]
    Corrupt(String),

    // ── AuthFailure ──────────────────────────────────────────────────────────
    #[error("bad passphrase")]
    BadPassphrase,

    #[error("bad signature")]
    BadSignature,

    #[error("unknown bearer token")]
    UnknownBearerToken,

    #[error("wallet is locked")]
    WalletLocked,

    // ── AlreadyInitialised ───────────────────────────────────────────────────
    #[error("singleton already initialised")]
    AlreadyInitialised,

    // ── UnknownAction ────────────────────────────────────────────────────────
    #[error("unknown peer action: {0}")]
    UnknownAction(String),

    // ── Transient ────────────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("nonce exhausted while mining")]
    NonceExhausted,

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::NotFound(e.to_string())
        } else {
            CoreError::Io(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Corrupt(e.to_string())
    }
}
