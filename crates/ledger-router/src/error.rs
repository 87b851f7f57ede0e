use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),
}
