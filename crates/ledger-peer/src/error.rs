use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Error kinds surfaced at the peer-layer boundary. Mirrors the grouping in
/// `ledger_core::CoreError` rather than inventing a new taxonomy.
#[derive(Debug, Error)]
pub enum PeerError {
    // ── InvalidInput ─────────────────────────────────────────────────────
    #[error("node argument is nil")]
    NilNode,

    #[error("node already registered: {0}")]
    AlreadyRegistered(String),

    // ── NotFound ─────────────────────────────────────────────────────────
    #[error("node not registered: {0}")]
    NodeNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    // ── AuthFailure ──────────────────────────────────────────────────────
    #[error("signature verification failed")]
    BadSignature,

    // ── UnknownAction ────────────────────────────────────────────────────
    #[error("unknown peer action: {0}")]
    UnknownAction(String),

    // ── Transient ────────────────────────────────────────────────────────
    #[error("peer transport error: {0}")]
    Transport(String),

    #[error("malformed peer message: {0}")]
    Malformed(String),
}

impl IntoResponse for PeerError {
    fn into_response(self) -> Response {
        let status = match &self {
            PeerError::NilNode | PeerError::AlreadyRegistered(_) | PeerError::Malformed(_) => StatusCode::BAD_REQUEST,
            PeerError::NodeNotFound(_) | PeerError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            PeerError::BadSignature => StatusCode::UNAUTHORIZED,
            PeerError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            PeerError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
