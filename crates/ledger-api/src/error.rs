use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the admin HTTP surface. Maps onto the same error
/// kinds the rest of the node uses (`AuthFailure`, `NotFound`), plus a
/// catch-all for routes the spec only requires as stubs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown bearer token")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not implemented")]
    NotImplemented,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::NotImplemented => (StatusCode::NOT_IMPLEMENTED, self.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
