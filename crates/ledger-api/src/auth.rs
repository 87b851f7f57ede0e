use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::ApiState;

/// `email -> hex-key` map backing the bearer scheme in spec §6. Kept as a
/// plain map rather than a database — the admin surface has no concept of
/// user accounts beyond "does this key appear in the map".
#[derive(Clone, Default)]
pub struct BearerTokens {
    by_key: HashMap<String, String>,
}

impl BearerTokens {
    pub fn new(emails_to_keys: HashMap<String, String>) -> Self {
        let by_key = emails_to_keys.into_iter().map(|(email, key)| (key, email)).collect();
        Self { by_key }
    }

    pub fn email_for(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(|s| s.as_str())
    }
}

pub async fn require_bearer(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let key = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
    if state.tokens.email_for(key).is_none() {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}
