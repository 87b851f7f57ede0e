use std::sync::Arc;

use ledger_chain::ChainEngine;

use crate::auth::BearerTokens;

/// Shared handle threaded into every route via axum's `State` extractor.
#[derive(Clone)]
pub struct ApiState {
    pub chain: Arc<ChainEngine>,
    pub tokens: Arc<BearerTokens>,
}

impl ApiState {
    pub fn new(chain: Arc<ChainEngine>, tokens: BearerTokens) -> Self {
        Self { chain, tokens: Arc::new(tokens) }
    }
}
