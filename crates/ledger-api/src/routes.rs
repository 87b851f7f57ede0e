use axum::extract::{Path, Query, State};
use axum::response::Json;
use ledger_core::constants::{BUILD_VERSION, PROTOCOL_VERSION};
use ledger_core::LookupQuery;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::ApiState;

pub async fn version() -> Json<Value> {
    Json(json!({ "version": BUILD_VERSION, "protocol_version": PROTOCOL_VERSION }))
}

pub async fn health() -> &'static str {
    "OK"
}

#[derive(Serialize)]
pub struct InfoResponse {
    height: u64,
    tip_hash: String,
    difficulty: u8,
}

pub async fn info(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        height: state.chain.height(),
        tip_hash: state.chain.tip_hash(),
        difficulty: state.chain.difficulty(),
    })
}

#[derive(Serialize)]
pub struct BlockchainSummary {
    num_blocks: usize,
    num_transactions_in_queue: usize,
}

pub async fn blockchain(State(state): State<ApiState>) -> Json<BlockchainSummary> {
    Json(BlockchainSummary { num_blocks: state.chain.blocks_len(), num_transactions_in_queue: state.chain.pending_len() })
}

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

pub async fn blocks(State(state): State<ApiState>, Query(q): Query<PageQuery>) -> Json<Value> {
    let page = q.page.unwrap_or(1);
    let limit = q.limit.unwrap_or(10);
    let blocks = state.chain.blocks_page(page, limit);
    Json(json!({ "page": page, "limit": limit, "blocks": blocks }))
}

pub async fn block_by_index(State(state): State<ApiState>, Path(index): Path<u64>) -> Result<Json<Value>, ApiError> {
    let block = state.chain.block_at(index).ok_or_else(|| ApiError::NotFound(format!("block {index}")))?;
    Ok(Json(json!(block)))
}

pub async fn block_transactions(State(state): State<ApiState>, Path(index): Path<u64>) -> Result<Json<Value>, ApiError> {
    let block = state.chain.block_at(index).ok_or_else(|| ApiError::NotFound(format!("block {index}")))?;
    Ok(Json(json!(block.transactions)))
}

pub async fn block_transaction_by_id(
    State(state): State<ApiState>,
    Path((index, id)): Path<(u64, String)>,
) -> Result<Json<Value>, ApiError> {
    let block = state.chain.block_at(index).ok_or_else(|| ApiError::NotFound(format!("block {index}")))?;
    let tx = block
        .transactions
        .iter()
        .find(|tx| tx.id == id || tx.protocol() == id)
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id} in block {index}")))?;
    Ok(Json(json!(tx)))
}

pub async fn tx_lookup_by_id(State(state): State<ApiState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let entry = state
        .chain
        .find_tx_lookup(LookupQuery::TxId(&id))
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id}")))?;
    Ok(Json(json!(entry)))
}

/// Wallet CRUD is named in spec §6 as "stubs acceptable" — the node has no
/// wallet registry reachable from the admin surface, only the chain engine.
pub async fn wallets_stub() -> Result<Json<Value>, ApiError> {
    Err(ApiError::NotImplemented)
}

/// Peer channels are fully served by ledger-peer's own HTTP transport; this
/// admin route exists only because spec §6 lists it, and is explicitly a
/// stub per that section's own wording.
pub async fn consensus_stub() -> Result<Json<Value>, ApiError> {
    Err(ApiError::NotImplemented)
}
