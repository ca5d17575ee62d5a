//! Store statistics endpoint.

use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Aggregate document and chunk counts, broken down by subject and grade.
///
/// `GET /api/v1/stats`
pub async fn store_stats(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let stats = state.store.stats().await?;
    Ok(Json(stats))
}
