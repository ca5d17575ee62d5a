//! Retrieval endpoint.

use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use edurag::RetrievalRequest;

/// Retrieve the chunks nearest to a query.
///
/// `POST /api/v1/retrieve`
///
/// Request body is a [`RetrievalRequest`]: a query string plus optional
/// `top_k`, `filter` (subject / grade_level), and `min_similarity`
/// overrides. A query that matches nothing returns an empty `results`
/// array with status 200.
pub async fn retrieve_chunks(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RetrievalRequest>,
) -> ServerResult<impl IntoResponse> {
    let results = state.retriever.retrieve(&request).await?;

    let count = results.len();
    Ok(Json(json!({
        "query": request.query,
        "results": results,
        "count": count,
    })))
}
