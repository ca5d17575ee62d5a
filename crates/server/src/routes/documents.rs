//! Document ingestion and management endpoints.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use edurag::{bulk_ingest, ingest_document, update_document, ChunkFilter, NewDocument};

/// Largest accepted bulk batch. Keeps a single request from holding the
/// embedder for minutes.
const MAX_BULK_DOCUMENTS: usize = 100;

/// Create (ingest) a single document.
///
/// `POST /api/v1/documents`
///
/// Chunks and embeds the content, then persists document and chunks in one
/// atomic write. Returns `201` with the new document id and chunk count.
pub async fn create_document(
    State(state): State<Arc<ServerState>>,
    Json(doc): Json<NewDocument>,
) -> ServerResult<impl IntoResponse> {
    let id = ingest_document(
        state.store.as_ref(),
        state.embedder.as_ref(),
        &state.chunking,
        doc,
    )
    .await?;

    let chunk_count = state
        .store
        .get_document(id)
        .await?
        .map(|d| d.chunk_count)
        .unwrap_or(0);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "chunk_count": chunk_count,
        })),
    ))
}

/// Ingest a batch of documents.
///
/// `POST /api/v1/documents/bulk`
///
/// Each document is ingested independently; a failing document is reported
/// in `failed` without aborting the rest.
pub async fn bulk_create_documents(
    State(state): State<Arc<ServerState>>,
    Json(docs): Json<Vec<NewDocument>>,
) -> ServerResult<impl IntoResponse> {
    if docs.is_empty() {
        return Err(ServerError::BadRequest(
            "bulk request must contain at least one document".to_string(),
        ));
    }
    if docs.len() > MAX_BULK_DOCUMENTS {
        return Err(ServerError::BadRequest(format!(
            "bulk request exceeds {MAX_BULK_DOCUMENTS} documents"
        )));
    }

    let report = bulk_ingest(
        state.store.as_ref(),
        state.embedder.as_ref(),
        &state.chunking,
        docs,
    )
    .await;

    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|(position, err)| {
            json!({
                "position": position,
                "error": err.to_string(),
            })
        })
        .collect();

    let status = if report.all_succeeded() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((
        status,
        Json(json!({
            "succeeded": report.succeeded,
            "failed": failed,
            "succeeded_count": report.succeeded.len(),
            "failed_count": failed.len(),
        })),
    ))
}

/// Query parameters for document listing.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}

const MAX_PAGE_SIZE: u64 = 100;

/// List documents, newest first.
///
/// `GET /api/v1/documents?subject=&grade_level=&limit=&offset=`
pub async fn list_documents(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListDocumentsQuery>,
) -> ServerResult<impl IntoResponse> {
    if params.limit == 0 || params.limit > MAX_PAGE_SIZE {
        return Err(ServerError::BadRequest(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let filter = ChunkFilter {
        subject: params.subject,
        grade_level: params.grade_level,
    };
    let documents = state
        .store
        .list_documents(&filter, params.limit, params.offset)
        .await?;

    let count = documents.len();
    Ok(Json(json!({
        "documents": documents,
        "count": count,
    })))
}

/// Fetch a single document by id.
///
/// `GET /api/v1/documents/{id}`
pub async fn get_document(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> ServerResult<impl IntoResponse> {
    match state.store.get_document(id).await? {
        Some(document) => Ok(Json(document)),
        None => Err(ServerError::NotFound),
    }
}

/// Replace a document's fields and content.
///
/// `PUT /api/v1/documents/{id}`
///
/// The new content is re-chunked and re-embedded; the previous chunk set is
/// replaced atomically. Returns 404 for an unknown id.
pub async fn replace_document(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(doc): Json<NewDocument>,
) -> ServerResult<impl IntoResponse> {
    update_document(
        state.store.as_ref(),
        state.embedder.as_ref(),
        &state.chunking,
        id,
        doc,
    )
    .await?;

    let chunk_count = state
        .store
        .get_document(id)
        .await?
        .map(|d| d.chunk_count)
        .unwrap_or(0);

    Ok(Json(json!({
        "id": id,
        "chunk_count": chunk_count,
    })))
}

/// Delete a document and all of its chunks.
///
/// `DELETE /api/v1/documents/{id}`
pub async fn delete_document(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> ServerResult<impl IntoResponse> {
    if state.store.delete_document(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound)
    }
}
