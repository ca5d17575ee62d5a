//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the EduRAG
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and server metadata
//! - `documents`: Document ingestion and management (CRUD, bulk)
//! - `retrieve`: Top-K chunk retrieval for a query
//! - `stats`: Store-wide document/chunk statistics

pub mod documents;
pub mod health;
pub mod retrieve;
pub mod stats;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "EduRAG Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/documents",
            "/api/v1/documents/bulk",
            "/api/v1/documents/{id}",
            "/api/v1/retrieve",
            "/api/v1/stats",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
