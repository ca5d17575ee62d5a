use crate::error::ServerResult;
use crate::state::{ServerMetadata, ServerState};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "edurag-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}

/// Readiness check endpoint
///
/// Runs a cheap store query so a broken database connection flips the
/// probe to 503 instead of reporting ready.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let store_status = match state.store.stats().await {
        Ok(_) => "ready",
        Err(err) => {
            tracing::warn!(error = %err, "readiness_store_check_failed");
            "unavailable"
        }
    };

    let (status, code) = if store_status == "ready" {
        ("ready", axum::http::StatusCode::OK)
    } else {
        ("not_ready", axum::http::StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": "edurag-server",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_seconds": uptime,
            "components": {
                "api": "ready",
                "store": store_status,
            }
        })),
    )
}

/// Server metadata endpoint (authenticated)
pub async fn server_metadata(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let metadata = ServerMetadata {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        embedding_model: state.embedder.model_name().to_string(),
        embedding_dimensions: state.embedder.dimensions(),
    };

    Ok(Json(serde_json::to_value(metadata)?))
}
