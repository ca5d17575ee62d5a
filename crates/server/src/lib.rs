//! EduRAG Server - HTTP REST API for curriculum document retrieval
//!
//! This crate provides an HTTP server that exposes the EduRAG pipeline via
//! a REST API. It supports:
//!
//! - **Document Ingestion**: Single and bulk document ingestion with
//!   chunking and embedding
//! - **Document Management**: Fetch, list, update, and delete documents
//! - **Retrieval**: Top-K nearest-chunk search with subject/grade filters
//! - **Health & Stats**: Liveness/readiness probes and store statistics
//!
//! # Features
//!
//! - **Authentication**: API key-based authentication with rate limiting
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration,
//!   plus a YAML pipeline config for chunking/embedding/store settings
//! - **Error Handling**: Error responses with stable error codes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (checks the store)
//!
//! ## Protected Endpoints (API Key Required)
//!
//! - `POST /api/v1/documents` - Ingest single document
//! - `POST /api/v1/documents/bulk` - Bulk ingest documents
//! - `GET /api/v1/documents` - List documents (subject/grade filters)
//! - `GET /api/v1/documents/{id}` - Get document by ID
//! - `PUT /api/v1/documents/{id}` - Replace document (re-chunk, re-embed)
//! - `DELETE /api/v1/documents/{id}` - Delete document and its chunks
//! - `POST /api/v1/retrieve` - Retrieve nearest chunks for a query
//! - `GET /api/v1/stats` - Store statistics
//! - `GET /api/v1/metadata` - Server metadata

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
