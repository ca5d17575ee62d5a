use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by vector store backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Underlying database failure (connection, query, transaction). Writes
    /// in flight when this fires are rolled back by the backend.
    #[error("store database failure: {0}")]
    Database(#[from] sqlx::Error),

    /// The record being written is inconsistent with the store (wrong
    /// embedding dimension, non-contiguous chunk indices).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The referenced document does not exist. Only raised by operations
    /// that require the document (updates); reads return `Option`/`bool`.
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// Backend-internal failure outside the database driver (poisoned lock,
    /// state corruption).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}
