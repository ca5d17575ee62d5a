//! EduRAG Vector Store
//!
//! Persistence for documents and their embedded chunks, plus
//! nearest-neighbor search over the chunk embeddings. Callers depend on the
//! [`VectorStore`] trait; two backends implement it:
//!
//! - [`PgStore`] — Postgres with the pgvector extension. Chunk writes run in
//!   a transaction, deletes cascade from document to chunks, and similarity
//!   search is pushed into SQL via the `<=>` / `<->` operators.
//! - [`MemoryStore`] — a lock-guarded in-process table set with brute-force
//!   scan, matching pgvector's distance definitions exactly. Used by tests
//!   and offline demo runs.
//!
//! Both backends order equidistant chunks by insertion sequence, so ranking
//! is deterministic across repeated queries.

use async_trait::async_trait;
use uuid::Uuid;

mod error;
mod memory;
mod metric;
mod pg;
mod types;

pub use crate::error::StoreError;
pub use crate::memory::MemoryStore;
pub use crate::metric::{cosine_distance, distance, l2_distance};
pub use crate::pg::{PgStore, PgStoreConfig};
pub use crate::types::{
    ChunkFilter, DistanceMetric, Document, EmbeddedChunk, NewDocument, ScoredChunk, StoreStats,
};

/// Persistence contract for documents and embedded chunks.
///
/// Write operations are atomic per call: either the document and every one
/// of its chunks land, or nothing does. Chunk indices must be contiguous
/// from zero and all embeddings in one call must share a dimension;
/// violations are rejected with [`StoreError::InvalidRecord`] before
/// anything is written.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persists a document and its chunks, returning the new document id.
    async fn insert_document(
        &self,
        doc: NewDocument,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<Uuid, StoreError>;

    /// Replaces a document's fields and, when `chunks` is `Some`, its full
    /// chunk set. Fails with [`StoreError::NotFound`] if the id is unknown.
    async fn update_document(
        &self,
        id: Uuid,
        doc: NewDocument,
        chunks: Option<Vec<EmbeddedChunk>>,
    ) -> Result<(), StoreError>;

    /// Fetches a single document, `None` if absent.
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Lists documents matching `filter`, newest first, paged by
    /// `limit`/`offset`.
    async fn list_documents(
        &self,
        filter: &ChunkFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Document>, StoreError>;

    /// Deletes a document and all of its chunks. Returns whether the
    /// document existed.
    async fn delete_document(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns up to `k` chunks nearest to `query` under `metric`, filtered
    /// by document metadata. `min_similarity` drops chunks whose cosine
    /// similarity (`1 - distance`) falls below the threshold; it is ignored
    /// for the L2 metric, where similarity has no bounded scale. An empty
    /// result is not an error.
    async fn nearest_chunks(
        &self,
        query: &[f32],
        k: usize,
        filter: &ChunkFilter,
        metric: DistanceMetric,
        min_similarity: Option<f32>,
    ) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Aggregate document/chunk counts, broken down by subject and grade.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}

/// Shared pre-write validation for both backends.
///
/// `expected_dims` pins the dimension when the store already holds vectors;
/// `None` lets the first write establish it.
pub(crate) fn validate_chunks(
    chunks: &[EmbeddedChunk],
    expected_dims: Option<usize>,
) -> Result<Option<usize>, StoreError> {
    let mut dims = expected_dims;
    for (pos, chunk) in chunks.iter().enumerate() {
        if chunk.index != pos {
            return Err(StoreError::InvalidRecord(format!(
                "chunk indices must be contiguous from 0: expected {pos}, got {}",
                chunk.index
            )));
        }
        if chunk.embedding.is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "chunk {pos} has an empty embedding"
            )));
        }
        match dims {
            None => dims = Some(chunk.embedding.len()),
            Some(d) if d != chunk.embedding.len() => {
                return Err(StoreError::InvalidRecord(format!(
                    "chunk {pos} has dimension {}, expected {d}",
                    chunk.embedding.len()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            index,
            text: format!("chunk {index}"),
            embedding,
        }
    }

    #[test]
    fn validate_accepts_contiguous_chunks() {
        let chunks = vec![chunk(0, vec![1.0, 0.0]), chunk(1, vec![0.0, 1.0])];
        assert_eq!(validate_chunks(&chunks, None).unwrap(), Some(2));
    }

    #[test]
    fn validate_rejects_gap_in_indices() {
        let chunks = vec![chunk(0, vec![1.0]), chunk(2, vec![1.0])];
        assert!(matches!(
            validate_chunks(&chunks, None),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn validate_rejects_mixed_dimensions() {
        let chunks = vec![chunk(0, vec![1.0, 0.0]), chunk(1, vec![1.0])];
        assert!(matches!(
            validate_chunks(&chunks, None),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn validate_rejects_dimension_drift_across_calls() {
        let chunks = vec![chunk(0, vec![1.0, 0.0, 0.0])];
        assert!(validate_chunks(&chunks, Some(2)).is_err());
        assert_eq!(validate_chunks(&chunks, Some(3)).unwrap(), Some(3));
    }

    #[test]
    fn validate_empty_batch_keeps_existing_dims() {
        assert_eq!(validate_chunks(&[], Some(4)).unwrap(), Some(4));
        assert_eq!(validate_chunks(&[], None).unwrap(), None);
    }
}
