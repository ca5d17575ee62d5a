//! Workspace umbrella crate for EduRAG.
//!
//! This crate stitches together chunking, embedding, and storage so callers
//! can ingest curriculum documents and run retrieval with a single API
//! entry point.

pub use chunker::{chunk, chunk_count, normalize_text, ChunkConfig, ChunkError, ChunkPiece};
pub use embed::{
    embedder_from_config, l2_normalize_in_place, EmbedConfig, EmbedError, Embedder,
    OpenAiEmbedder, RetryConfig, StubEmbedder,
};
pub use retrieval::{RetrievalConfig, RetrievalError, RetrievalRequest, RetrievedChunk, Retriever};
pub use store::{
    ChunkFilter, DistanceMetric, Document, EmbeddedChunk, MemoryStore, NewDocument, PgStore,
    PgStoreConfig, ScoredChunk, StoreError, StoreStats, VectorStore,
};

pub mod config;

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Errors that can occur while processing a document through the pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// Document content is empty after trimming; there is nothing to chunk.
    EmptyDocument,
    Chunk(ChunkError),
    Embed(EmbedError),
    Store(StoreError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyDocument => write!(f, "document content is empty"),
            PipelineError::Chunk(err) => write!(f, "chunking failure: {err}"),
            PipelineError::Embed(err) => write!(f, "embedding failure: {err}"),
            PipelineError::Store(err) => write!(f, "store failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::EmptyDocument => None,
            PipelineError::Chunk(err) => Some(err),
            PipelineError::Embed(err) => Some(err),
            PipelineError::Store(err) => Some(err),
        }
    }
}

impl From<ChunkError> for PipelineError {
    fn from(value: ChunkError) -> Self {
        PipelineError::Chunk(value)
    }
}

impl From<EmbedError> for PipelineError {
    fn from(value: EmbedError) -> Self {
        PipelineError::Embed(value)
    }
}

impl From<StoreError> for PipelineError {
    fn from(value: StoreError) -> Self {
        PipelineError::Store(value)
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_chunking(&self, latency: Duration, chunks: usize);
    fn record_embedding(&self, latency: Duration, vectors: usize);
    fn record_store_write(&self, latency: Duration, success: bool);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Chunk and embed a document's content without persisting it.
///
/// The building block shared by ingest and update: same chunking, same
/// embedding batch path, so stored vectors are identical either way.
pub async fn embed_chunks(
    embedder: &dyn Embedder,
    chunking: &ChunkConfig,
    content: &str,
) -> Result<Vec<EmbeddedChunk>, PipelineError> {
    if content.trim().is_empty() {
        return Err(PipelineError::EmptyDocument);
    }

    let start = Instant::now();
    let pieces: Vec<String> = chunk(content, chunking)?
        .map(|piece| piece.to_owned_text())
        .collect();
    if let Some(recorder) = metrics_recorder() {
        recorder.record_chunking(start.elapsed(), pieces.len());
    }

    let start = Instant::now();
    let vectors = embedder.embed_batch(&pieces).await?;
    if let Some(recorder) = metrics_recorder() {
        recorder.record_embedding(start.elapsed(), vectors.len());
    }

    Ok(pieces
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(index, (text, embedding))| EmbeddedChunk {
            index,
            text,
            embedding,
        })
        .collect())
}

/// Ingest a document end-to-end: chunk, embed, persist. Returns the new
/// document id. The store write is all-or-nothing.
pub async fn ingest_document(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunking: &ChunkConfig,
    doc: NewDocument,
) -> Result<Uuid, PipelineError> {
    let chunks = embed_chunks(embedder, chunking, &doc.content).await?;

    let start = Instant::now();
    let result = store.insert_document(doc, chunks).await;
    if let Some(recorder) = metrics_recorder() {
        recorder.record_store_write(start.elapsed(), result.is_ok());
    }
    let id = result?;
    tracing::info!(document_id = %id, "ingest_success");
    Ok(id)
}

/// Per-document outcome of a bulk ingest.
#[derive(Debug)]
pub struct BulkIngestReport {
    /// Ids of successfully ingested documents, in input order.
    pub succeeded: Vec<Uuid>,
    /// Input positions that failed, with their errors.
    pub failed: Vec<(usize, PipelineError)>,
}

impl BulkIngestReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ingest a batch of documents, continuing past individual failures.
///
/// Each document is its own atomic write; one malformed document never
/// blocks the rest of the batch.
pub async fn bulk_ingest(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunking: &ChunkConfig,
    docs: Vec<NewDocument>,
) -> BulkIngestReport {
    let total = docs.len();
    let mut report = BulkIngestReport {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (position, doc) in docs.into_iter().enumerate() {
        match ingest_document(store, embedder, chunking, doc).await {
            Ok(id) => report.succeeded.push(id),
            Err(err) => {
                tracing::warn!(position, error = %err, "ingest_failure");
                report.failed.push((position, err));
            }
        }
    }
    tracing::info!(
        total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "bulk_ingest_complete"
    );
    report
}

/// Replace a document's fields and content, re-chunking and re-embedding
/// the new content. Fails with [`StoreError::NotFound`] when the id is
/// unknown.
pub async fn update_document(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunking: &ChunkConfig,
    id: Uuid,
    doc: NewDocument,
) -> Result<(), PipelineError> {
    let chunks = embed_chunks(embedder, chunking, &doc.content).await?;

    let start = Instant::now();
    let result = store.update_document(id, doc, Some(chunks)).await;
    if let Some(recorder) = metrics_recorder() {
        recorder.record_store_write(start.elapsed(), result.is_ok());
    }
    result?;
    tracing::info!(document_id = %id, "update_success");
    Ok(())
}
