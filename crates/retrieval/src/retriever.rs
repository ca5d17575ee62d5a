use std::sync::Arc;
use std::time::Instant;

use embed::Embedder;
use store::{DistanceMetric, VectorStore};

use crate::types::{RetrievalConfig, RetrievalError, RetrievalRequest, RetrievedChunk};

/// Retriever: embeds a query and ranks stored chunks against it.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        config.validate()?;
        Ok(Self {
            store,
            embedder,
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Run a single retrieval request and return ranked chunks.
    ///
    /// A query that matches nothing yields an empty list, not an error.
    pub async fn retrieve(
        &self,
        req: &RetrievalRequest,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if req.query.trim().is_empty() {
            return Err(RetrievalError::InvalidRequest(
                "query must not be empty".into(),
            ));
        }
        let k = req.top_k.unwrap_or(self.config.top_k);
        if k == 0 {
            return Err(RetrievalError::InvalidRequest(
                "top_k must be greater than zero".into(),
            ));
        }
        let min_similarity = req.min_similarity.or(self.config.min_similarity);
        if let Some(threshold) = min_similarity {
            if !(-1.0..=1.0).contains(&threshold) {
                return Err(RetrievalError::InvalidRequest(
                    "min_similarity must be between -1.0 and 1.0".into(),
                ));
            }
        }

        let start = Instant::now();
        let query_vector = self.embedder.embed(&req.query).await?;
        let hits = self
            .store
            .nearest_chunks(&query_vector, k, &req.filter, self.config.metric, min_similarity)
            .await?;

        let metric = self.config.metric;
        let chunks: Vec<RetrievedChunk> = hits
            .into_iter()
            .enumerate()
            .map(|(pos, hit)| RetrievedChunk {
                rank: pos + 1,
                document_id: hit.document_id,
                chunk_index: hit.chunk_index,
                text: hit.text,
                subject: hit.subject,
                grade_level: hit.grade_level,
                distance: hit.distance,
                similarity: (metric == DistanceMetric::Cosine).then(|| 1.0 - hit.distance),
            })
            .collect();

        tracing::debug!(
            query_chars = req.query.chars().count(),
            top_k = k,
            hits = chunks.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "retrieval_complete"
        );
        Ok(chunks)
    }
}
