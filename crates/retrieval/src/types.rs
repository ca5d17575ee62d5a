use embed::EmbedError;
use serde::{Deserialize, Serialize};
use store::{ChunkFilter, DistanceMetric, StoreError};
use thiserror::Error;
use uuid::Uuid;

/// Configuration for the retrieval layer.
///
/// `RetrievalConfig` is cheap to clone and serde-friendly so it can sit
/// inside higher-level configs or be overridden per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of chunks to return when the request does not say otherwise.
    #[serde(default = "RetrievalConfig::default_top_k")]
    pub top_k: usize,
    /// Distance metric for nearest-neighbor search.
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Minimum cosine similarity a chunk must reach to be returned. Ignored
    /// under the L2 metric. `None` disables the cutoff.
    #[serde(default = "RetrievalConfig::default_min_similarity")]
    pub min_similarity: Option<f32>,
}

impl RetrievalConfig {
    pub(crate) fn default_top_k() -> usize {
        5
    }

    pub(crate) fn default_min_similarity() -> Option<f32> {
        Some(0.7)
    }

    /// Validate the configuration before it is used.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.top_k == 0 {
            return Err(RetrievalError::InvalidRequest(
                "top_k must be greater than zero".into(),
            ));
        }
        if let Some(threshold) = self.min_similarity {
            if !(-1.0..=1.0).contains(&threshold) {
                return Err(RetrievalError::InvalidRequest(
                    "min_similarity must be between -1.0 and 1.0".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            metric: DistanceMetric::default(),
            min_similarity: Self::default_min_similarity(),
        }
    }
}

/// A single retrieval request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalRequest {
    /// Free-text query; embedded before the store search.
    pub query: String,
    /// Override for the configured `top_k`.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Metadata restriction (subject, grade level).
    #[serde(default)]
    pub filter: ChunkFilter,
    /// Override for the configured similarity cutoff.
    #[serde(default)]
    pub min_similarity: Option<f32>,
}

impl RetrievalRequest {
    /// A request with just a query string and the configured defaults.
    pub fn query(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            top_k: None,
            filter: ChunkFilter::default(),
            min_similarity: None,
        }
    }
}

/// A ranked chunk returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// 1-based position in the result list.
    pub rank: usize,
    pub document_id: Uuid,
    pub chunk_index: usize,
    pub text: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    /// Distance under the configured metric (smaller is nearer).
    pub distance: f64,
    /// Cosine similarity (`1 - distance`); absent under L2.
    pub similarity: Option<f64>,
}

/// Errors produced by the retrieval layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetrievalError {
    /// Malformed request (empty query, zero `top_k`).
    #[error("invalid retrieval request: {0}")]
    InvalidRequest(String),
    /// Query embedding failed.
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    /// Store search failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
