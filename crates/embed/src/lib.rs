//! EduRAG Embedding Layer
//!
//! Turns text into fixed-dimension vectors. The rest of the pipeline talks
//! to the [`Embedder`] trait only, so retrieval logic stays testable with a
//! deterministic offline double.
//!
//! Two providers ship here:
//!
//! - [`OpenAiEmbedder`] speaks the OpenAI `/v1/embeddings` wire format over
//!   a pooled HTTP client, with input truncation, transparent batching, and
//!   retry with exponential backoff on transient failures.
//! - [`StubEmbedder`] derives sinusoid vectors from a hash of the input:
//!   deterministic, instant, and offline. Used by tests, benches, and demo
//!   runs without credentials.
//!
//! ## Example
//!
//! ```
//! use embed::{embedder_from_config, EmbedConfig};
//!
//! # async fn run() -> Result<(), embed::EmbedError> {
//! let cfg = EmbedConfig::default(); // stub provider
//! let embedder = embedder_from_config(&cfg)?;
//! let vector = embedder.embed("photosynthesis in plants").await?;
//! assert_eq!(vector.len(), embedder.dimensions());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

mod config;
mod error;
mod normalize;
mod openai;
mod provider;
mod retry;
mod stub;

pub use crate::config::EmbedConfig;
pub use crate::error::EmbedError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::openai::OpenAiEmbedder;
pub use crate::provider::{truncate_input, Embedder};
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

/// Builds the provider selected by `cfg.provider`.
///
/// Validates the config first so misconfiguration surfaces at start-up
/// rather than on the first request.
pub fn embedder_from_config(cfg: &EmbedConfig) -> Result<Arc<dyn Embedder>, EmbedError> {
    cfg.validate()?;
    match cfg.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(cfg)?)),
        "stub" => Ok(Arc::new(StubEmbedder::new(cfg))),
        other => Err(EmbedError::InvalidConfig(format!(
            "unknown provider \"{other}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_stub_by_default() {
        let embedder = embedder_from_config(&EmbedConfig::default()).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
    }

    #[test]
    fn factory_builds_openai_with_key() {
        let cfg = EmbedConfig {
            provider: "openai".into(),
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let embedder = embedder_from_config(&cfg).unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }

    #[test]
    fn factory_rejects_invalid_config() {
        let cfg = EmbedConfig {
            provider: "openai".into(),
            api_key: None,
            ..Default::default()
        };
        assert!(embedder_from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn stub_from_factory_is_deterministic() {
        let cfg = EmbedConfig {
            dimensions: 64,
            ..Default::default()
        };
        let a = embedder_from_config(&cfg).unwrap();
        let b = embedder_from_config(&cfg).unwrap();
        assert_eq!(
            a.embed("geometry basics").await.unwrap(),
            b.embed("geometry basics").await.unwrap()
        );
    }
}
