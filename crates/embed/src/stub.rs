//! Deterministic offline embedder.

use async_trait::async_trait;
use fxhash::hash64;

use crate::config::EmbedConfig;
use crate::error::EmbedError;
use crate::normalize::l2_normalize_in_place;
use crate::provider::{truncate_input, Embedder};

/// Deterministic embedder used in tests, benchmarks, and air-gapped runs.
/// Generates sinusoid values derived from a hash of the input text to
/// guarantee reproducible vectors with minimal CPU cost. Identical text
/// always produces an identical vector.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    model_name: String,
    dimensions: usize,
    normalize: bool,
    max_input_chars: usize,
}

impl StubEmbedder {
    pub fn new(cfg: &EmbedConfig) -> Self {
        Self {
            model_name: cfg.model_name.clone(),
            dimensions: cfg.dimensions,
            normalize: cfg.normalize,
            max_input_chars: cfg.max_input_chars,
        }
    }

    /// Convenience constructor for tests that only care about the dimension.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            model_name: "stub".into(),
            dimensions,
            normalize: true,
            max_input_chars: 8000,
        }
    }

    fn make_vector(&self, text: &str) -> Vec<f32> {
        let text = truncate_input(text, self.max_input_chars);
        let mut v = vec![0f32; self.dimensions];
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.make_vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.make_vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
