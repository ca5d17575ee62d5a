//! OpenAI-compatible HTTP embedding provider.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::EmbedConfig;
use crate::error::EmbedError;
use crate::normalize::l2_normalize_in_place;
use crate::provider::{truncate_input, Embedder};
use crate::retry::{execute_with_retry, RetryConfig};

// Global HTTP client with connection pooling. The per-request timeout from
// the config is applied on top via RequestBuilder::timeout.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .unwrap_or_default()
});

/// Remote embedder speaking the OpenAI `/v1/embeddings` wire format.
pub struct OpenAiEmbedder {
    endpoint: String,
    api_key: String,
    model_name: String,
    dimensions: usize,
    normalize: bool,
    timeout: Duration,
    max_input_chars: usize,
    batch_size: usize,
    retry: RetryConfig,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Resolves the embeddings endpoint from a base URL, tolerating bases that
/// already carry a version segment or the full endpoint path.
fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized.to_string();
    }
    if has_version_suffix(normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

impl OpenAiEmbedder {
    /// Builds the provider from config. Fails fast on missing credentials.
    pub fn new(cfg: &EmbedConfig) -> Result<Self, EmbedError> {
        let api_key = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                EmbedError::InvalidConfig("api_key is required for the openai provider".into())
            })?;
        Ok(Self {
            endpoint: embeddings_endpoint(&cfg.api_url),
            api_key: api_key.to_string(),
            model_name: cfg.model_name.clone(),
            dimensions: cfg.dimensions,
            normalize: cfg.normalize,
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_input_chars: cfg.max_input_chars,
            batch_size: cfg.batch_size.max(1),
            retry: cfg.retry,
        })
    }

    async fn request_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let response = HTTP_CLIENT
            .post(&self.endpoint)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model_name,
                input: inputs,
            })
            .send()
            .await
            .map_err(|e| EmbedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::MalformedResponse(e.to_string()))?;

        if parsed.data.len() != inputs.len() {
            return Err(EmbedError::MalformedResponse(format!(
                "provider returned {} embeddings for {} inputs",
                parsed.data.len(),
                inputs.len()
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for item in parsed.data {
            let mut vector = item.embedding;
            if vector.len() != self.dimensions {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
            if self.normalize {
                l2_normalize_in_place(&mut vector);
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::MalformedResponse("empty embedding response".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<String> = texts
            .iter()
            .map(|t| truncate_input(t, self.max_input_chars).into_owned())
            .collect();

        let mut vectors = Vec::with_capacity(inputs.len());
        for window in inputs.chunks(self.batch_size) {
            let batch = execute_with_retry(&self.retry, |attempt| {
                if attempt > 0 {
                    tracing::debug!(attempt, endpoint = %self.endpoint, "embed_retry_attempt");
                }
                self.request_batch(window)
            })
            .await?;
            vectors.extend(batch);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_host_base_uses_v1_embeddings() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_from_v1_base_appends_embeddings_once() {
        assert_eq!(
            embeddings_endpoint("https://proxy.example.com/v1"),
            "https://proxy.example.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_from_custom_version_suffix_keeps_version() {
        assert_eq!(
            embeddings_endpoint("https://open.bigmodel.cn/api/paas/v4"),
            "https://open.bigmodel.cn/api/paas/v4/embeddings"
        );
    }

    #[test]
    fn endpoint_preserves_explicit_embeddings_url() {
        assert_eq!(
            embeddings_endpoint("https://api.example.com/v1/embeddings"),
            "https://api.example.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn new_rejects_missing_api_key() {
        let cfg = EmbedConfig {
            provider: "openai".into(),
            api_key: None,
            ..Default::default()
        };
        assert!(matches!(
            OpenAiEmbedder::new(&cfg),
            Err(EmbedError::InvalidConfig(_))
        ));
    }

    #[test]
    fn new_trims_api_key() {
        let cfg = EmbedConfig {
            provider: "openai".into(),
            api_key: Some("  sk-test  ".into()),
            ..Default::default()
        };
        let embedder = OpenAiEmbedder::new(&cfg).unwrap();
        assert_eq!(embedder.api_key, "sk-test");
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }

    #[tokio::test]
    async fn embed_batch_empty_input_short_circuits() {
        let cfg = EmbedConfig {
            provider: "openai".into(),
            api_key: Some("sk-test".into()),
            // Unroutable endpoint: the test passes only if no request is made.
            api_url: "http://127.0.0.1:1/v1".into(),
            ..Default::default()
        };
        let embedder = OpenAiEmbedder::new(&cfg).unwrap();
        let out = embedder.embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }
}
