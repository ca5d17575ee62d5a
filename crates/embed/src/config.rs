//! Configuration for embedding providers.

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;
use crate::retry::RetryConfig;

/// Runtime configuration describing which embedding provider to use and how
/// to shape its inputs and outputs.
///
/// # Example
/// ```no_run
/// use embed::EmbedConfig;
///
/// let cfg = EmbedConfig {
///     provider: "openai".into(),
///     api_key: Some("sk-...".into()),
///     ..Default::default()
/// };
///
/// let _ = embed::embedder_from_config(&cfg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedConfig {
    /// Provider selector: `"openai"` (remote HTTP, OpenAI-compatible) or
    /// `"stub"` (deterministic offline vectors).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent to the remote provider and surfaced for
    /// observability.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Base URL for the remote provider. `/v1/embeddings` is appended when
    /// the URL does not already carry a version or endpoint suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the remote provider. Required in `"openai"` mode.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Expected vector dimension. Provider responses with a different
    /// dimension are rejected.
    ///
    /// Default: `1536`
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Normalize vectors to unit length (recommended for cosine similarity).
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Overall request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Inputs longer than this many characters are truncated before being
    /// sent to the provider.
    ///
    /// Default: `8000`
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Maximum number of inputs per provider request; larger batches are
    /// split transparently.
    ///
    /// Default: `100`
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retry policy for transient provider failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_provider() -> String {
    "stub".into()
}

fn default_model_name() -> String {
    "text-embedding-3-small".into()
}

fn default_api_url() -> String {
    "https://api.openai.com".into()
}

fn default_dimensions() -> usize {
    1536
}

fn default_normalize() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_input_chars() -> usize {
    8000
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_name: default_model_name(),
            api_url: default_api_url(),
            api_key: None,
            dimensions: default_dimensions(),
            normalize: default_normalize(),
            timeout_secs: default_timeout_secs(),
            max_input_chars: default_max_input_chars(),
            batch_size: default_batch_size(),
            retry: RetryConfig::default(),
        }
    }
}

impl EmbedConfig {
    /// Checks internal consistency. Run at start-up, before any request.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.dimensions == 0 {
            return Err(EmbedError::InvalidConfig(
                "dimensions must be greater than zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        if self.max_input_chars == 0 {
            return Err(EmbedError::InvalidConfig(
                "max_input_chars must be greater than zero".into(),
            ));
        }
        match self.provider.as_str() {
            "stub" => Ok(()),
            "openai" => {
                if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                    return Err(EmbedError::InvalidConfig(
                        "api_key is required for the openai provider".into(),
                    ));
                }
                Ok(())
            }
            other => Err(EmbedError::InvalidConfig(format!(
                "unknown provider \"{other}\" (expected \"openai\" or \"stub\")"
            ))),
        }
    }
}
