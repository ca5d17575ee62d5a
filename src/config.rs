//! YAML Configuration File Support for EduRAG
//!
//! Loads the full pipeline configuration (chunking, embedding, retrieval,
//! store backend) from a single YAML file at runtime.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # EduRAG Pipeline Configuration
//! version: "1.0"
//!
//! chunker:
//!   chunk_size: 1000
//!   overlap: 200
//!
//! embed:
//!   provider: "openai"
//!   model_name: "text-embedding-3-small"
//!   dimensions: 1536
//!   normalize: true
//!
//! retrieval:
//!   top_k: 5
//!   metric: "cosine"
//!   min_similarity: 0.7
//!
//! store:
//!   backend: "postgres"
//!   postgres:
//!     database_url: "postgres://localhost/edurag"
//!     max_connections: 5
//!     dimensions: 1536
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chunker::ChunkConfig;
use embed::EmbedConfig;
use retrieval::RetrievalConfig;
use store::PgStoreConfig;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Which store backend the pipeline talks to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; data does not survive a restart.
    Memory,
    /// Postgres with the pgvector extension.
    #[default]
    Postgres,
}

/// Store section of the pipeline config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Connection settings, used when `backend` is `postgres`.
    #[serde(default)]
    pub postgres: PgStoreConfig,
}

/// Top-level YAML configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EduRagConfig {
    /// Configuration schema version; only "1.0" is accepted.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub chunker: ChunkConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub store: StoreSection,
}

fn default_version() -> String {
    "1.0".into()
}

impl Default for EduRagConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            chunker: ChunkConfig::default(),
            embed: EmbedConfig::default(),
            retrieval: RetrievalConfig::default(),
            store: StoreSection::default(),
        }
    }
}

impl EduRagConfig {
    /// Parse a configuration from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Cross-section validation. Each section also validates itself; this
    /// adds the checks that span sections.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version != "1.0" {
            return Err(ConfigLoadError::UnsupportedVersion(self.version.clone()));
        }
        self.chunker
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.embed
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.retrieval
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        if self.store.backend == StoreBackend::Postgres
            && self.embed.dimensions != self.store.postgres.dimensions
        {
            return Err(ConfigLoadError::Validation(format!(
                "embed.dimensions ({}) must match store.postgres.dimensions ({})",
                self.embed.dimensions, self.store.postgres.dimensions
            )));
        }
        Ok(())
    }
}
