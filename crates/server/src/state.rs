use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use dashmap::DashMap;
use std::sync::Arc;

use edurag::config::{EduRagConfig, StoreBackend};
use edurag::{
    embedder_from_config, ChunkConfig, Embedder, MemoryStore, PgStore, RetrievalConfig, Retriever,
    VectorStore,
};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Chunking parameters applied to ingested content
    pub chunking: ChunkConfig,

    /// Vector store (shared across requests)
    pub store: Arc<dyn VectorStore>,

    /// Embedding provider (shared across requests)
    pub embedder: Arc<dyn Embedder>,

    /// Retriever wired to the same store and embedder
    pub retriever: Arc<Retriever>,
}

impl ServerState {
    /// Create server state, building the store backend and embedder from
    /// the pipeline configuration.
    pub async fn new(config: ServerConfig, pipeline: EduRagConfig) -> ServerResult<Self> {
        pipeline
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let embedder = embedder_from_config(&pipeline.embed)?;
        let store: Arc<dyn VectorStore> = match pipeline.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Postgres => Arc::new(PgStore::connect(&pipeline.store.postgres).await?),
        };

        Self::with_components(
            config,
            pipeline.chunker,
            pipeline.retrieval,
            store,
            embedder,
        )
    }

    /// Assemble state from already-built components. Used by tests to plug
    /// in an in-memory store and the stub embedder.
    pub fn with_components(
        config: ServerConfig,
        chunking: ChunkConfig,
        retrieval: RetrievalConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> ServerResult<Self> {
        let retriever = Arc::new(Retriever::new(store.clone(), embedder.clone(), retrieval)?);
        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            chunking,
            store,
            embedder,
            retriever,
        })
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
}
