//! EduRAG Retrieval Layer
//!
//! Answers "which stored chunks are closest to this question". The
//! [`Retriever`] embeds the query through the configured [`embed::Embedder`]
//! and pushes the nearest-neighbor search into the
//! [`store::VectorStore`], so ranking happens where the vectors live.
//!
//! Ranking is deterministic: chunks come back ordered by distance, with
//! ties broken by insertion order, and each hit carries a 1-based rank.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use retrieval::{Retriever, RetrievalConfig, RetrievalRequest};
//! use store::MemoryStore;
//! use embed::StubEmbedder;
//!
//! # async fn run() -> Result<(), retrieval::RetrievalError> {
//! let store = Arc::new(MemoryStore::new());
//! let embedder = Arc::new(StubEmbedder::with_dimensions(1536));
//! let retriever = Retriever::new(store, embedder, RetrievalConfig::default())?;
//! let hits = retriever
//!     .retrieve(&RetrievalRequest::query("why is the sky blue"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod retriever;
mod types;

pub use crate::retriever::Retriever;
pub use crate::types::{RetrievalConfig, RetrievalError, RetrievalRequest, RetrievedChunk};
