//! The embedding capability boundary.

use std::borrow::Cow;

use async_trait::async_trait;

use crate::error::EmbedError;

/// Text-to-vector capability.
///
/// Implementations must be deterministic per input for the same provider
/// state and must return one vector per input, in input order, with a
/// consistent dimension matching [`dimensions`](Embedder::dimensions).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed several texts, preserving input order in the output.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Dimension of every vector this embedder produces.
    fn dimensions(&self) -> usize;

    /// Model label, surfaced for observability.
    fn model_name(&self) -> &str;
}

/// Truncates `text` to at most `max_chars` characters without splitting a
/// multi-byte sequence. Borrows when no truncation is needed.
pub fn truncate_input(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => Cow::Owned(text[..byte_end].to_string()),
        None => Cow::Borrowed(text),
    }
}
