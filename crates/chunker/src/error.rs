use thiserror::Error;

/// Errors produced while validating chunking parameters.
///
/// Parameter validation happens before any text is touched, so a failed
/// [`chunk`](crate::chunk) call performs no work and has no side effects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChunkError {
    /// The supplied chunking parameters cannot guarantee forward progress
    /// or are otherwise nonsensical (zero-length chunks, overlap that
    /// swallows the whole chunk).
    #[error("invalid chunking parameter: {0}")]
    InvalidParameter(String),
}
