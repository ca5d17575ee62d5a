//! Configuration for the chunking stage.

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// Runtime configuration for text chunking.
///
/// Both fields are measured in characters (Unicode scalar values), not
/// bytes, so multi-byte text chunks the same way as ASCII. The config is
/// cheap to clone and serializes cleanly from JSON/TOML.
///
/// # Examples
///
/// ```
/// use chunker::ChunkConfig;
///
/// let cfg = ChunkConfig::default();
/// assert_eq!(cfg.chunk_size, 1000);
/// assert_eq!(cfg.overlap, 200);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Target chunk length in characters. Every chunk except possibly the
    /// last has exactly this length.
    ///
    /// Default: `1000`
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of trailing characters each chunk shares with the next one.
    /// Must be strictly smaller than `chunk_size`.
    ///
    /// Default: `200`
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkConfig {
    /// Checks that the parameters guarantee forward progress.
    ///
    /// Called by [`chunk`](crate::chunk) before any text is inspected;
    /// also cheap enough to run at service start-up against loaded
    /// configuration.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 {
            return Err(ChunkError::InvalidParameter(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(ChunkError::InvalidParameter(format!(
                "overlap ({}) must be smaller than chunk_size ({}); equal or larger \
                 overlap would never advance past the first chunk",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance in characters between the starts of consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}
