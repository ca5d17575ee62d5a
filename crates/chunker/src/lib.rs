//! EduRAG Chunking Layer
//!
//! This is where document text gets cut into the overlapping pieces the rest
//! of the retrieval pipeline works with. Chunking is pure computation: no
//! I/O, no allocation beyond the iterator itself, fully deterministic.
//!
//! ## What we do here
//!
//! - **Validate parameters** - `overlap >= chunk_size` can never make
//!   forward progress, so it is rejected before any text is touched
//! - **Slice lazily** - [`chunk`] returns a restartable iterator of borrowed
//!   [`ChunkPiece`]s rather than materializing every chunk up front
//! - **Stay char-correct** - offsets are character-based so multi-byte text
//!   never gets split mid-glyph
//! - **Normalize on request** - [`normalize_text`] collapses whitespace runs
//!   the way the ingestion path expects
//!
//! ## Invariants
//!
//! Chunk 0 starts at offset 0; consecutive chunks share exactly
//! `overlap` characters; every chunk except possibly the last has exactly
//! `chunk_size` characters; concatenating chunks in index order while
//! dropping each later chunk's leading overlap reconstructs the input.
//!
//! ## Example
//!
//! ```
//! use chunker::{chunk, ChunkConfig};
//!
//! let cfg = ChunkConfig { chunk_size: 8, overlap: 2 };
//! let pieces: Vec<_> = chunk("abcdefghijklmn", &cfg).unwrap().collect();
//!
//! assert_eq!(pieces[0].text, "abcdefgh");
//! assert_eq!(pieces[1].start, 6);
//! ```

mod config;
mod error;
mod split;

pub use crate::config::ChunkConfig;
pub use crate::error::ChunkError;
pub use crate::split::{chunk_count, ChunkIter, ChunkPiece};

/// Split `text` into overlapping chunks according to `cfg`.
///
/// Validates `cfg` first and fails with [`ChunkError::InvalidParameter`]
/// without looking at the text. Text no longer than `cfg.chunk_size`
/// (including empty text) yields exactly one chunk.
pub fn chunk<'a>(text: &'a str, cfg: &ChunkConfig) -> Result<ChunkIter<'a>, ChunkError> {
    cfg.validate()?;
    Ok(ChunkIter::new(text, cfg.chunk_size, cfg.stride()))
}

/// Collapses repeated whitespace, trims edges, and normalizes newlines to
/// single ' '. Keeps content deterministic across runs.
pub fn normalize_text(s: &str) -> String {
    let mut normalized = String::with_capacity(s.len());
    for segment in s.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_rejects_invalid_parameters_before_reading_text() {
        let cfg = ChunkConfig {
            chunk_size: 10,
            overlap: 10,
        };
        let res = chunk("irrelevant", &cfg);
        assert!(matches!(res, Err(ChunkError::InvalidParameter(_))));

        // Same failure regardless of input, including empty text.
        assert!(chunk("", &cfg).is_err());
    }

    #[test]
    fn chunk_accepts_valid_parameters() {
        let cfg = ChunkConfig {
            chunk_size: 10,
            overlap: 9,
        };
        assert!(chunk("some text", &cfg).is_ok());
    }

    #[test]
    fn test_normalize_text() {
        let cases = [
            (
                "  Hello\n\n   world\t this  is\n a test  ",
                "Hello world this is a test",
            ),
            ("\n", ""),
            ("emoji \u{1f600} test ", "emoji \u{1f600} test"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_text(input), expected);
        }
    }
}
