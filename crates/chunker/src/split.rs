//! Fixed-stride overlapping chunk iteration.
//!
//! All offsets are computed over characters (Unicode scalar values) and
//! mapped back to byte boundaries internally, so slicing never lands inside
//! a multi-byte sequence.

use serde::{Deserialize, Serialize};

/// One chunk of a document's text.
///
/// `index` is the zero-based sequence position within the document and
/// `start` is the character offset of the chunk's first character in the
/// source text. For any two consecutive pieces, `start` advances by exactly
/// the configured stride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPiece<'a> {
    /// Zero-based chunk sequence index; contiguous within one document.
    pub index: usize,
    /// Character offset of the chunk's start in the source text.
    pub start: usize,
    /// The chunk text, borrowed from the source.
    pub text: &'a str,
}

impl ChunkPiece<'_> {
    /// Returns an owned copy of the chunk text.
    pub fn to_owned_text(&self) -> String {
        self.text.to_string()
    }
}

/// Lazy iterator over the chunks of a text.
///
/// Restartable by cloning: a clone continues (or restarts, if cloned before
/// the first `next`) independently of the original. Produced by
/// [`chunk`](crate::chunk), which validates the parameters first.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    text: &'a str,
    chunk_size: usize,
    stride: usize,
    /// Byte offset of the next chunk start.
    byte_pos: usize,
    /// Character offset of the next chunk start.
    char_pos: usize,
    index: usize,
    done: bool,
}

impl<'a> ChunkIter<'a> {
    /// Invariant upheld by the caller: `chunk_size > 0` and
    /// `0 < stride <= chunk_size`.
    pub(crate) fn new(text: &'a str, chunk_size: usize, stride: usize) -> Self {
        Self {
            text,
            chunk_size,
            stride,
            byte_pos: 0,
            char_pos: 0,
            index: 0,
            done: false,
        }
    }

    /// Byte length of the first `chars` characters of `s`, or `None` when
    /// `s` has fewer characters than that.
    fn byte_len_of_chars(s: &str, chars: usize) -> Option<usize> {
        if chars == 0 {
            return Some(0);
        }
        let mut seen = 0;
        for (offset, ch) in s.char_indices() {
            seen += 1;
            if seen == chars {
                return Some(offset + ch.len_utf8());
            }
        }
        None
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = ChunkPiece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.text[self.byte_pos..];
        let piece = match Self::byte_len_of_chars(rest, self.chunk_size) {
            Some(len) => ChunkPiece {
                index: self.index,
                start: self.char_pos,
                text: &rest[..len],
            },
            // Fewer than chunk_size characters remain: this is the final,
            // possibly shorter, chunk.
            None => ChunkPiece {
                index: self.index,
                start: self.char_pos,
                text: rest,
            },
        };

        // The chunk reaching the end of the text is always the last one;
        // a trailing overlap-only remainder must not become its own chunk.
        if self.byte_pos + piece.text.len() >= self.text.len() {
            self.done = true;
        } else {
            // stride <= chunk_size and the chunk was full, so the stride
            // fits inside `rest`.
            let advance = Self::byte_len_of_chars(rest, self.stride)
                .unwrap_or(rest.len());
            self.byte_pos += advance;
            self.char_pos += self.stride;
        }
        self.index += 1;

        Some(piece)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Upper bound from remaining bytes; chars <= bytes.
        let remaining_bytes = self.text.len() - self.byte_pos;
        let upper = if remaining_bytes <= self.chunk_size {
            1
        } else {
            1 + remaining_bytes.div_ceil(self.stride)
        };
        (1, Some(upper))
    }
}

/// Number of chunks a text of `char_len` characters produces.
///
/// `chunk_size` and `stride` must satisfy the same invariants as
/// [`ChunkIter`]; useful for pre-allocating embedding batches.
pub fn chunk_count(char_len: usize, chunk_size: usize, stride: usize) -> usize {
    if char_len <= chunk_size {
        1
    } else {
        1 + (char_len - chunk_size).div_ceil(stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chunk, ChunkConfig};

    fn cfg(chunk_size: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn single_chunk_when_text_fits() {
        let pieces: Vec<_> = chunk("hello world", &cfg(100, 10)).unwrap().collect();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].index, 0);
        assert_eq!(pieces[0].start, 0);
        assert_eq!(pieces[0].text, "hello world");
    }

    #[test]
    fn single_chunk_at_exact_boundary() {
        let text = "a".repeat(100);
        let pieces: Vec<_> = chunk(&text, &cfg(100, 10)).unwrap().collect();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].text.len(), 100);
    }

    #[test]
    fn empty_text_yields_one_empty_chunk() {
        let pieces: Vec<_> = chunk("", &cfg(100, 10)).unwrap().collect();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].text, "");
        assert_eq!(pieces[0].start, 0);
    }

    #[test]
    fn thousand_chars_with_overlap_fifty() {
        let text: String = (0..1000).map(|i| ((b'a' + (i % 26) as u8) as char)).collect();
        let pieces: Vec<_> = chunk(&text, &cfg(400, 50)).unwrap().collect();

        // Stride 350: full chunks at 0 and 350, then the tail from 700.
        let lengths: Vec<usize> = pieces.iter().map(|p| p.text.chars().count()).collect();
        let starts: Vec<usize> = pieces.iter().map(|p| p.start).collect();
        assert_eq!(lengths, vec![400, 400, 300]);
        assert_eq!(starts, vec![0, 350, 700]);

        let indices: Vec<usize> = pieces.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let text: String = (0..1000).map(|i| ((b'a' + (i % 26) as u8) as char)).collect();
        let overlap = 50;
        let pieces: Vec<_> = chunk(&text, &cfg(400, overlap)).unwrap().collect();

        for pair in pieces.windows(2) {
            let prev_tail: String = pair[0]
                .text
                .chars()
                .skip(pair[0].text.chars().count() - overlap)
                .collect();
            let next_head: String = pair[1].text.chars().take(overlap).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn reconstruction_by_dropping_leading_overlap() {
        let text: String = (0..997).map(|i| ((b'0' + (i % 10) as u8) as char)).collect();
        let overlap = 33;
        let pieces: Vec<_> = chunk(&text, &cfg(120, overlap)).unwrap().collect();

        let mut rebuilt = String::new();
        for piece in &pieces {
            if piece.index == 0 {
                rebuilt.push_str(piece.text);
            } else {
                rebuilt.extend(piece.text.chars().skip(overlap));
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn zero_overlap_partitions_text() {
        let text = "abcdefghij";
        let pieces: Vec<_> = chunk(text, &cfg(3, 0)).unwrap().collect();
        let joined: String = pieces.iter().map(|p| p.text).collect();
        assert_eq!(joined, text);
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces[3].text, "j");
    }

    #[test]
    fn every_chunk_bounded_by_chunk_size() {
        let text: String = "lorem ipsum dolor sit amet ".repeat(40);
        for (size, overlap) in [(64, 16), (100, 99), (7, 3), (1, 0)] {
            let pieces: Vec<_> = chunk(&text, &cfg(size, overlap)).unwrap().collect();
            assert!(!pieces.is_empty());
            for piece in &pieces {
                assert!(piece.text.chars().count() <= size);
            }
            // All but the last are exactly full.
            for piece in &pieces[..pieces.len() - 1] {
                assert_eq!(piece.text.chars().count(), size);
            }
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let a: Vec<_> = chunk(&text, &cfg(100, 20)).unwrap().collect();
        let b: Vec<_> = chunk(&text, &cfg(100, 20)).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn clone_restarts_iteration() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let fresh = chunk(text, &cfg(10, 2)).unwrap();
        let restart = fresh.clone();

        let first: Vec<_> = fresh.collect();
        let second: Vec<_> = restart.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn multibyte_text_chunks_on_char_boundaries() {
        // 3-byte chars; byte-based slicing would panic or split glyphs.
        let text: String = "日本語のテキストです。".repeat(20);
        let total_chars = text.chars().count();
        let pieces: Vec<_> = chunk(&text, &cfg(50, 10)).unwrap().collect();

        for piece in &pieces {
            assert!(piece.text.chars().count() <= 50);
        }
        let mut rebuilt = String::new();
        for piece in &pieces {
            if piece.index == 0 {
                rebuilt.push_str(piece.text);
            } else {
                rebuilt.extend(piece.text.chars().skip(10));
            }
        }
        assert_eq!(rebuilt.chars().count(), total_chars);
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunk_count_matches_iterator() {
        for (len, size, overlap) in [(1000, 400, 50), (1000, 1000, 200), (5, 2, 1), (0, 10, 0)] {
            let text: String = "x".repeat(len);
            let config = cfg(size, overlap);
            let produced = chunk(&text, &config).unwrap().count();
            assert_eq!(
                produced,
                chunk_count(len, size, config.stride()),
                "len={len} size={size} overlap={overlap}"
            );
        }
    }

    #[test]
    fn size_hint_upper_bound_holds() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let iter = chunk(&text, &cfg(40, 10)).unwrap();
        let (lower, upper) = iter.size_hint();
        let actual = iter.count();
        assert!(lower <= actual);
        assert!(actual <= upper.unwrap());
    }
}
