//! Chunking: index-tagged views over the shared input.
//!
//! The input is held once in an `Arc<[u8]>`; a [`Chunk`] is a cheap view
//! (source + byte range) that can be moved into a worker thread without
//! copying. Chunks produced by one split are disjoint, ordered by index, and
//! cover the whole input.

use crate::bitio::BitBuf;
use std::ops::Range;
use std::sync::Arc;

/// A contiguous, index-tagged slice of the input.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position of this chunk in the original input (0-based)
    pub index: usize,
    source: Arc<[u8]>,
    range: Range<usize>,
}

impl Chunk {
    /// Create a chunk viewing `source[range]`.
    ///
    /// # Panics
    /// Panics if `range` is out of bounds for `source`.
    pub fn new(index: usize, source: Arc<[u8]>, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= source.len(),
            "chunk range {range:?} out of bounds for input of {} bytes",
            source.len()
        );
        Self {
            index,
            source,
            range,
        }
    }

    /// The chunk's bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.source[self.range.clone()]
    }

    /// Byte range of this chunk within the input.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// The encoding of one chunk under the shared code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Index of the chunk this was produced from
    pub index: usize,
    /// Number of symbols (input bytes) encoded
    pub symbols: usize,
    /// Concatenated codewords, in byte order
    pub bits: BitBuf,
}

/// Split `input` into `count` roughly equal chunks.
///
/// Every chunk gets `len / count` bytes and the last one also absorbs the
/// remainder. `count` is capped at the input length, so no chunk is empty.
/// An empty input yields no chunks.
///
/// # Panics
/// Panics if `count` is zero.
pub fn split_even(input: Arc<[u8]>, count: usize) -> Vec<Chunk> {
    assert!(count > 0, "chunk count must be positive");
    if input.is_empty() {
        return Vec::new();
    }

    let len = input.len();
    let count = count.min(len);
    let base = len / count;

    (0..count)
        .map(|i| {
            let start = i * base;
            let end = if i == count - 1 { len } else { start + base };
            Chunk::new(i, Arc::clone(&input), start..end)
        })
        .collect()
}

/// Split `input` into chunks of `chunk_bytes` bytes (the last may be shorter).
///
/// # Panics
/// Panics if `chunk_bytes` is zero.
pub fn split_by_size(input: Arc<[u8]>, chunk_bytes: usize) -> Vec<Chunk> {
    assert!(chunk_bytes > 0, "chunk size must be positive");
    let len = input.len();

    (0..len.div_ceil(chunk_bytes))
        .map(|i| {
            let start = i * chunk_bytes;
            let end = (start + chunk_bytes).min(len);
            Chunk::new(i, Arc::clone(&input), start..end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(chunks: &[Chunk], len: usize) {
        let mut expected_start = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.range().start, expected_start, "gap or overlap at chunk {i}");
            expected_start = chunk.range().end;
        }
        assert_eq!(expected_start, len);
    }

    #[test]
    fn test_split_even_last_absorbs_remainder() {
        let input: Arc<[u8]> = Arc::from(&b"0123456789"[..]);
        let chunks = split_even(input, 3);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].bytes(), b"012");
        assert_eq!(chunks[1].bytes(), b"345");
        assert_eq!(chunks[2].bytes(), b"6789");
        assert_partition(&chunks, 10);
    }

    #[test]
    fn test_split_even_more_chunks_than_bytes() {
        let input: Arc<[u8]> = Arc::from(&b"abc"[..]);
        let chunks = split_even(input, 5);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
        assert_partition(&chunks, 3);
    }

    #[test]
    fn test_split_even_huge_count() {
        let input: Arc<[u8]> = Arc::from(&b"abcd"[..]);
        let chunks = split_even(input, usize::MAX);

        assert_eq!(chunks.len(), 4);
        assert_partition(&chunks, 4);
    }

    #[test]
    fn test_split_empty_input() {
        let input: Arc<[u8]> = Arc::from(Vec::new());
        assert!(split_even(Arc::clone(&input), 4).is_empty());
        assert!(split_by_size(input, 16).is_empty());
    }

    #[test]
    fn test_split_by_size() {
        let input: Arc<[u8]> = Arc::from(vec![7u8; 1000]);
        let chunks = split_by_size(input, 300);

        let lens: Vec<_> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(lens, vec![300, 300, 300, 100]);
        assert_partition(&chunks, 1000);
    }

    #[test]
    #[should_panic(expected = "chunk count must be positive")]
    fn test_split_even_zero_count() {
        split_even(Arc::from(&b"x"[..]), 0);
    }
}
