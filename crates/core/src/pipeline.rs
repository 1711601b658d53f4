//! The end-to-end compression pipeline.
//!
//! ```text
//! input ─▶ split ─▶ count (parallel) ─▶ build codes ─▶ encode (pool) ─▶ assemble ─▶ artifact
//! ```
//!
//! Counting and encoding run on separate thread groups sized by
//! [`EncoderConfig`]; code construction and assembly are sequential.

use crate::artifact::{assemble, Artifact};
use crate::chunk::{split_by_size, split_even, Chunk};
use crate::error::{Error, Result};
use crate::frequency::FrequencyCounter;
use crate::huffman::CodeBuilder;
use crate::metrics::CompressionStats;
use crate::pool::encode_chunks;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Fallback worker count when the available parallelism is unknown.
const DEFAULT_WORKERS: usize = 4;

/// How the input is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPlan {
    /// A fixed number of roughly equal chunks (the last absorbs the remainder)
    Count(usize),
    /// Chunks of a fixed size in bytes (the last may be shorter)
    Size(usize),
}

/// Worker counts and chunking policy for an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Threads counting symbol frequencies
    pub counting_workers: usize,

    /// Threads in the encoding pool
    pub encoding_workers: usize,

    /// Chunking policy
    pub chunking: ChunkPlan,
}

impl EncoderConfig {
    /// Use `workers` threads for both stages and one chunk per worker.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            counting_workers: workers,
            encoding_workers: workers,
            chunking: ChunkPlan::Count(workers),
        }
    }

    /// Check that every count is positive.
    pub fn validate(&self) -> Result<()> {
        if self.counting_workers == 0 {
            return Err(Error::Config("counting workers must be positive".into()));
        }
        if self.encoding_workers == 0 {
            return Err(Error::Config("encoding workers must be positive".into()));
        }
        match self.chunking {
            ChunkPlan::Count(0) => Err(Error::Config("chunk count must be positive".into())),
            ChunkPlan::Size(0) => Err(Error::Config("chunk size must be positive".into())),
            _ => Ok(()),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKERS);
        Self::with_workers(workers)
    }
}

/// Output of a compression run.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub artifact: Artifact,
    pub stats: CompressionStats,
}

/// Parallel Huffman encoder.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create an encoder.
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Cut `input` into chunks according to the configured plan.
    pub fn split(&self, input: Arc<[u8]>) -> Vec<Chunk> {
        match self.config.chunking {
            ChunkPlan::Count(count) => split_even(input, count),
            ChunkPlan::Size(bytes) => split_by_size(input, bytes),
        }
    }

    /// Compress a borrowed buffer. The bytes are copied once into shared storage.
    pub fn compress(&self, input: &[u8]) -> Result<Compressed> {
        self.compress_shared(Arc::from(input))
    }

    /// Compress a buffer already held in shared storage.
    ///
    /// An empty input produces an empty artifact (no codebook, no payload).
    ///
    /// # Errors
    /// Any counting, code construction or encoding failure aborts the whole
    /// run; no partial artifact is returned.
    pub fn compress_shared(&self, input: Arc<[u8]>) -> Result<Compressed> {
        let mut stats = CompressionStats {
            input_bytes: input.len() as u64,
            ..Default::default()
        };

        let chunks = self.split(input);
        stats.chunks = chunks.len() as u64;

        let started = Instant::now();
        let counter = FrequencyCounter::new(self.config.counting_workers)?;
        let table = counter.count(&chunks);
        stats.count_time = started.elapsed();
        stats.counting_workers = counter.workers().min(chunks.len()).max(1);
        stats.distinct_symbols = table.distinct();
        debug_assert_eq!(table.total(), stats.input_bytes);
        log::debug!(
            "counted {} bytes in {} chunks: {} distinct symbols ({:?})",
            stats.input_bytes,
            stats.chunks,
            stats.distinct_symbols,
            stats.count_time
        );

        let started = Instant::now();
        let (_tree, codes) = CodeBuilder::build(&table)?;
        let codes = Arc::new(codes);
        stats.build_time = started.elapsed();
        stats.max_code_len = codes.max_len();
        log::debug!(
            "built {} codewords, longest {} bits ({:?})",
            codes.len(),
            stats.max_code_len,
            stats.build_time
        );

        let started = Instant::now();
        let workers = self.config.encoding_workers.min(chunks.len()).max(1);
        let encoded = encode_chunks(chunks, Arc::clone(&codes), workers)?;
        stats.encode_time = started.elapsed();
        stats.encoding_workers = workers;
        log::debug!(
            "encoded {} chunks on {} workers ({:?})",
            encoded.len(),
            workers,
            stats.encode_time
        );

        let started = Instant::now();
        let artifact = assemble(&codes, &encoded);
        stats.assemble_time = started.elapsed();
        stats.payload_bits = artifact.bit_len();
        stats.artifact_bytes = artifact.serialized_len() as u64;

        log::info!(
            "compressed {} bytes into {} ({:.1}%, {:.3} bits/symbol)",
            stats.input_bytes,
            stats.artifact_bytes,
            stats.compression_ratio() * 100.0,
            stats.bits_per_symbol()
        );

        Ok(Compressed { artifact, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(EncoderConfig::with_workers(1).validate().is_ok());
        assert!(EncoderConfig::default().validate().is_ok());

        let mut config = EncoderConfig::with_workers(2);
        config.encoding_workers = 0;
        assert!(matches!(Encoder::new(config), Err(Error::Config(_))));

        config = EncoderConfig::with_workers(2);
        config.chunking = ChunkPlan::Size(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.chunking = ChunkPlan::Count(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_split_plans() {
        let input: Arc<[u8]> = Arc::from(vec![0u8; 100]);

        let by_count = Encoder::new(EncoderConfig::with_workers(3)).unwrap();
        assert_eq!(by_count.split(Arc::clone(&input)).len(), 3);

        let by_size = Encoder::new(EncoderConfig {
            chunking: ChunkPlan::Size(30),
            ..EncoderConfig::with_workers(2)
        })
        .unwrap();
        assert_eq!(by_size.split(input).len(), 4);
    }

    #[test]
    fn test_compress_aaabbc() {
        let encoder = Encoder::new(EncoderConfig::with_workers(2)).unwrap();
        let Compressed { artifact, stats } = encoder.compress(b"aaabbc").unwrap();

        assert_eq!(artifact.original_len, 6);
        assert_eq!(artifact.bit_len(), 9);
        assert_eq!(artifact.pad_bits, 7);
        assert_eq!(artifact.codes.len(), 3);

        assert_eq!(stats.input_bytes, 6);
        assert_eq!(stats.payload_bits, 9);
        assert_eq!(stats.distinct_symbols, 3);
        assert_eq!(stats.max_code_len, 2);
        assert_eq!(stats.chunks, 2);
    }

    #[test]
    fn test_chunk_count_capped_by_input() {
        let encoder = Encoder::new(EncoderConfig {
            chunking: ChunkPlan::Count(usize::MAX),
            ..EncoderConfig::with_workers(2)
        })
        .unwrap();
        let Compressed { artifact, stats } = encoder.compress(b"abc").unwrap();

        assert_eq!(stats.chunks, 3);
        assert_eq!(artifact.chunks.len(), 3);
        assert_eq!(artifact.original_len, 3);
    }

    #[test]
    fn test_compress_empty() {
        let encoder = Encoder::new(EncoderConfig::with_workers(4)).unwrap();
        let Compressed { artifact, stats } = encoder.compress(b"").unwrap();

        assert_eq!(artifact.original_len, 0);
        assert!(artifact.payload.is_empty());
        assert!(artifact.codes.is_empty());
        assert!(artifact.chunks.is_empty());
        assert_eq!(stats.chunks, 0);
        assert_eq!(stats.encoding_workers, 1);
    }
}
