//! parhuff-core: parallel Huffman encoder
//!
//! This library turns a byte buffer into a self-describing compressed
//! artifact:
//! - Counts symbol frequencies over contiguous chunks in parallel
//! - Builds an optimal prefix (Huffman) code from the merged counts
//! - Encodes chunks on a fixed pool of worker threads, preserving chunk order
//! - Packs the codewords into a bitstream behind a header carrying the codebook
//!
//! # Architecture
//!
//! - `bitio`: Low-level bit reading/writing
//! - `chunk`: Index-tagged views over the shared input
//! - `frequency`: Frequency tables and the parallel counter
//! - `huffman`: Code tree construction and codeword mapping
//! - `pool`: Worker pool encoding chunks
//! - `artifact`: Output assembly and the artifact format
//! - `pipeline`: End-to-end encoder and its configuration
//! - `metrics`: Sizes and stage timings of a run
//!
//! # Example
//!
//! ```
//! use parhuff_core::{Encoder, EncoderConfig};
//!
//! let encoder = Encoder::new(EncoderConfig::with_workers(2)).unwrap();
//! let compressed = encoder.compress(b"aaabbc").unwrap();
//!
//! assert_eq!(compressed.artifact.original_len, 6);
//! assert_eq!(compressed.artifact.bit_len(), 9);
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and returned to the caller
//! - **Deterministic**: For a given chunk plan, identical input yields an
//!   identical artifact whatever the thread counts
//! - **Contention-free hot loops**: Counting and encoding touch shared state
//!   only to publish finished results

pub mod artifact;
pub mod bitio;
pub mod chunk;
pub mod error;
pub mod frequency;
pub mod huffman;
pub mod metrics;
pub mod pipeline;
pub mod pool;

// Re-export commonly used types
pub use artifact::Artifact;
pub use error::{Error, Result};
pub use pipeline::{ChunkPlan, Compressed, Encoder, EncoderConfig};
