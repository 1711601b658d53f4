//! Error types for the parhuff encoder.
//!
//! All operations return structured errors rather than panicking, so the
//! pipeline can be embedded in other programs and tested without a terminal.

use thiserror::Error;

/// Top-level error type for all operations in the encoder.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Huffman: code construction or per-symbol lookup failures
/// - Worker pool: thread lifecycle and result collection
/// - Artifact: parsing or validating a serialized artifact
/// - CRC: artifact corruption detected
/// - I/O: file system operations (app layer)
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman code construction or encoding error
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Encoding worker pool error
    #[error("worker pool error: {0}")]
    WorkerPool(#[from] WorkerPoolError),

    /// Artifact serialization or parsing error
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one operation)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman code errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// A symbol being encoded has no codeword.
    ///
    /// Cannot happen when the mapping was built from the same input's
    /// frequency table; it signals broken pipeline wiring.
    #[error("symbol {symbol:#04x} in chunk {chunk} has no codeword")]
    InconsistentCodeMapping { symbol: u8, chunk: usize },

    /// Code length exceeds what a codeword can hold
    #[error("code length {length} exceeds maximum {max}")]
    CodeLengthTooLong { length: usize, max: usize },
}

/// Encoding worker pool errors.
#[derive(Debug, Error)]
pub enum WorkerPoolError {
    /// A worker thread panicked instead of exiting cleanly
    #[error("worker {worker} failed to terminate cleanly")]
    JoinFailure { worker: usize },

    /// Every worker has exited; the queue no longer accepts chunks
    #[error("work queue closed: no worker is receiving chunks")]
    QueueClosed,

    /// Two results were recorded for the same chunk index
    #[error("chunk {index} was encoded twice")]
    DuplicateChunk { index: usize },

    /// A submitted chunk produced no result
    #[error("chunk {index} produced no output")]
    MissingChunk { index: usize },

    /// The operating system refused to start a worker thread
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Artifact errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Buffer is too short to contain the declared structure
    #[error("artifact too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Buffer is longer than the declared structure
    #[error("artifact length mismatch: header implies {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Codebook entry is malformed (zero length, duplicate symbol, not prefix-free)
    #[error("invalid codebook: {0}")]
    InvalidCodebook(String),

    /// Chunk table totals disagree with the header
    #[error("chunk table mismatch: {field} sums to {actual}, header says {expected}")]
    ChunkTableMismatch {
        field: &'static str,
        expected: u64,
        actual: u64,
    },

    /// Chunk table entries add up past `u64::MAX`
    #[error("chunk table {field} overflow")]
    ChunkTableOverflow { field: &'static str },

    /// Padding count is out of range or inconsistent with the payload
    #[error("invalid padding: {pad_bits} bits for a {payload_len}-byte payload")]
    InvalidPadding { pad_bits: u8, payload_len: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
