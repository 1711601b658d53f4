//! Compressed artifact assembly and serialization.
//!
//! An artifact is self-describing: it carries the codebook needed to decode
//! it, the number of encoded symbols, a per-chunk table, and the packed
//! bitstream.
//!
//! # Artifact Format
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  0x48 0x50 0x5A 0x31 ("HPZ1")
//! +--------------------+
//! | original_len (8)   |  u64 number of encoded symbols (input bytes)
//! +--------------------+
//! | symbol_count (2)   |  u16 codebook entries (0..=256)
//! +--------------------+
//! | chunk_count (4)    |  u32 chunk table entries
//! +--------------------+
//! | pad_bits (1)       |  u8 zero bits appended to the last payload byte
//! +--------------------+
//! | payload_len (8)    |  u64 packed bitstream length in bytes
//! +--------------------+
//! | crc32 (4)          |  u32 checksum
//! +--------------------+
//! | codebook           |  per entry: symbol (1), code length (1),
//! | (variable)         |  code bits MSB-first (ceil(length / 8) bytes)
//! +--------------------+
//! | chunk table        |  per chunk: symbols (u64), bits (u64)
//! | (16 * chunk_count) |
//! +--------------------+
//! | payload            |  packed codewords, chunk after chunk
//! | (payload_len)      |
//! +--------------------+
//! ```
//!
//! All integers are little-endian.
//!
//! # CRC Coverage
//!
//! The CRC32 covers every header field after the magic (except the CRC
//! itself), the codebook, the chunk table and the payload.

use crate::bitio::{BitReader, BitWriter};
use crate::chunk::EncodedChunk;
use crate::error::{ArtifactError, Error, Result};
use crate::huffman::{CodeMapping, Codeword, MAX_CODE_LEN};

/// Magic number for artifacts: "HPZ1"
const MAGIC: [u8; 4] = [0x48, 0x50, 0x5A, 0x31];

/// Size of the fixed artifact header in bytes
pub const HEADER_SIZE: usize = 31;

/// Offset of the CRC field within the header
const CRC_OFFSET: usize = HEADER_SIZE - 4;

/// Size of one chunk table entry in bytes
const CHUNK_ENTRY_SIZE: usize = 16;

/// Location of one encoded chunk within the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    /// Number of symbols the chunk encodes
    pub symbols: u64,
    /// Number of payload bits the chunk occupies
    pub bits: u64,
}

/// A complete compressed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Number of symbols encoded (the original input length)
    pub original_len: u64,

    /// Codebook used for every chunk
    pub codes: CodeMapping,

    /// Chunk table, in chunk index order
    pub chunks: Vec<ChunkEntry>,

    /// Zero bits padding the last payload byte (0-7)
    pub pad_bits: u8,

    /// Packed bitstream
    pub payload: Vec<u8>,
}

/// Concatenate ordered encoded chunks into an artifact.
///
/// `encoded` must be in index order, as returned by the worker pool.
pub fn assemble(codes: &CodeMapping, encoded: &[EncodedChunk]) -> Artifact {
    let total_bits: usize = encoded.iter().map(|c| c.bits.len()).sum();
    let mut writer = BitWriter::with_capacity(total_bits.div_ceil(8));

    let mut chunks = Vec::with_capacity(encoded.len());
    let mut original_len = 0u64;

    for chunk in encoded {
        debug_assert_eq!(chunk.index, chunks.len(), "chunks out of order");
        writer.append(&chunk.bits);
        chunks.push(ChunkEntry {
            symbols: chunk.symbols as u64,
            bits: chunk.bits.len() as u64,
        });
        original_len += chunk.symbols as u64;
    }

    let bits = writer.into_bits();
    Artifact {
        original_len,
        codes: codes.clone(),
        chunks,
        pad_bits: bits.pad_bits(),
        payload: bits.into_bytes(),
    }
}

impl Artifact {
    /// Number of meaningful payload bits (padding excluded).
    pub fn bit_len(&self) -> u64 {
        (self.payload.len() as u64 * 8).saturating_sub(self.pad_bits as u64)
    }

    /// Size of the serialized artifact in bytes.
    pub fn serialized_len(&self) -> usize {
        HEADER_SIZE
            + self.codebook_len()
            + self.chunks.len() * CHUNK_ENTRY_SIZE
            + self.payload.len()
    }

    fn codebook_len(&self) -> usize {
        self.codes
            .iter()
            .map(|(_, code)| 2 + (code.len() as usize).div_ceil(8))
            .sum()
    }

    /// Serialize the artifact.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());

        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.original_len.to_le_bytes());
        out.extend_from_slice(&(self.codes.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.chunks.len() as u32).to_le_bytes());
        out.push(self.pad_bits);
        out.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        out.extend_from_slice(&[0; 4]); // CRC, filled in below

        for (symbol, code) in self.codes.iter() {
            out.push(symbol);
            out.push(code.len());
            let len = code.len() as usize;
            let aligned = code.bits() << (64 - len);
            out.extend_from_slice(&aligned.to_be_bytes()[..len.div_ceil(8)]);
        }

        for entry in &self.chunks {
            out.extend_from_slice(&entry.symbols.to_le_bytes());
            out.extend_from_slice(&entry.bits.to_le_bytes());
        }

        out.extend_from_slice(&self.payload);

        let crc = compute_crc(&out);
        out[CRC_OFFSET..HEADER_SIZE].copy_from_slice(&crc.to_le_bytes());
        out
    }

    /// Parse and validate a serialized artifact.
    ///
    /// # Errors
    /// - `ArtifactError::InvalidMagic` if the magic number doesn't match
    /// - `ArtifactError::TooShort` / `LengthMismatch` if the buffer size
    ///   disagrees with the header
    /// - `Error::Crc` if the checksum fails
    /// - `ArtifactError::InvalidCodebook`, `ChunkTableMismatch` or
    ///   `InvalidPadding` if the contents are inconsistent
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let magic: [u8; 4] = cursor.array()?;
        if magic != MAGIC {
            return Err(ArtifactError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let original_len = u64::from_le_bytes(cursor.array()?);
        let symbol_count = u16::from_le_bytes(cursor.array()?) as usize;
        let chunk_count = u32::from_le_bytes(cursor.array()?) as usize;
        let pad_bits = cursor.byte()?;
        let payload_len = u64::from_le_bytes(cursor.array()?) as usize;
        let crc32 = u32::from_le_bytes(cursor.array()?);

        let computed = compute_crc(bytes);
        if computed != crc32 {
            return Err(Error::Crc {
                expected: crc32,
                actual: computed,
            });
        }

        if symbol_count > 256 {
            return Err(ArtifactError::InvalidCodebook(format!(
                "{symbol_count} entries for a 256-symbol alphabet"
            ))
            .into());
        }

        let mut codes = CodeMapping::empty();
        for _ in 0..symbol_count {
            let symbol = cursor.byte()?;
            let len = cursor.byte()?;
            if len == 0 || len as usize > MAX_CODE_LEN {
                return Err(ArtifactError::InvalidCodebook(format!(
                    "symbol {symbol:#04x} has code length {len}"
                ))
                .into());
            }

            let raw = cursor.take((len as usize).div_ceil(8))?;
            let bits = BitReader::new(raw).read_bits(len as usize)?;
            let code = Codeword::new(bits, len).ok_or_else(|| {
                ArtifactError::InvalidCodebook(format!("symbol {symbol:#04x}: bad codeword"))
            })?;

            if codes.insert(symbol, code).is_some() {
                return Err(ArtifactError::InvalidCodebook(format!(
                    "symbol {symbol:#04x} listed twice"
                ))
                .into());
            }
        }

        if !codes.is_prefix_free() {
            return Err(ArtifactError::InvalidCodebook("codewords are not prefix-free".into()).into());
        }
        if codes.is_empty() && original_len > 0 {
            return Err(ArtifactError::InvalidCodebook(format!(
                "no codewords for {original_len} symbols"
            ))
            .into());
        }

        let mut chunks = Vec::with_capacity(chunk_count.min(cursor.remaining() / CHUNK_ENTRY_SIZE));
        for _ in 0..chunk_count {
            chunks.push(ChunkEntry {
                symbols: u64::from_le_bytes(cursor.array()?),
                bits: u64::from_le_bytes(cursor.array()?),
            });
        }

        let payload = cursor.take(payload_len)?.to_vec();
        if cursor.remaining() > 0 {
            return Err(ArtifactError::LengthMismatch {
                expected: cursor.position(),
                actual: bytes.len(),
            }
            .into());
        }

        if pad_bits > 7 || (payload.is_empty() && pad_bits != 0) {
            return Err(ArtifactError::InvalidPadding {
                pad_bits,
                payload_len: payload.len(),
            }
            .into());
        }

        let artifact = Self {
            original_len,
            codes,
            chunks,
            pad_bits,
            payload,
        };
        artifact.check_chunk_table()?;
        Ok(artifact)
    }

    fn check_chunk_table(&self) -> Result<()> {
        let symbols = checked_total("symbols", self.chunks.iter().map(|c| c.symbols))?;
        if symbols != self.original_len {
            return Err(ArtifactError::ChunkTableMismatch {
                field: "symbols",
                expected: self.original_len,
                actual: symbols,
            }
            .into());
        }

        let bits = checked_total("bits", self.chunks.iter().map(|c| c.bits))?;
        if bits != self.bit_len() {
            return Err(ArtifactError::ChunkTableMismatch {
                field: "bits",
                expected: self.bit_len(),
                actual: bits,
            }
            .into());
        }

        Ok(())
    }
}

/// Sum chunk table values read from untrusted input.
fn checked_total(field: &'static str, mut values: impl Iterator<Item = u64>) -> Result<u64> {
    values
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| ArtifactError::ChunkTableOverflow { field }.into())
}

/// Compute CRC32 over a serialized artifact, skipping the magic and the CRC
/// field itself.
fn compute_crc(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes[MAGIC.len()..CRC_OFFSET]);
    hasher.update(&bytes[HEADER_SIZE..]);
    hasher.finalize()
}

/// Bounds-checked little reader over the artifact bytes.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(ArtifactError::TooShort {
                required: self.pos.saturating_add(len),
                actual: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn position(&self) -> usize {
        self.pos
    }
}
