//! Bit packing for codewords.
//!
//! Codewords are emitted most significant bit first, so the first bit of a
//! code lands in the high bit of its byte. [`BitWriter`] packs codewords of
//! up to 64 bits, [`BitBuf`] carries one encoded chunk with its exact bit
//! length, and [`BitReader`] walks a packed stream back for tests and
//! artifact parsing.
//!
//! Only the last byte of a stream is ever partial; its unused low bits are
//! zero and are never part of a codeword.
//!
//! ```
//! use parhuff_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b0, 1).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! writer.write_bits(0b10, 2).unwrap();
//!
//! let bits = writer.into_bits();
//! assert_eq!(bits.as_bytes(), &[0b0111_0000]);
//! assert_eq!(bits.pad_bits(), 3);
//!
//! let mut reader = BitReader::with_bit_len(bits.as_bytes(), bits.len());
//! assert_eq!(reader.read_bits(3).unwrap(), 0b011);
//! assert_eq!(reader.bits_remaining(), 2);
//! ```

use crate::error::{BitIoError, Result};

/// An owned, exactly-sized bit sequence (MSB-first, zero-padded storage).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuf {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuf {
    /// An empty bit sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of meaningful bits.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Backing bytes, including the zero padding of the final byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of padding bits in the final byte (0-7).
    pub fn pad_bits(&self) -> u8 {
        ((8 - self.bit_len % 8) % 8) as u8
    }

    /// Bit at `index` (`true` = 1), or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Iterate over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_len).map(move |i| self.bytes[i / 8] & (0x80 >> (i % 8)) != 0)
    }

    /// Consume the buffer, returning the padded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Packs codewords into bytes.
///
/// Pending bits sit in the low end of a `u128` accumulator; whole bytes are
/// moved out after every write, so at most 7 bits stay pending.
#[derive(Debug, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u128,
    /// Bits held in `acc` (0-7 between calls)
    pending: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a writer with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            acc: 0,
            pending: 0,
        }
    }

    /// Write the low `count` bits of `value`, highest first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if `count` exceeds 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        self.push_bits(value, count);
        Ok(())
    }

    /// Write the low `count` bits of `value`; `count` must be at most 64.
    fn push_bits(&mut self, value: u64, count: usize) {
        debug_assert!(count <= 64);
        let value = if count == 64 {
            value
        } else {
            value & ((1u64 << count) - 1)
        };
        self.acc = (self.acc << count) | value as u128;
        self.pending += count as u32;

        while self.pending >= 8 {
            self.pending -= 8;
            self.bytes.push((self.acc >> self.pending) as u8);
        }
        self.acc &= (1u128 << self.pending) - 1;
    }

    /// Append every bit of `bits`.
    ///
    /// When the writer is byte-aligned the whole bytes are copied directly.
    pub fn append(&mut self, bits: &BitBuf) {
        let full_bytes = bits.bit_len / 8;
        let tail = bits.bit_len % 8;

        if self.pending == 0 {
            self.bytes.extend_from_slice(&bits.bytes[..full_bytes]);
        } else {
            for &byte in &bits.bytes[..full_bytes] {
                self.push_bits(byte as u64, 8);
            }
        }

        if tail > 0 {
            let last = (bits.bytes[full_bytes] >> (8 - tail)) as u64;
            self.push_bits(last, tail);
        }
    }

    /// Bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.pending as usize
    }

    /// Finish writing and return the exact bit sequence.
    pub fn into_bits(self) -> BitBuf {
        let bit_len = self.bit_len();
        BitBuf {
            bytes: self.finish(),
            bit_len,
        }
    }

    /// Flush the pending bits (zero-padded to a byte) and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending > 0 {
            self.bytes.push((self.acc << (8 - self.pending)) as u8);
        }
        self.bytes
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a packed stream back, highest bit of each byte first.
///
/// [`BitReader::new`] exposes every bit of the slice, padding included;
/// [`BitReader::with_bit_len`] stops at the last meaningful bit.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Readable bits (<= data.len() * 8)
    limit: usize,
    /// Next bit to read, counted from the start of `data`
    cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_len(data, data.len() * 8)
    }

    /// Create a reader limited to the first `bit_len` bits of `data`.
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Self {
        Self {
            data,
            limit: bit_len.min(data.len() * 8),
            cursor: 0,
        }
    }

    /// Read `count` bits (at most 64) into the low end of a `u64`.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if `count` exceeds 64
    /// - `BitIoError::UnexpectedEof` if fewer than `count` bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut value = 0u64;
        let mut left = count;
        while left > 0 {
            let offset = self.cursor % 8;
            let n = left.min(8 - offset);
            let byte = (self.data[self.cursor / 8] << offset) >> (8 - n);

            value = (value << n) | byte as u64;
            self.cursor += n;
            left -= n;
        }

        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn bits_remaining(&self) -> usize {
        self.limit - self.cursor
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.limit
    }
}
