//! Minimal decoder used only to check that artifacts round-trip.

#![allow(dead_code)]

use parhuff_core::bitio::BitReader;
use parhuff_core::Artifact;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Decode the whole payload with the embedded codebook.
pub fn decode(artifact: &Artifact) -> Vec<u8> {
    let bit_len = artifact.bit_len() as usize;
    let mut reader = BitReader::with_bit_len(&artifact.payload, bit_len);
    let out = decode_symbols(artifact, &mut reader, artifact.original_len as usize);
    assert!(reader.is_empty(), "{} bits left after decoding", reader.bits_remaining());
    out
}

/// Decode every chunk independently, seeking with the chunk table.
pub fn decode_chunks(artifact: &Artifact) -> Vec<Vec<u8>> {
    let mut offset = 0usize;
    let mut chunks = Vec::with_capacity(artifact.chunks.len());

    for entry in &artifact.chunks {
        let end = offset + entry.bits as usize;
        let mut reader = BitReader::with_bit_len(&artifact.payload, end);
        let mut skip = offset;
        while skip > 0 {
            let step = skip.min(64);
            reader.read_bits(step).unwrap();
            skip -= step;
        }
        chunks.push(decode_symbols(artifact, &mut reader, entry.symbols as usize));
        assert!(reader.is_empty(), "chunk did not end on its recorded boundary");
        offset = end;
    }

    chunks
}

fn decode_symbols(artifact: &Artifact, reader: &mut BitReader<'_>, count: usize) -> Vec<u8> {
    let lookup: HashMap<(u8, u64), u8> = artifact
        .codes
        .iter()
        .map(|(symbol, code)| ((code.len(), code.bits()), symbol))
        .collect();
    let max_len = artifact.codes.max_len();

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let (mut bits, mut len) = (0u64, 0u8);
        loop {
            bits = (bits << 1) | reader.read_bit().expect("bitstream ended mid-codeword") as u64;
            len += 1;
            if let Some(&symbol) = lookup.get(&(len, bits)) {
                out.push(symbol);
                break;
            }
            assert!(len < max_len, "no codeword matches {len} bits");
        }
    }
    out
}

/// Deterministic pseudo-random bytes drawn from a small skewed alphabet.
pub fn skewed_data(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            // Squaring biases toward low symbols
            let r: f64 = rng.gen();
            (r * r * 64.0) as u8
        })
        .collect()
}

/// Deterministic uniformly random bytes.
pub fn random_data(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}
