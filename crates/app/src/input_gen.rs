//! Sample input generation.
//!
//! When no input file is given, the encoder compresses generated data whose
//! symbol statistics vary from section to section, so both the code shape
//! and the compression ratio are worth looking at.
//!
//! # Sections
//!
//! - Prose: words drawn from a small vocabulary (text-like, ~4-5 bits/symbol)
//! - Runs: long repeats of one byte (close to 1 bit/symbol)
//! - Skewed: bytes biased toward a narrow range
//! - Noise: uniform random bytes (incompressible)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// Section length upper bound in bytes.
const SECTION_BYTES: usize = 8192;

const WORDS: &[&str] = &[
    "the", "of", "and", "a", "to", "in", "is", "that", "for", "it", "with", "as", "was", "on",
    "chunk", "symbol", "worker", "code", "tree", "frequency", "bits", "queue", "thread",
];

/// Generate `size_bytes` of sample data, reproducible from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(rng.gen_range(1..=SECTION_BYTES));

        match rng.gen_range(0..10u8) {
            // 40% prose
            0..=3 => push_prose(&mut rng, &mut data, section),

            // 20% runs
            4..=5 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }

            // 30% skewed
            6..=8 => {
                let base: u8 = rng.gen();
                for _ in 0..section {
                    let r: f64 = rng.gen();
                    data.push(base.wrapping_add((r * r * 32.0) as u8));
                }
            }

            // 10% noise
            _ => {
                let start = data.len();
                data.resize(start + section, 0);
                rng.fill(&mut data[start..]);
            }
        }
    }

    data.truncate(size_bytes);
    data
}

fn push_prose(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, section: usize) {
    let end = data.len() + section;
    while data.len() < end {
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        data.extend_from_slice(word.as_bytes());
        data.push(if rng.gen_ratio(1, 12) { b'\n' } else { b' ' });
    }
    data.truncate(end);
}

/// Write generated data to a file.
pub fn write_sample_file(path: &Path, seed: u64, size_bytes: usize) -> std::io::Result<()> {
    std::fs::write(path, generate_sample_data(seed, size_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let data1 = generate_sample_data(12345, 50_000);
        let data2 = generate_sample_data(12345, 50_000);

        assert_eq!(data1, data2);
    }

    #[test]
    fn test_different_seeds() {
        let data1 = generate_sample_data(1, 10_000);
        let data2 = generate_sample_data(2, 10_000);

        assert_ne!(data1, data2);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 1000, 10_000, 100_000] {
            let data = generate_sample_data(999, size);
            assert_eq!(data.len(), size);
        }
    }

    #[test]
    fn test_sample_has_rich_alphabet() {
        let data = generate_sample_data(7, 200_000);
        let mut seen = [false; 256];
        for &b in &data {
            seen[b as usize] = true;
        }
        // Mixed sections still leave a rich alphabet
        assert!(seen.iter().filter(|&&s| s).count() > 32);
    }
}
