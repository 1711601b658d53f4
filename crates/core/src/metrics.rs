//! Statistics for one compression run.
//!
//! [`CompressionStats`] is filled in by the pipeline as each stage finishes:
//! sizes, code shape, and how long every stage took.
//!
//! # Thread Safety
//!
//! The struct is only written by the thread driving the pipeline; workers
//! never touch it.

use std::time::Duration;

/// Sizes, code shape and stage timings of a compression run.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    // === Input/Output ===
    /// Bytes of input
    pub input_bytes: u64,

    /// Bytes of the serialized artifact (header + codebook + payload)
    pub artifact_bytes: u64,

    /// Meaningful payload bits (padding excluded)
    pub payload_bits: u64,

    // === Work split ===
    /// Number of chunks the input was split into
    pub chunks: u64,

    /// Threads used for frequency counting
    pub counting_workers: usize,

    /// Threads used for encoding
    pub encoding_workers: usize,

    // === Code shape ===
    /// Symbols with a non-zero count
    pub distinct_symbols: usize,

    /// Longest codeword in bits
    pub max_code_len: u8,

    // === Timing ===
    pub count_time: Duration,
    pub build_time: Duration,
    pub encode_time: Duration,
    pub assemble_time: Duration,
}

impl CompressionStats {
    /// Wall time across all stages.
    pub fn total_time(&self) -> Duration {
        self.count_time + self.build_time + self.encode_time + self.assemble_time
    }

    /// Compute compression ratio (artifact / input).
    ///
    /// Returns 0.0 if there was no input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.artifact_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Average payload bits per input symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.input_bytes as f64
        }
    }

    /// Compute throughput in bytes/second.
    pub fn throughput_bps(&self) -> f64 {
        let secs = self.total_time().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Compression Summary ===");
        println!("Input:    {} bytes ({:.2} MiB)", self.input_bytes, mib(self.input_bytes));
        println!("Artifact: {} bytes ({:.2} MiB)", self.artifact_bytes, mib(self.artifact_bytes));
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Bits/symbol: {:.3}", self.bits_per_symbol());
        println!();

        println!("=== Code ===");
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Longest codeword: {} bits", self.max_code_len);
        println!();

        println!("=== Work ===");
        println!("Chunks: {}", self.chunks);
        println!("Counting workers: {}", self.counting_workers);
        println!("Encoding workers: {}", self.encoding_workers);
        println!();

        println!("=== Timing ===");
        println!("Count:    {:?}", self.count_time);
        println!("Build:    {:?}", self.build_time);
        println!("Encode:   {:?}", self.encode_time);
        println!("Assemble: {:?}", self.assemble_time);
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export stats as a simple key=value text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "input_bytes={}\n\
             artifact_bytes={}\n\
             payload_bits={}\n\
             compression_ratio={:.4}\n\
             bits_per_symbol={:.4}\n\
             chunks={}\n\
             distinct_symbols={}\n\
             max_code_len={}\n\
             total_ms={}\n",
            self.input_bytes,
            self.artifact_bytes,
            self.payload_bits,
            self.compression_ratio(),
            self.bits_per_symbol(),
            self.chunks,
            self.distinct_symbols,
            self.max_code_len,
            self.total_time().as_millis(),
        )
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_ratio() {
        let stats = CompressionStats {
            input_bytes: 1000,
            artifact_bytes: 750,
            ..Default::default()
        };
        assert_eq!(stats.compression_ratio(), 0.75);
    }

    #[test]
    fn test_empty_input_ratios() {
        let stats = CompressionStats::default();
        assert_eq!(stats.compression_ratio(), 0.0);
        assert_eq!(stats.bits_per_symbol(), 0.0);
        assert_eq!(stats.throughput_bps(), 0.0);
    }

    #[test]
    fn test_bits_per_symbol() {
        let stats = CompressionStats {
            input_bytes: 6,
            payload_bits: 9,
            ..Default::default()
        };
        assert_eq!(stats.bits_per_symbol(), 1.5);
    }

    #[test]
    fn test_total_time() {
        let stats = CompressionStats {
            count_time: Duration::from_millis(2),
            build_time: Duration::from_millis(1),
            encode_time: Duration::from_millis(5),
            assemble_time: Duration::from_millis(2),
            ..Default::default()
        };
        assert_eq!(stats.total_time(), Duration::from_millis(10));
    }

    #[test]
    fn test_export_text() {
        let stats = CompressionStats {
            input_bytes: 1000,
            artifact_bytes: 600,
            chunks: 4,
            ..Default::default()
        };

        let text = stats.export_text();
        assert!(text.contains("input_bytes=1000"));
        assert!(text.contains("artifact_bytes=600"));
        assert!(text.contains("chunks=4"));
        assert!(text.contains("compression_ratio=0.6000"));
    }
}
