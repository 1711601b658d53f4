//! Configuration for the parhuff command-line tool.
//!
//! Parses command-line arguments with clap and resolves them into a
//! [`Config`]: file paths, an [`EncoderConfig`] for the core, and display
//! flags.
//!
//! # Philosophy
//!
//! `parhuff encode` works with ZERO arguments: without `--in` it compresses
//! generated sample data, and every derived default is printable with
//! `--print-config` so runs are reproducible.

use clap::{Args, Parser, Subcommand};
use parhuff_core::{ChunkPlan, EncoderConfig, Error, Result};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "parhuff", version, about = "Parallel Huffman encoder")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a file (or generated sample data) into an artifact
    Encode(EncodeArgs),

    /// Print the header, chunk table and codebook of an artifact
    Inspect {
        /// Artifact to read
        #[arg(short, long = "in")]
        input: PathBuf,

        /// Also list every codeword
        #[arg(long)]
        codes: bool,
    },

    /// Write generated sample input to a file
    Sample {
        /// Output file
        #[arg(short, long = "out")]
        output: PathBuf,

        /// Random seed (default: time-based)
        #[arg(long)]
        seed: Option<u64>,

        /// Size in bytes
        #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
        size: usize,
    },
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input file (default: generate sample data)
    #[arg(short, long = "in")]
    pub input: Option<PathBuf>,

    /// Output artifact
    #[arg(short, long = "out", default_value = "./out.hpz")]
    pub output: PathBuf,

    /// Threads for both counting and encoding (default: available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Threads for frequency counting (overrides --workers)
    #[arg(long)]
    pub count_workers: Option<usize>,

    /// Threads in the encoding pool (overrides --workers)
    #[arg(long)]
    pub encode_workers: Option<usize>,

    /// Number of equal chunks, at most one per input byte (default: one per worker)
    #[arg(long, conflicts_with = "chunk_bytes")]
    pub chunks: Option<usize>,

    /// Fixed chunk size in bytes
    #[arg(long)]
    pub chunk_bytes: Option<usize>,

    /// Seed for sample data (default: time-based)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of generated sample data in bytes
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub sample_bytes: usize,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print the compression summary
    #[arg(long)]
    pub no_metrics: bool,
}

/// Default size of generated sample data (1 MiB).
pub const DEFAULT_SAMPLE_BYTES: usize = 1 << 20;

/// Where the bytes to compress come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Sample { seed: u64, size: usize },
}

/// Complete configuration for an encode run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// Input bytes
    pub input: InputSource,

    /// Output artifact path
    pub output_file: PathBuf,

    // === Encoder ===
    pub encoder: EncoderConfig,

    // === Behavior ===
    /// Whether to print the resolved config
    pub print_config: bool,

    /// Whether to print the compression summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve `encode` arguments into a validated configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if a worker count or chunk setting is zero.
    pub fn from_args(args: EncodeArgs) -> Result<Self> {
        let defaults = EncoderConfig::default();
        let workers = args.workers.unwrap_or(defaults.counting_workers);

        let chunking = match (args.chunks, args.chunk_bytes) {
            (_, Some(bytes)) => ChunkPlan::Size(bytes),
            (Some(count), None) => ChunkPlan::Count(count),
            (None, None) => ChunkPlan::Count(workers),
        };

        let encoder = EncoderConfig {
            counting_workers: args.count_workers.unwrap_or(workers),
            encoding_workers: args.encode_workers.unwrap_or(workers),
            chunking,
        };
        encoder.validate()?;

        let input = match args.input {
            Some(path) => InputSource::File(path),
            None => {
                if args.sample_bytes == 0 {
                    return Err(Error::Config("sample size must be positive".into()));
                }
                InputSource::Sample {
                    seed: args.seed.unwrap_or_else(time_seed),
                    size: args.sample_bytes,
                }
            }
        };

        Ok(Config {
            input,
            output_file: args.output,
            encoder,
            print_config: args.print_config,
            print_metrics: !args.no_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.input {
            InputSource::File(path) => println!("Input file:  {}", path.display()),
            InputSource::Sample { seed, size } => {
                println!("Input:       generated sample, {size} bytes (seed {seed})")
            }
        }
        println!("Output file: {}", self.output_file.display());
        println!();
        println!("=== Encoder ===");
        println!("Counting workers: {}", self.encoder.counting_workers);
        println!("Encoding workers: {}", self.encoder.encoding_workers);
        match self.encoder.chunking {
            ChunkPlan::Count(n) => println!("Chunks: {n} (equal split)"),
            ChunkPlan::Size(bytes) => {
                println!("Chunk size: {} bytes ({} KiB)", bytes, bytes / 1024)
            }
        }
        println!();
    }
}

/// Seed derived from the wall clock, for runs without `--seed`.
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_encode(args: &[&str]) -> EncodeArgs {
        let cli = Cli::try_parse_from(["parhuff", "encode"].into_iter().chain(args.iter().copied())).unwrap();
        match cli.command {
            Commands::Encode(args) => args,
            other => panic!("expected encode, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_generate_sample() {
        let config = Config::from_args(parse_encode(&["--seed", "42"])).unwrap();

        assert_eq!(
            config.input,
            InputSource::Sample {
                seed: 42,
                size: DEFAULT_SAMPLE_BYTES
            }
        );
        assert_eq!(config.output_file, PathBuf::from("./out.hpz"));
        assert!(config.print_metrics);
        assert_eq!(
            config.encoder.chunking,
            ChunkPlan::Count(config.encoder.counting_workers)
        );
    }

    #[test]
    fn test_worker_overrides() {
        let config = Config::from_args(parse_encode(&[
            "--in",
            "data.bin",
            "-w",
            "4",
            "--encode-workers",
            "8",
        ]))
        .unwrap();

        assert_eq!(config.input, InputSource::File(PathBuf::from("data.bin")));
        assert_eq!(config.encoder.counting_workers, 4);
        assert_eq!(config.encoder.encoding_workers, 8);
        assert_eq!(config.encoder.chunking, ChunkPlan::Count(4));
    }

    #[test]
    fn test_chunk_bytes() {
        let config = Config::from_args(parse_encode(&["--chunk-bytes", "65536"])).unwrap();
        assert_eq!(config.encoder.chunking, ChunkPlan::Size(65536));
    }

    #[test]
    fn test_chunks_and_chunk_bytes_conflict() {
        let result = Cli::try_parse_from([
            "parhuff",
            "encode",
            "--chunks",
            "4",
            "--chunk-bytes",
            "100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Config::from_args(parse_encode(&["-w", "0"]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["parhuff", "encode", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
