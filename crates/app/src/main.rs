//! parhuff: parallel Huffman encoder command-line tool.
//!
//! Reads a file (or generates sample data), hands the bytes to
//! `parhuff-core`, and writes the resulting artifact. All failures are
//! reported on stderr with a non-zero exit status.

mod config;
mod input_gen;

use clap::Parser;
use config::{Cli, Commands, Config, InputSource};
use parhuff_core::{Artifact, Encoder, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode(args) => Config::from_args(args).and_then(|config| encode(&config)),
        Commands::Inspect { input, codes } => inspect(&input, codes),
        Commands::Sample { output, seed, size } => sample(&output, seed, size),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Install the logger. `RUST_LOG` overrides the level chosen by `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn encode(config: &Config) -> Result<()> {
    if config.print_config {
        config.print();
    }

    let data: Arc<[u8]> = match &config.input {
        InputSource::File(path) => {
            log::info!("reading {}", path.display());
            Arc::from(std::fs::read(path)?)
        }
        InputSource::Sample { seed, size } => {
            log::info!("generating {size} bytes of sample data (seed {seed})");
            Arc::from(input_gen::generate_sample_data(*seed, *size))
        }
    };

    let encoder = Encoder::new(config.encoder)?;
    let compressed = encoder.compress_shared(data)?;

    std::fs::write(&config.output_file, compressed.artifact.to_bytes())?;
    log::info!("wrote {}", config.output_file.display());

    if config.print_metrics {
        compressed.stats.print_summary();
    }
    println!(
        "compressed {} bytes -> {} bytes ({})",
        compressed.stats.input_bytes,
        compressed.stats.artifact_bytes,
        config.output_file.display()
    );
    Ok(())
}

fn inspect(path: &Path, show_codes: bool) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let artifact = Artifact::from_bytes(&bytes)?;

    println!("=== Artifact: {} ===", path.display());
    println!("Size: {} bytes", bytes.len());
    println!("Symbols encoded: {}", artifact.original_len);
    println!("Codebook entries: {}", artifact.codes.len());
    println!("Longest codeword: {} bits", artifact.codes.max_len());
    println!(
        "Payload: {} bytes ({} bits, {} padding)",
        artifact.payload.len(),
        artifact.bit_len(),
        artifact.pad_bits
    );
    println!();

    println!("=== Chunks ({}) ===", artifact.chunks.len());
    for (i, chunk) in artifact.chunks.iter().enumerate() {
        println!("{i:>6}: {:>12} symbols {:>14} bits", chunk.symbols, chunk.bits);
    }

    if show_codes {
        println!();
        println!("=== Codebook ===");
        for (symbol, code) in artifact.codes.iter() {
            println!("{symbol:#04x} {:>3} {code}", code.len());
        }
    }
    Ok(())
}

fn sample(path: &Path, seed: Option<u64>, size: usize) -> Result<()> {
    let seed = seed.unwrap_or_else(config::time_seed);
    input_gen::write_sample_file(path, seed, size)?;
    println!("wrote {size} bytes of sample data to {} (seed {seed})", path.display());
    Ok(())
}
