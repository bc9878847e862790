//! # Main — CLI Entry Point
//!
//! Routes subcommands to the attack pipeline. `crack` runs the full
//! pipeline over every pair in a key list file (rayon-parallel, one
//! independent random source per key), `single` attacks one key given on
//! the command line, and `recheck` re-verifies the `Hacked d=` lines of an
//! earlier result file by factoring and round-tripping each one.
//!
//! ## Global Options
//!
//! - `--strategy`: wiener (exact e/n expansion), de-weger (high-precision
//!   real expansion), or auto (classical first, de Weger fallback).
//! - `--max-convergents`: cap on convergents examined per key.
//! - `--max-trials`: random bases tried by the witness search.
//! - `--precision`: MPFR bits for de Weger (0 = twice the modulus bit length).
//! - `--threads`: Rayon thread pool size (0 = all cores).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "keybreach",
    about = "Recover RSA private exponents vulnerable to continued-fraction attacks"
)]
struct Cli {
    /// Continued-fraction expansion driving the candidate filter
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    strategy: StrategyArg,

    /// Maximum number of convergents examined per key
    #[arg(long, default_value_t = 10_000)]
    max_convergents: usize,

    /// Maximum random bases tried when splitting n from a recovered exponent
    #[arg(long, default_value_t = 100)]
    max_trials: u32,

    /// MPFR precision in bits for the de Weger expansion (0 = twice the modulus bit length)
    #[arg(long, default_value_t = 0)]
    precision: u32,

    /// Rayon thread pool size (0 = all cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Wiener,
    DeWeger,
    Auto,
}

#[derive(Subcommand)]
enum Commands {
    /// Attack every key pair in a key list file (alternating N= / e= lines)
    Crack {
        /// Path to the key list
        #[arg(long)]
        input: PathBuf,
        /// Write result lines here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Attack a single key pair given on the command line
    Single {
        /// Public exponent
        #[arg(long)]
        e: String,
        /// Modulus
        #[arg(long)]
        n: String,
    },
    /// Re-verify the `Hacked d=` lines of an earlier result file
    Recheck {
        /// Path to the result file
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Structured logging: LOG_FORMAT=json for machine consumers, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads)?;

    match &cli.command {
        Commands::Crack { input, output } => cli::run_crack(&cli, input, output.as_deref()),
        Commands::Single { e, n } => cli::run_single(&cli, e, n),
        Commands::Recheck { input } => cli::run_recheck(&cli, input),
    }
}
