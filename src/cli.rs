//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains the
//! execution logic for each subcommand: batch cracking, single-key attack,
//! result re-verification, and rayon configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use keybreach::factor;
use keybreach::keyfile;
use keybreach::pipeline::{crack, CrackOptions, Outcome, Strategy};
use keybreach::verify::{self, VerificationResult};
use keybreach::{estimate_digits, PublicKey};
use rayon::prelude::*;
use tracing::{info, warn};

use super::{Cli, StrategyArg};

fn crack_options(cli: &Cli) -> CrackOptions {
    CrackOptions {
        strategy: match cli.strategy {
            StrategyArg::Wiener => Strategy::Wiener,
            StrategyArg::DeWeger => Strategy::DeWeger,
            StrategyArg::Auto => Strategy::Auto,
        },
        max_convergents: cli.max_convergents,
        max_trials: cli.max_trials,
        precision: cli.precision,
    }
}

/// Size the global rayon pool; 0 keeps the default (all cores).
pub fn configure_rayon(threads: usize) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring rayon thread pool")?;
    }
    Ok(())
}

/// Run the pipeline over every pair in a key list, in parallel. Result
/// lines keep the input order regardless of completion order.
pub fn run_crack(cli: &Cli, input: &Path, output: Option<&Path>) -> Result<()> {
    let keys = keyfile::read_key_list(input)?;
    let total = keys.len();
    let opts = crack_options(cli);
    info!(
        keys = total,
        threads = rayon::current_num_threads(),
        "starting batch attack"
    );

    let lines: Vec<String> = keys
        .par_iter()
        .enumerate()
        .map(|(idx, key)| {
            let outcome = crack(key, &opts);
            let line = keyfile::format_outcome(key, &outcome);
            eprintln!(
                "[{}/{}] ({} digit modulus) {}",
                idx + 1,
                total,
                estimate_digits(&key.n),
                line
            );
            line
        })
        .collect();

    let cracked = lines.iter().filter(|l| l.starts_with("Hacked")).count();
    let not_found = lines.iter().filter(|l| l.starts_with("No d")).count();
    let unfactored = lines.iter().filter(|l| l.starts_with("Found d")).count();
    let unverified = lines.iter().filter(|l| l.starts_with("Unverified")).count();
    info!(cracked, not_found, unfactored, unverified, "batch attack complete");

    match output {
        Some(path) => {
            let mut text = lines.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            fs::write(path, text)
                .with_context(|| format!("writing results to {}", path.display()))?;
            info!(path = %path.display(), "results written");
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Attack one key given as command-line integers.
pub fn run_single(cli: &Cli, e: &str, n: &str) -> Result<()> {
    let key = PublicKey::new(keyfile::parse_int(e)?, keyfile::parse_int(n)?);
    let outcome = crack(&key, &crack_options(cli));
    println!("{}", keyfile::format_outcome(&key, &outcome));
    if let Outcome::Cracked { p, q, .. } = &outcome {
        println!("p={}", p);
        println!("q={}", q);
    }
    Ok(())
}

/// Re-verify each `Hacked d=` line of a result file: factor n from the
/// recorded exponent, then run the round-trip checks.
pub fn run_recheck(cli: &Cli, input: &Path) -> Result<()> {
    let records = keyfile::read_result_list(input)?;
    if records.is_empty() {
        warn!(path = %input.display(), "no `Hacked d=` lines found");
    }
    for (idx, rec) in records.iter().enumerate() {
        let line = match factor::factor_from_d(&rec.e, &rec.d, &rec.n, cli.max_trials) {
            Ok(pair) => match verify::verify(&pair.p, &pair.q, &rec.e, &rec.d, &rec.n) {
                VerificationResult::Verified => format!(
                    "Pair {}: Verified d={} for e={}, n={}",
                    idx + 1,
                    rec.d,
                    rec.e,
                    rec.n
                ),
                VerificationResult::Unverified(reason) => format!(
                    "Pair {}: Failed to verify d={} for e={}, n={} ({})",
                    idx + 1,
                    rec.d,
                    rec.e,
                    rec.n,
                    reason
                ),
            },
            Err(err) => format!(
                "Pair {}: Failed to factor n={} from d={} ({})",
                idx + 1,
                rec.n,
                rec.d,
                err
            ),
        };
        println!("{}", line);
    }
    Ok(())
}
