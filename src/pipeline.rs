//! The attack pipeline for a single key: filter, factor, verify.
//!
//! Each stage either advances or terminates the run with an explicit
//! outcome. Nothing here is an error in the Rust sense — a hardened key
//! flowing through produces `ExponentNotFound`, not a failure.

use rug::Integer;

use crate::factor::{self, FactorPair};
use crate::verify::{self, UnverifiedReason, VerificationResult};
use crate::wiener;
use crate::PublicKey;

/// Which continued-fraction expansion feeds the candidate filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Exact expansion of e/n only.
    Wiener,
    /// Real expansion of e / (n + 1 - 2*sqrt(n)) only.
    DeWeger,
    /// Exact expansion first, real expansion as fallback.
    #[default]
    Auto,
}

/// Knobs for one attack invocation.
#[derive(Debug, Clone)]
pub struct CrackOptions {
    pub strategy: Strategy,
    pub max_convergents: usize,
    pub max_trials: u32,
    /// MPFR precision in bits for the de Weger expansion; 0 selects twice
    /// the bit length of n.
    pub precision: u32,
}

impl Default for CrackOptions {
    fn default() -> Self {
        CrackOptions {
            strategy: Strategy::Auto,
            max_convergents: wiener::DEFAULT_MAX_CONVERGENTS,
            max_trials: factor::DEFAULT_MAX_TRIALS,
            precision: 0,
        }
    }
}

impl CrackOptions {
    fn resolved_precision(&self, n: &Integer) -> u32 {
        if self.precision == 0 {
            wiener::de_weger_precision(n)
        } else {
            self.precision
        }
    }
}

/// Terminal state of the pipeline for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exponent recovered, modulus factored, round trip verified.
    Cracked {
        d: Integer,
        p: Integer,
        q: Integer,
    },
    /// No convergent passed the candidate filter within the cap.
    ExponentNotFound,
    /// A candidate exponent was found but the witness search could not
    /// split n from it.
    FactorizationFailed { d: Integer },
    /// Everything lined up except a verification check.
    Unverified {
        d: Integer,
        p: Integer,
        q: Integer,
        reason: UnverifiedReason,
    },
}

/// Run the full pipeline against one public key.
pub fn crack(key: &PublicKey, opts: &CrackOptions) -> Outcome {
    let PublicKey { e, n } = key;
    let recovered = match opts.strategy {
        Strategy::Wiener => wiener::recover_d(e, n, opts.max_convergents),
        Strategy::DeWeger => {
            wiener::recover_d_de_weger(e, n, opts.max_convergents, opts.resolved_precision(n))
        }
        Strategy::Auto => wiener::recover_d(e, n, opts.max_convergents).or_else(|| {
            wiener::recover_d_de_weger(e, n, opts.max_convergents, opts.resolved_precision(n))
        }),
    };
    let Some(d) = recovered else {
        return Outcome::ExponentNotFound;
    };
    let FactorPair { p, q } = match factor::factor_from_d(e, &d, n, opts.max_trials) {
        Ok(pair) => pair,
        Err(_) => return Outcome::FactorizationFailed { d },
    };
    match verify::verify(&p, &q, e, &d, n) {
        VerificationResult::Verified => Outcome::Cracked { d, p, q },
        VerificationResult::Unverified(reason) => Outcome::Unverified { d, p, q, reason },
    }
}
