//! Round-trip verification of a recovered key.
//!
//! A recovery is only reported as cracked after three checks: the factors
//! multiply back to the modulus, the exponents are inverses modulo
//! (p-1)(q-1), and a random message survives encrypt-then-decrypt. The
//! message draw uses its own seeded random state per invocation, like the
//! witness search.

use std::fmt;

use rug::rand::RandState;
use rug::Integer;

/// Outcome of verifying (p, q, e, d, n).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Verified,
    Unverified(UnverifiedReason),
}

/// The first check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnverifiedReason {
    /// p*q != n, or p and q are not two distinct nontrivial factors.
    ModulusMismatch,
    /// e*d is not 1 modulo (p-1)(q-1).
    InverseMismatch,
    /// (m^e)^d did not reproduce m modulo n.
    RoundTripMismatch,
}

impl fmt::Display for UnverifiedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnverifiedReason::ModulusMismatch => write!(f, "p*q does not equal n"),
            UnverifiedReason::InverseMismatch => {
                write!(f, "e*d is not 1 mod (p-1)(q-1)")
            }
            UnverifiedReason::RoundTripMismatch => write!(f, "message round trip failed"),
        }
    }
}

/// Verify a recovered factorization and exponent with a fresh random source.
pub fn verify(
    p: &Integer,
    q: &Integer,
    e: &Integer,
    d: &Integer,
    n: &Integer,
) -> VerificationResult {
    let mut rng = crate::fresh_rand_state();
    verify_seeded(p, q, e, d, n, &mut rng)
}

/// Verification with a caller-supplied random state; the message m is drawn
/// uniformly from [2, n-2].
pub fn verify_seeded(
    p: &Integer,
    q: &Integer,
    e: &Integer,
    d: &Integer,
    n: &Integer,
    rng: &mut RandState,
) -> VerificationResult {
    if *p <= 1u32 || *q <= 1u32 || p == q || Integer::from(p * q) != *n {
        return VerificationResult::Unverified(UnverifiedReason::ModulusMismatch);
    }
    let phi = Integer::from(p - 1u32) * Integer::from(q - 1u32);
    if Integer::from(e * d) % &phi != 1u32 {
        return VerificationResult::Unverified(UnverifiedReason::InverseMismatch);
    }
    // smallest valid modulus is 2*3 = 6, so n - 3 >= 3 and the range is nonempty
    let mut m = Integer::from(n - 3u32).random_below(rng);
    m += 2u32;
    let ciphertext = match m.clone().pow_mod(e, n) {
        Ok(c) => c,
        Err(_) => return VerificationResult::Unverified(UnverifiedReason::RoundTripMismatch),
    };
    let plaintext = match ciphertext.pow_mod(d, n) {
        Ok(m2) => m2,
        Err(_) => return VerificationResult::Unverified(UnverifiedReason::RoundTripMismatch),
    };
    if plaintext == m {
        VerificationResult::Verified
    } else {
        VerificationResult::Unverified(UnverifiedReason::RoundTripMismatch)
    }
}
