//! Factor recovery from a known private exponent.
//!
//! k = e*d - 1 is a multiple of the group order, so for a random base g the
//! sequence g^(k/2^t), squared repeatedly, walks down to 1 mod n. If it
//! reaches 1 from a value y that is neither 1 nor n-1, then y is a
//! nontrivial square root of unity and gcd(y - 1, n) splits n. Roughly half
//! of all bases expose such a root, so a small trial budget succeeds with
//! overwhelming probability when d is genuine.

use std::fmt;

use rug::integer::IsPrime;
use rug::rand::RandState;
use rug::Integer;

/// Default number of random bases tried before giving up.
pub const DEFAULT_MAX_TRIALS: u32 = 100;

/// Miller-Rabin rounds used to validate recovered factors.
const MR_ROUNDS: u32 = 25;

/// The recovered prime factors of n, ordered p <= q.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorPair {
    pub p: Integer,
    pub q: Integer,
}

/// Why factor recovery produced no pair. Both cases are ordinary outcomes
/// for keys that were never vulnerable; `Exhausted` does not even imply the
/// exponent is wrong, only that this method failed to split n from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorError {
    /// e*d - 1 is odd (or zero), so the square-root extraction cannot run.
    InvalidInput(&'static str),
    /// Every trial base was discarded without exposing a factor.
    Exhausted,
}

impl fmt::Display for FactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorError::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
            FactorError::Exhausted => write!(f, "witness search exhausted its trial budget"),
        }
    }
}

impl std::error::Error for FactorError {}

/// Recover the factors of n from a candidate exponent, using a fresh
/// independently seeded random source.
pub fn factor_from_d(
    e: &Integer,
    d: &Integer,
    n: &Integer,
    max_trials: u32,
) -> Result<FactorPair, FactorError> {
    let mut rng = crate::fresh_rand_state();
    factor_from_d_seeded(e, d, n, max_trials, &mut rng)
}

/// Witness search with a caller-supplied random state, for deterministic
/// replay in tests. Draws bases uniformly from [2, n-1].
pub fn factor_from_d_seeded(
    e: &Integer,
    d: &Integer,
    n: &Integer,
    max_trials: u32,
    rng: &mut RandState,
) -> Result<FactorPair, FactorError> {
    if *n <= 4u32 {
        return Err(FactorError::InvalidInput("modulus has no two distinct prime factors"));
    }
    let k = Integer::from(e * d) - 1u32;
    if k.is_odd() {
        return Err(FactorError::InvalidInput("e*d - 1 is odd"));
    }
    // k = r * 2^t with r odd; t >= 1 since k is even and nonzero
    let t = match k.find_one(0) {
        Some(t) => t,
        None => return Err(FactorError::InvalidInput("e*d - 1 is zero")),
    };
    let r = Integer::from(&k >> t);
    let n_minus_1 = Integer::from(n - 1u32);

    for _ in 0..max_trials {
        let mut g = Integer::from(n - 2u32).random_below(rng);
        g += 2u32;
        let mut y = match g.pow_mod(&r, n) {
            Ok(y) => y,
            Err(_) => continue,
        };
        if y == 1u32 || y == n_minus_1 {
            continue;
        }
        for _ in 0..t.saturating_sub(1) {
            let x = Integer::from(&y * &y) % n;
            if x == 1u32 {
                // y is a nontrivial square root of unity
                if let Some(pair) = split_on_root(&y, n) {
                    return Ok(pair);
                }
            }
            y = x;
            if y == n_minus_1 {
                break;
            }
        }
    }
    Err(FactorError::Exhausted)
}

/// gcd(y - 1, n) for a nontrivial root y, validated: both cofactors must be
/// prime and multiply back to n.
fn split_on_root(y: &Integer, n: &Integer) -> Option<FactorPair> {
    let p = Integer::from(y - 1u32).gcd(n);
    if p <= 1u32 || p >= *n {
        return None;
    }
    let q = Integer::from(n / &p);
    if Integer::from(&p * &q) != *n
        || p.is_probably_prime(MR_ROUNDS) == IsPrime::No
        || q.is_probably_prime(MR_ROUNDS) == IsPrime::No
    {
        return None;
    }
    let (p, q) = if p <= q { (p, q) } else { (q, p) };
    Some(FactorPair { p, q })
}
