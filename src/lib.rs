pub mod arith;
pub mod cf;
pub mod factor;
pub mod keyfile;
pub mod pipeline;
pub mod verify;
pub mod wiener;

use rand::Rng;
use rug::rand::RandState;
use rug::Integer;

/// An RSA public key (e, n) under attack. n = p*q for two distinct primes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub e: Integer,
    pub n: Integer,
}

impl PublicKey {
    pub fn new(e: Integer, n: Integer) -> Self {
        PublicKey { e, n }
    }
}

/// A fresh GMP random state seeded from the thread-local OS-backed RNG.
///
/// Every randomized operation (witness search, verifier message draw) seeds
/// its own state, so concurrent attacks on different keys never share or
/// race on random state.
pub(crate) fn fresh_rand_state() -> RandState<'static> {
    let mut state = RandState::new();
    state.seed(&Integer::from(rand::thread_rng().gen::<u128>()));
    state
}

/// Estimate decimal digit count from bit length, avoiding expensive to_string conversion.
pub fn estimate_digits(n: &Integer) -> u64 {
    let bits = n.significant_bits();
    if bits == 0 {
        return 1;
    }
    (bits as f64 * std::f64::consts::LOG10_2) as u64 + 1
}
