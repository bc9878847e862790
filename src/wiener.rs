//! The candidate filter: Wiener's attack and the de Weger extension.
//!
//! Both variants walk the convergents k/d of a continued-fraction expansion
//! and test each denominator as a candidate private exponent. For a genuine
//! pair, e*d - 1 = k*phi(n), so phi(n) can be read off a correct convergent;
//! the candidate is accepted when the quadratic x^2 - s*x + n with
//! s = n - phi + 1 has an integer root, i.e. (s/2)^2 - n is a perfect
//! square. That certifies p + q = s and p*q = n are simultaneously solvable.
//!
//! Classical Wiener expands e/n exactly and is sound for d < n^(1/4)/3.
//! de Weger expands e / (n + 1 - 2*sqrt(n)) — a sharper approximation of
//! e/phi(n) — which extends the recoverable range, at the cost of needing
//! sqrt(n) to at least twice the bit length of n (see `cf::RealTerms`).

use rug::{Float, Integer};

use crate::arith::is_perfect_square;
use crate::cf::{Convergents, RatioTerms, RealTerms};

/// Default cap on the number of convergents examined before giving up.
pub const DEFAULT_MAX_CONVERGENTS: usize = 10_000;

/// MPFR precision in bits satisfying the de Weger soundness contract:
/// twice the bit length of n, with a floor for tiny moduli.
pub fn de_weger_precision(n: &Integer) -> u32 {
    (2 * n.significant_bits()).max(128)
}

/// Test convergents (k, d) of a term stream against the key (e, n).
/// Returns the first accepted candidate exponent.
fn search_convergents<I>(e: &Integer, n: &Integer, terms: I, max_convergents: usize) -> Option<Integer>
where
    I: Iterator<Item = Integer>,
{
    for (idx, (k, d)) in Convergents::new(terms).enumerate() {
        if idx >= max_convergents {
            break;
        }
        if k == 0u32 {
            continue;
        }
        let ed_minus_1 = Integer::from(e * &d) - 1u32;
        if !ed_minus_1.is_divisible(&k) {
            continue;
        }
        let phi_candidate = Integer::from(&ed_minus_1 / &k);
        let s = Integer::from(n - &phi_candidate) + 1u32;
        if s.is_odd() {
            continue;
        }
        let half = s >> 1u32;
        let discriminant = Integer::from(&half * &half) - n;
        if discriminant >= 0u32 && is_perfect_square(&discriminant) {
            return Some(d);
        }
    }
    None
}

/// Classical Wiener: recover d from the exact continued fraction of e/n.
///
/// Sound when d < n^(1/4)/3. Returns None when no convergent within the cap
/// passes the filter — the key is simply not vulnerable to this variant.
pub fn recover_d(e: &Integer, n: &Integer, max_convergents: usize) -> Option<Integer> {
    if *n == 0u32 {
        return None;
    }
    search_convergents(
        e,
        n,
        RatioTerms::new(e.clone(), n.clone()),
        max_convergents,
    )
}

/// de Weger variant: recover d from the real continued fraction of
/// e / (n + 1 - 2*sqrt(n)).
///
/// `precision` is the MPFR working precision in bits and must be at least
/// twice the bit length of n (`de_weger_precision`); a smaller value
/// silently corrupts the term stream rather than raising an error.
pub fn recover_d_de_weger(
    e: &Integer,
    n: &Integer,
    max_convergents: usize,
    precision: u32,
) -> Option<Integer> {
    if *n <= 1u32 {
        return None;
    }
    let n_f = Float::with_val(precision, n);
    let sqrt_n = n_f.clone().sqrt();
    // (sqrt(n) - 1)^2, zero only for n = 1 which is excluded above
    let denom = n_f + 1u32 - sqrt_n * 2u32;
    if !(denom > 0u32) {
        return None;
    }
    let alpha = Float::with_val(precision, e) / denom;
    search_convergents(e, n, RealTerms::new(alpha, max_convergents), max_convergents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(s: &str) -> Integer {
        Integer::parse(s).map(Integer::from).unwrap()
    }

    // 64-bit primes p=12328471242484988471, q=16017588444754909949, d chosen
    // under the n^(1/4)/3 bound; the accepting convergent sits at index 31.
    const N64: &str = "197472378515120758773475138403908197979";
    const E64: &str = "122403494799228381431725349581317093959";
    const D64: &str = "1102569679";

    // 128-bit primes, same construction.
    const N128: &str = "83621760282514065935485322146333899149403253404218100396571900597180439081599";
    const E128: &str = "59515965574757648956213148242091491361791814603468162462341359320018306826139";
    const D128: &str = "1209126829425027859";

    // p and q adjacent (|p - q| small), d above the classical bound: only
    // the de Weger expansion recovers it.
    const N_CLOSE: &str = "99540086655403300501106502854819365433";
    const E_CLOSE: &str = "1031160459447018547102815692664873643";
    const D_CLOSE: &str = "159378795607";

    // ---- classical Wiener ----

    #[test]
    fn recovers_small_exponent_128_bit_modulus() {
        let d = recover_d(&int(E64), &int(N64), DEFAULT_MAX_CONVERGENTS);
        assert_eq!(d, Some(int(D64)));
    }

    #[test]
    fn recovers_small_exponent_256_bit_modulus() {
        let d = recover_d(&int(E128), &int(N128), DEFAULT_MAX_CONVERGENTS);
        assert_eq!(d, Some(int(D128)));
    }

    #[test]
    fn convergent_cap_cuts_search_short() {
        // The accepting convergent for this key is index 31
        assert_eq!(recover_d(&int(E64), &int(N64), 2), None);
        assert_eq!(recover_d(&int(E64), &int(N64), 32), Some(int(D64)));
    }

    #[test]
    fn common_public_exponent_is_not_vulnerable() {
        // e = 65537 pairs with a large d; no convergent passes the filter
        assert_eq!(
            recover_d(&Integer::from(65537u32), &int(N64), DEFAULT_MAX_CONVERGENTS),
            None
        );
        assert_eq!(
            recover_d(&Integer::from(3u32), &int(N64), DEFAULT_MAX_CONVERGENTS),
            None
        );
    }

    #[test]
    fn zero_modulus_is_rejected() {
        assert_eq!(
            recover_d(&Integer::from(17u32), &Integer::new(), DEFAULT_MAX_CONVERGENTS),
            None
        );
    }

    // ---- de Weger ----

    #[test]
    fn toy_key_needs_de_weger() {
        // p=61, q=53, phi=3120, d=17, e = d^-1 mod phi = 2753.
        // d = 17 exceeds n^(1/4)/3 ~ 2.5, so the classical expansion of
        // e/n has no accepting convergent; the sharper approximation does.
        let e = Integer::from(2753u32);
        let n = Integer::from(3233u32);
        assert_eq!(recover_d(&e, &n, DEFAULT_MAX_CONVERGENTS), None);
        let d = recover_d_de_weger(&e, &n, DEFAULT_MAX_CONVERGENTS, de_weger_precision(&n));
        assert_eq!(d, Some(Integer::from(17u32)));
    }

    #[test]
    fn close_primes_large_d_needs_de_weger() {
        let (e, n) = (int(E_CLOSE), int(N_CLOSE));
        assert_eq!(recover_d(&e, &n, DEFAULT_MAX_CONVERGENTS), None);
        let d = recover_d_de_weger(&e, &n, DEFAULT_MAX_CONVERGENTS, de_weger_precision(&n));
        assert_eq!(d, Some(int(D_CLOSE)));
    }

    #[test]
    fn de_weger_also_recovers_classical_cases() {
        let (e, n) = (int(E64), int(N64));
        let d = recover_d_de_weger(&e, &n, DEFAULT_MAX_CONVERGENTS, de_weger_precision(&n));
        assert_eq!(d, Some(int(D64)));
    }

    #[test]
    fn de_weger_precision_floor_and_scaling() {
        assert_eq!(de_weger_precision(&Integer::from(3233u32)), 128);
        let n = int(N128);
        assert_eq!(de_weger_precision(&n), 2 * n.significant_bits());
    }
}
