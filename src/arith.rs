//! Integer square root and the perfect-square oracle.
//!
//! The candidate filter accepts a convergent only when a discriminant is a
//! perfect square, so this check sits on the hot path of every attack. A
//! residue filter mod 16 rejects most non-squares before the Newton
//! iteration runs: squares can only be congruent to 0, 1, 4, or 9 mod 16.

use rug::Integer;

/// Floor of sqrt(n) by Newton's method with integer (floor) division.
///
/// Initial estimate 2^ceil(bits/2) lies above the true root, and the
/// iteration estimate <- (estimate + n/estimate)/2 decreases monotonically
/// until it crosses it; the first non-decreasing step is the answer.
/// Returns 0 for n <= 0.
pub fn isqrt(n: &Integer) -> Integer {
    if *n <= 0u32 {
        return Integer::new();
    }
    let bits = n.significant_bits();
    let mut estimate = Integer::from(1u32) << ((bits + 1) / 2);
    loop {
        let next = (Integer::from(n / &estimate) + &estimate) >> 1u32;
        if next >= estimate {
            return estimate;
        }
        estimate = next;
    }
}

/// Whether n is a perfect square. Negative n is never a square; 0 is.
pub fn is_perfect_square(n: &Integer) -> bool {
    if *n < 0u32 {
        return false;
    }
    if !matches!(n.mod_u(16), 0 | 1 | 4 | 9) {
        return false;
    }
    let root = isqrt(n);
    Integer::from(&root * &root) == *n
}
