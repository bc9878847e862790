//! Continued-fraction term streams and their convergents.
//!
//! Two term sources feed the attack. `RatioTerms` expands an exact fraction
//! num/denom by the Euclidean algorithm and always terminates. `RealTerms`
//! expands an arbitrary-precision real (MPFR `Float`) and is capped by an
//! iteration budget, since an irrational value never terminates on its own.
//!
//! `Convergents` consumes either stream and yields the rational
//! approximations p_i/q_i of the truncated fraction. Each stream instance
//! owns its full state; restarting an expansion means constructing a fresh
//! instance, and two instances never share anything.
//!
//! Precision contract for `RealTerms`: the attack on e / (n + 1 - 2*sqrt(n))
//! needs the input `Float` built with at least twice the bit length of n.
//! Below that, the expansion silently produces wrong terms after some index.
//! There is no runtime signal; callers own the precision choice.

use rug::{Float, Integer};

/// Terms of the continued fraction of num/denom, by the Euclidean algorithm.
///
/// Emits floor(num/denom), then swaps in (denom, num mod denom). Finite:
/// ends exactly when the remainder reaches zero.
pub struct RatioTerms {
    num: Integer,
    denom: Integer,
}

impl RatioTerms {
    pub fn new(num: Integer, denom: Integer) -> Self {
        RatioTerms { num, denom }
    }
}

impl Iterator for RatioTerms {
    type Item = Integer;

    fn next(&mut self) -> Option<Integer> {
        if self.denom == 0u32 {
            return None;
        }
        let term = Integer::from(&self.num / &self.denom);
        let rem = Integer::from(&self.num % &self.denom);
        self.num = std::mem::replace(&mut self.denom, rem);
        Some(term)
    }
}

/// Terms of the continued fraction of a high-precision real.
///
/// Emits floor(r), then recurses on 1/(r - floor(r)). Stops when the
/// fractional part is exactly zero or after `cap` terms, whichever comes
/// first. See the module docs for the precision contract.
pub struct RealTerms {
    r: Float,
    remaining: usize,
    done: bool,
}

impl RealTerms {
    pub fn new(value: Float, cap: usize) -> Self {
        RealTerms {
            r: value,
            remaining: cap,
            done: false,
        }
    }
}

impl Iterator for RealTerms {
    type Item = Integer;

    fn next(&mut self) -> Option<Integer> {
        if self.done || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let floor = self.r.clone().floor();
        // to_integer is None only for inf/nan, which a degenerate input
        // (e.g. reciprocal of an underflowed fraction) can produce
        let term = floor.to_integer()?;
        let frac = self.r.clone() - &floor;
        if frac.is_zero() {
            self.done = true;
        } else {
            self.r = frac.recip();
        }
        Some(term)
    }
}

/// Convergents p_i/q_i of a term stream.
///
/// Standard recurrence with priors p_{-2}=0, p_{-1}=1, q_{-2}=1, q_{-1}=0:
/// p_i = a_i*p_{i-1} + p_{i-2}, q_i = a_i*q_{i-1} + q_{i-2}. Yields one
/// (p_i, q_i) pair per term.
pub struct Convergents<I> {
    terms: I,
    p_prev2: Integer,
    p_prev: Integer,
    q_prev2: Integer,
    q_prev: Integer,
}

impl<I> Convergents<I>
where
    I: Iterator<Item = Integer>,
{
    pub fn new(terms: I) -> Self {
        Convergents {
            terms,
            p_prev2: Integer::new(),
            p_prev: Integer::from(1u32),
            q_prev2: Integer::from(1u32),
            q_prev: Integer::new(),
        }
    }
}

impl<I> Iterator for Convergents<I>
where
    I: Iterator<Item = Integer>,
{
    type Item = (Integer, Integer);

    fn next(&mut self) -> Option<(Integer, Integer)> {
        let a = self.terms.next()?;
        let p = Integer::from(&a * &self.p_prev) + &self.p_prev2;
        let q = Integer::from(&a * &self.q_prev) + &self.q_prev2;
        self.p_prev2 = std::mem::replace(&mut self.p_prev, p.clone());
        self.q_prev2 = std::mem::replace(&mut self.q_prev, q.clone());
        Some((p, q))
    }
}
