//! Exact rationals
//!
//! Only what the lattice code needs: Gram-Schmidt coefficients, exact
//! comparisons for the Lovász test, and rounding for size reduction and
//! nearest-plane steps. Values are kept in lowest terms with a positive
//! denominator so `==` is structural.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl Rational {
    /// `num / den` in lowest terms
    ///
    /// # Panics
    /// Panics if `den` is zero.
    pub fn new(num: BigInt, den: BigInt) -> Self {
        assert!(!den.is_zero(), "Rational with zero denominator");
        if num.is_zero() {
            return Self::zero();
        }
        let g = num.gcd(&den);
        let (mut numerator, mut denominator) = (num / &g, den / &g);
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        Self { numerator, denominator }
    }

    pub fn from_int<T: Into<BigInt>>(n: T) -> Self {
        Self {
            numerator: n.into(),
            denominator: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_int(BigInt::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// `|self| > 1/2`
    pub fn exceeds_half(&self) -> bool {
        (&self.numerator * 2u32).abs() > self.denominator
    }

    /// Nearest integer, ties away from zero
    ///
    /// round(a/b) = sign(a) · floor((2|a| + b) / 2b)
    pub fn round(&self) -> BigInt {
        let twice_den = &self.denominator * 2u32;
        let magnitude = (self.numerator.abs() * 2u32 + &self.denominator).div_floor(&twice_den);
        if self.numerator.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Lossy conversion for enumeration radii
    pub fn to_f64(&self) -> f64 {
        ratio_to_f64(&self.numerator, &self.denominator)
    }
}

/// `num / den` as f64 without overflowing on huge operands
pub(crate) fn ratio_to_f64(num: &BigInt, den: &BigInt) -> f64 {
    // Keep the top 64 bits of each side and fold the exponent back in.
    let top_bits = |x: &BigInt| -> (f64, i64) {
        let excess = (x.bits() as i64 - 64).max(0);
        let top: BigInt = x >> excess as usize;
        (top.to_f64().unwrap_or(0.0), excess)
    };
    let (n, en) = top_bits(num);
    let (d, ed) = top_bits(den);
    if d == 0.0 {
        return 0.0;
    }
    (n / d) * 2f64.powi((en - ed).clamp(-4096, 4096) as i32)
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Rational {
        Rational::new(
            &self.numerator * &rhs.denominator + &rhs.numerator * &self.denominator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Rational {
        self + &-rhs
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Rational {
        Rational::new(&self.numerator * &rhs.numerator, &self.denominator * &rhs.denominator)
    }
}

impl Mul<&BigInt> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &BigInt) -> Rational {
        Rational::new(&self.numerator * rhs, self.denominator.clone())
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Rational {
        Rational::new(&self.numerator * &rhs.denominator, &self.denominator * &rhs.numerator)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_arithmetic() {
        let (a, b) = (q(1, 2), q(1, 3));
        assert_eq!(&a + &b, q(5, 6));
        assert_eq!(&a - &b, q(1, 6));
        assert_eq!(&a * &b, q(1, 6));
        assert_eq!(&a / &b, q(3, 2));
        assert_eq!(-&a, q(-1, 2));
        assert_eq!(&a * &BigInt::from(4), q(2, 1));
    }

    #[test]
    fn test_lowest_terms() {
        assert_eq!(q(4, 8), q(1, 2));
        assert_eq!(q(3, -6), q(-1, 2));
        assert_eq!(q(0, -5), Rational::zero());
    }

    #[test]
    fn test_round_ties_away_from_zero() {
        assert_eq!(q(5, 2).round(), BigInt::from(3));
        assert_eq!(q(-5, 2).round(), BigInt::from(-3));
        assert_eq!(q(7, 3).round(), BigInt::from(2));
        assert_eq!(q(-7, 3).round(), BigInt::from(-2));
        assert_eq!(q(1, 3).round(), BigInt::from(0));
        assert_eq!(q(-8, 4).round(), BigInt::from(-2));
    }

    #[test]
    fn test_half_and_ordering() {
        assert!(q(2, 3).exceeds_half());
        assert!(q(-3, 5).exceeds_half());
        assert!(!q(1, 2).exceeds_half());
        assert!(!q(-1, 2).exceeds_half());
        assert!(q(1, 3) < q(1, 2));
        assert!(q(-1, 2) < q(-1, 3));
    }

    #[test]
    fn test_to_f64_large_operands() {
        let big: BigInt = BigInt::from(1) << 2000;
        let r = Rational::new(&big * 3u32, big);
        assert!((r.to_f64() - 3.0).abs() < 1e-12);
        assert!((q(1, 4).to_f64() - 0.25).abs() < 1e-15);
    }
}
