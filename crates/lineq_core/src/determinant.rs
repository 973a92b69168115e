//! Exact integer determinant
//!
//! Fraction-free Gaussian elimination (Bareiss). Every intermediate value is
//! a minor of the input, so the divisions below are exact and entries never
//! grow beyond the Hadamard bound.

use crate::lattice::LatticeBasis;
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// Determinant of a square basis, `None` if the basis is not square
pub fn determinant(basis: &LatticeBasis) -> Option<BigInt> {
    if !basis.is_square() {
        return None;
    }
    let n = basis.n;
    let mut m = basis.vectors.clone();
    let mut prev_pivot = BigInt::one();
    let mut negate = false;

    for k in 0..n {
        // Find a non-zero pivot in column k
        if m[k][k].is_zero() {
            match (k + 1..n).find(|&r| !m[r][k].is_zero()) {
                Some(r) => {
                    m.swap(k, r);
                    negate = !negate;
                }
                None => return Some(BigInt::zero()),
            }
        }

        for i in k + 1..n {
            for j in k + 1..n {
                let value = (&m[k][k] * &m[i][j] - &m[i][k] * &m[k][j]) / &prev_pivot;
                m[i][j] = value;
            }
            m[i][k] = BigInt::zero();
        }
        prev_pivot = m[k][k].clone();
    }

    let det = m[n - 1][n - 1].clone();
    Some(if negate { -det } else { det })
}
