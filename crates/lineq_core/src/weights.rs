//! Column weights for weighted CVP
//!
//! Scaling column `i` by `w_i = scale / delta_i` makes every bound box about
//! `scale` wide, so no coordinate dominates the search. A zero-width bound
//! gets `scale · n`, which pins that coordinate.

use crate::bounds::{validate_bounds, Bound};
use crate::determinant::determinant;
use crate::error::Result;
use crate::lattice::LatticeBasis;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// One positive weight per column of `basis`
pub fn cvp_weights(basis: &LatticeBasis, bounds: &[Bound]) -> Result<Vec<BigInt>> {
    validate_bounds(bounds, basis.m)?;

    let deltas: Vec<BigInt> = bounds.iter().map(Bound::width).collect();
    let mut scale = deltas.iter().max().cloned().unwrap_or_else(BigInt::zero);
    if scale.is_zero() {
        // Every coordinate is exact; only the lattice itself gives a scale.
        scale = determinant(basis)
            .map(|d| d.abs())
            .filter(|d| !d.is_zero())
            .unwrap_or_else(BigInt::one);
        log::debug!("all bounds are exact, using scale {}", scale);
    }

    let n = BigInt::from(basis.n);
    Ok(deltas
        .iter()
        .map(|d| if d.is_zero() { &scale * &n } else { &scale / d })
        .collect())
}
