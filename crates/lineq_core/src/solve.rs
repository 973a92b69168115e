//! Bounded linear system solving via weighted CVP
//!
//! Finds a point of the lattice spanned by `basis` whose coordinates lie in
//! caller-supplied ranges. Bounds become a weighted target:
//!
//! ```text
//! B' = 2·B·diag(w)      t_i = (lb_i + ub_i)·w_i
//! ```
//!
//! so the doubled box center is an integer, and every coordinate's box is
//! about equally wide after weighting. The CVP answer is divided by `2·w_i`
//! coordinate-wise; this is exact because every point of `B'` is.

use crate::bounds::{within_bounds, Bound};
use crate::builder::constraints_to_matrix;
use crate::constraint::Constraint;
use crate::cvp::{cvp_babai, cvp_kannan, CvpAlgorithm};
use crate::error::Result;
use crate::lattice::LatticeBasis;
use crate::reduce::Reducer;
use crate::weights::cvp_weights;
use num_bigint::BigInt;
use num_integer::Integer;
use std::time::Instant;

/// Options for [`solve_lineq`] and [`solve_lineq_poly`]
#[derive(Debug, Clone, Default)]
pub struct SolveConfig {
    pub algorithm: CvpAlgorithm,
    /// Return `None` unless every coordinate is inside its bound
    pub check: bool,
    /// Kannan embedding factor q; defaults to the rounded target norm
    pub embedding_factor: Option<BigInt>,
}

impl SolveConfig {
    pub fn kannan() -> Self {
        Self::default()
    }

    pub fn babai() -> Self {
        Self {
            algorithm: CvpAlgorithm::Babai,
            ..Default::default()
        }
    }

    pub fn checked(self) -> Self {
        Self { check: true, ..self }
    }
}

/// Lattice point of `basis` near the center of `bounds`
///
/// Bounds are soft unless `config.check` is set: without it the closest point
/// found is returned even if it leaves the box. `Ok(None)` means the check
/// failed or the Kannan embedding produced no usable row.
pub fn solve_lineq(
    basis: &LatticeBasis,
    bounds: &[Bound],
    config: &SolveConfig,
    reducer: &dyn Reducer,
) -> Result<Option<Vec<BigInt>>> {
    let start = Instant::now();
    let weights = cvp_weights(basis, bounds)?;
    let weighted = weighted_basis(basis, &weights);
    let target = weighted_target(bounds, &weights);

    log::debug!(
        "solving {}×{} system with {} and {} reducer",
        basis.n,
        basis.m,
        config.algorithm,
        reducer.name()
    );

    let point = match config.algorithm {
        CvpAlgorithm::Kannan => {
            cvp_kannan(&weighted, &target, reducer, config.embedding_factor.clone())?
        }
        CvpAlgorithm::Babai => Some(cvp_babai(&weighted, &target, reducer)?),
    };

    let result = point.and_then(|p| accept(unweight(&p, &weights), bounds, config.check));
    log::debug!(
        "solve finished in {:.3}s: {}",
        start.elapsed().as_secs_f64(),
        if result.is_some() { "found" } else { "no solution" }
    );
    Ok(result)
}

/// Values of the constraint expressions satisfying every constraint
///
/// One value per constraint, in order. The lattice is built with
/// [`constraints_to_matrix`]; bounds are shifted by each constraint's
/// constant term and the constants are added back to the answer.
pub fn solve_lineq_poly(
    relations: &[Constraint],
    config: &SolveConfig,
    reducer: &dyn Reducer,
) -> Result<Option<Vec<BigInt>>> {
    let cm = constraints_to_matrix(relations)?;
    let bounds: Vec<Bound> = relations
        .iter()
        .zip(&cm.constants)
        .map(|(r, c)| Bound {
            lb: r.lb() - c,
            ub: r.ub() - c,
        })
        .collect();

    let solution = solve_lineq(&cm.basis, &bounds, config, reducer)?;
    Ok(solution.map(|values| add_constants(values, &cm.constants)))
}

/// `2·B` with column i multiplied by `w_i`
pub(crate) fn weighted_basis(basis: &LatticeBasis, weights: &[BigInt]) -> LatticeBasis {
    basis.scaled(&BigInt::from(2)).scale_columns(weights)
}

/// `(lb_i + ub_i)·w_i`
pub(crate) fn weighted_target(bounds: &[Bound], weights: &[BigInt]) -> Vec<BigInt> {
    bounds
        .iter()
        .zip(weights)
        .map(|(b, w)| b.doubled_center() * w)
        .collect()
}

/// Divide coordinate i by `2·w_i`
pub(crate) fn unweight(point: &[BigInt], weights: &[BigInt]) -> Vec<BigInt> {
    point
        .iter()
        .zip(weights)
        .map(|(x, w)| x.div_floor(&(w * 2)))
        .collect()
}

/// Apply the optional bounds check
pub(crate) fn accept(point: Vec<BigInt>, bounds: &[Bound], check: bool) -> Option<Vec<BigInt>> {
    if !check || within_bounds(&point, bounds) {
        Some(point)
    } else {
        log::debug!("candidate rejected: outside bounds");
        None
    }
}

pub(crate) fn add_constants(values: Vec<BigInt>, constants: &[BigInt]) -> Vec<BigInt> {
    values.into_iter().zip(constants).map(|(v, c)| v + c).collect()
}
