//! Approximate closest vector engines
//!
//! - [`cvp_kannan`]: embed the target as an extra basis row and look for a
//!   short vector of the augmented lattice.
//! - [`cvp_babai`]: reduce the basis and run Babai's nearest plane pass.

use crate::error::{LineqError, Result};
use crate::lattice::{LatticeBasis, NearestPlane};
use crate::reduce::Reducer;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::str::FromStr;

/// CVP strategy used by the solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CvpAlgorithm {
    #[default]
    Kannan,
    Babai,
}

impl FromStr for CvpAlgorithm {
    type Err = LineqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kannan" => Ok(Self::Kannan),
            "babai" => Ok(Self::Babai),
            other => Err(LineqError::InvalidAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for CvpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kannan => write!(f, "kannan"),
            Self::Babai => write!(f, "babai"),
        }
    }
}

/// Default embedding factor: ||target|| rounded to the nearest integer, or 1
pub fn embedding_factor(target: &[BigInt]) -> BigInt {
    let norm_sq: BigInt = target.iter().map(|t| t * t).sum();
    let root = norm_sq.sqrt();
    // round(sqrt(n)) = r + 1 exactly when n - r² > r
    let rounded = if &norm_sq - &root * &root > root { root + 1 } else { root };
    if rounded.is_zero() {
        BigInt::one()
    } else {
        rounded
    }
}

/// Kannan embedding
///
/// Reduces `[[B, 0], [-target, q]]` and returns `row[..m] + target` for the
/// first reduced row whose last entry is `±q` (sign-normalized to `+q`).
/// `Ok(None)` when no row qualifies.
pub fn cvp_kannan(
    basis: &LatticeBasis,
    target: &[BigInt],
    reducer: &dyn Reducer,
    q: Option<BigInt>,
) -> Result<Option<Vec<BigInt>>> {
    check_target(basis, target)?;
    let m = basis.m;
    let q = q.unwrap_or_else(|| embedding_factor(target));

    let mut rows: Vec<Vec<BigInt>> = basis
        .rows()
        .map(|row| {
            let mut r = row.clone();
            r.push(BigInt::zero());
            r
        })
        .collect();
    let mut last: Vec<BigInt> = target.iter().map(|t| -t).collect();
    last.push(q.clone());
    rows.push(last);

    let embedded = LatticeBasis::new(rows)?;
    let reduced = reducer.reduce(&embedded)?;
    check_width(reducer, &reduced, m + 1)?;

    for row in reduced.rows() {
        if row[m].abs() != q {
            continue;
        }
        let sign = if row[m].is_negative() { -BigInt::one() } else { BigInt::one() };
        let point = row[..m]
            .iter()
            .zip(target)
            .map(|(x, t)| x * &sign + t)
            .collect();
        return Ok(Some(point));
    }

    log::debug!("kannan embedding: no reduced row ends in ±{}", q);
    Ok(None)
}

/// Babai's nearest plane on the reduced basis; always returns a lattice point
pub fn cvp_babai(
    basis: &LatticeBasis,
    target: &[BigInt],
    reducer: &dyn Reducer,
) -> Result<Vec<BigInt>> {
    check_target(basis, target)?;
    let reduced = reducer.reduce(basis)?;
    check_width(reducer, &reduced, basis.m)?;
    Ok(NearestPlane::new(reduced).closest(target))
}

fn check_target(basis: &LatticeBasis, target: &[BigInt]) -> Result<()> {
    if target.len() != basis.m {
        return Err(LineqError::LengthMismatch {
            expected: basis.m,
            actual: target.len(),
        });
    }
    Ok(())
}

fn check_width(reducer: &dyn Reducer, reduced: &LatticeBasis, m: usize) -> Result<()> {
    if reduced.m != m {
        return Err(LineqError::ReducerFailed {
            tool: reducer.name(),
            message: format!("returned {} columns, expected {}", reduced.m, m),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::LllReducer;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().copied().map(BigInt::from).collect()
    }

    fn tens() -> LatticeBasis {
        LatticeBasis::from_rows(&[vec![10i64, 0], vec![0, 10]]).unwrap()
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("kannan".parse::<CvpAlgorithm>().unwrap(), CvpAlgorithm::Kannan);
        assert_eq!("babai".parse::<CvpAlgorithm>().unwrap(), CvpAlgorithm::Babai);
        assert!(matches!(
            "lll".parse::<CvpAlgorithm>(),
            Err(LineqError::InvalidAlgorithm(name)) if name == "lll"
        ));
        assert_eq!(CvpAlgorithm::Babai.to_string(), "babai");
    }

    #[test]
    fn test_embedding_factor() {
        // sqrt(21² + 39²) = 44.29
        assert_eq!(embedding_factor(&ints(&[21, -39])), BigInt::from(44));
        // sqrt(2) rounds down, sqrt(3) rounds up
        assert_eq!(embedding_factor(&ints(&[1, 1])), BigInt::from(1));
        assert_eq!(embedding_factor(&ints(&[1, 1, 1])), BigInt::from(2));
        assert_eq!(embedding_factor(&ints(&[0, 0])), BigInt::from(1));
    }

    #[test]
    fn test_kannan_closest_point() {
        let reducer = LllReducer::default();
        let found = cvp_kannan(&tens(), &ints(&[21, -39]), &reducer, None).unwrap();
        assert_eq!(found, Some(ints(&[20, -40])));
    }

    #[test]
    fn test_kannan_small_embedding_factor() {
        // With q = 5 the embedding row is swapped to the front during reduction.
        let reducer = LllReducer::default();
        let found = cvp_kannan(&tens(), &ints(&[21, -39]), &reducer, Some(BigInt::from(5))).unwrap();
        assert_eq!(found, Some(ints(&[20, -40])));
    }

    #[test]
    fn test_kannan_row_ending_in_minus_q() {
        // Every reduced row negated: the matching row ends in -q.
        let negated = |b: &LatticeBasis| -> Result<LatticeBasis> {
            let mut reduced = LllReducer::default().reduce(b)?;
            for i in 0..reduced.n {
                reduced.negate_vector(i);
            }
            Ok(reduced)
        };
        let found = cvp_kannan(&tens(), &ints(&[21, -39]), &negated, None).unwrap();
        assert_eq!(found, Some(ints(&[20, -40])));
    }

    #[test]
    fn test_kannan_no_matching_row() {
        // A reducer that loses the embedding row leaves nothing to match.
        let drop_last = |b: &LatticeBasis| -> Result<LatticeBasis> {
            LatticeBasis::new(b.vectors[..b.n - 1].to_vec())
        };
        let found = cvp_kannan(&tens(), &ints(&[21, -39]), &drop_last, None).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_babai_closest_point() {
        let reducer = LllReducer::default();
        let found = cvp_babai(&tens(), &ints(&[21, -39]), &reducer).unwrap();
        assert_eq!(found, ints(&[20, -40]));
    }

    #[test]
    fn test_babai_lattice_point_is_fixed() {
        let basis = LatticeBasis::from_rows(&[vec![3i64, 1, 0], vec![5, 0, 1], vec![11, 0, 0]]).unwrap();
        // 2*b0 + 3*b1 - b2
        let point = ints(&[10, 2, 3]);
        let found = cvp_babai(&basis, &point, &LllReducer::default()).unwrap();
        assert_eq!(found, point);
    }

    #[test]
    fn test_target_length_checked() {
        let reducer = LllReducer::default();
        assert!(matches!(
            cvp_babai(&tens(), &ints(&[1, 2, 3]), &reducer),
            Err(LineqError::LengthMismatch { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            cvp_kannan(&tens(), &ints(&[1]), &reducer, None),
            Err(LineqError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_reducer_changing_width_is_reported() {
        let widen = |b: &LatticeBasis| -> Result<LatticeBasis> {
            let rows = b.rows().map(|r| {
                let mut r = r.clone();
                r.push(BigInt::zero());
                r
            });
            LatticeBasis::new(rows.collect())
        };
        assert!(matches!(
            cvp_babai(&tens(), &ints(&[1, 2]), &widen),
            Err(LineqError::ReducerFailed { tool: "custom", .. })
        ));
    }
}
