//! Orthogonal lattices
//!
//! For an `n × m` matrix `M` whose columns are the vectors of interest, the
//! orthogonal lattice is `{ r ∈ Zᵐ : M·r = 0 }`, or `M·r ≡ 0 (mod N)` with a
//! modulus. It is found by reducing
//!
//! ```text
//! [ w·Mᵀ   I_m ]
//! [ w·N·I_n  0 ]     (second block only with a modulus)
//! ```
//!
//! With a large weight `w`, any row whose first `n` entries are non-zero is
//! long, so the short reduced rows are exactly the ones with `M·r = 0`.

use crate::error::{LineqError, Result};
use crate::lattice::LatticeBasis;
use crate::reduce::Reducer;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Weight used without a modulus, relative to the largest entry of `M`
const WEIGHT_SHIFT: usize = 10;

/// Reduced basis of the vectors orthogonal to the columns of `matrix`
///
/// Fails with [`LineqError::EmptyBasis`] when the reduced basis contains no
/// orthogonal vector.
pub fn ortho_lattice(
    matrix: &LatticeBasis,
    modulus: Option<&BigInt>,
    reducer: &dyn Reducer,
) -> Result<LatticeBasis> {
    let (n, m) = (matrix.n, matrix.m);
    let w = match modulus {
        Some(p) if !p.is_positive() => return Err(LineqError::InvalidModulus(p.clone())),
        Some(p) => p.clone(),
        None => matrix.max_entry().max(BigInt::one()) << WEIGHT_SHIFT,
    };

    // [w·Mᵀ | I_m]
    let mut rows: Vec<Vec<BigInt>> = (0..m)
        .map(|j| {
            let mut row: Vec<BigInt> = matrix.column(j).iter().map(|x| x * &w).collect();
            row.extend((0..m).map(|k| if k == j { BigInt::one() } else { BigInt::zero() }));
            row
        })
        .collect();

    // [w·N·I_n | 0]
    if let Some(p) = modulus {
        let wp = &w * p;
        rows.extend((0..n).map(|i| {
            let mut row = vec![BigInt::zero(); n + m];
            row[i] = wp.clone();
            row
        }));
    }

    let reduced = reducer.reduce(&LatticeBasis::new(rows)?)?;
    if reduced.m != n + m {
        return Err(LineqError::ReducerFailed {
            tool: reducer.name(),
            message: format!("returned {} columns, expected {}", reduced.m, n + m),
        });
    }

    let orthogonal: Vec<Vec<BigInt>> = reduced
        .rows()
        .filter(|row| row[..n].iter().all(Zero::is_zero))
        .map(|row| row[n..].to_vec())
        .collect();

    log::debug!(
        "orthogonal lattice of {}×{} matrix: {} vectors",
        n,
        m,
        orthogonal.len()
    );
    LatticeBasis::new(orthogonal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinant::determinant;
    use crate::lattice::basis::dot;
    use crate::reduce::LllReducer;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().copied().map(BigInt::from).collect()
    }

    /// M·r for a row vector r
    fn apply(matrix: &LatticeBasis, r: &[BigInt]) -> Vec<BigInt> {
        matrix.rows().map(|row| dot(row, r)).collect()
    }

    #[test]
    fn test_integer_kernel() {
        let matrix = LatticeBasis::from_rows(&[vec![1i64, 2, 3]]).unwrap();
        let ortho = ortho_lattice(&matrix, None, &LllReducer::default()).unwrap();

        assert_eq!(ortho.n, 2);
        for r in ortho.rows() {
            assert_eq!(apply(&matrix, r), ints(&[0]));
        }
        // Gram determinant of the kernel of a primitive vector v is |v|² = 14
        let gram = ortho.norm_squared(0) * ortho.norm_squared(1)
            - ortho.inner_product(0, 1) * ortho.inner_product(0, 1);
        assert_eq!(gram, BigInt::from(14));
    }

    #[test]
    fn test_modular_kernel() {
        let p = BigInt::from(10_007);
        let matrix = LatticeBasis::from_rows(&[vec![1i64, 1234, 5678]]).unwrap();
        let ortho = ortho_lattice(&matrix, Some(&p), &LllReducer::default()).unwrap();

        assert_eq!(ortho.n, 3);
        for r in ortho.rows() {
            let value = &apply(&matrix, r)[0];
            assert!((value % &p).is_zero());
        }
        assert_eq!(determinant(&ortho).unwrap().abs(), p);
    }

    #[test]
    fn test_rejects_bad_modulus() {
        let matrix = LatticeBasis::from_rows(&[vec![1i64, 2]]).unwrap();
        assert!(matches!(
            ortho_lattice(&matrix, Some(&BigInt::from(0)), &LllReducer::default()),
            Err(LineqError::InvalidModulus(_))
        ));
    }
}
