//! Constraint list → lattice basis
//!
//! For `k` constraints over `u` distinct unknowns the basis has one column per
//! constraint and one row per unknown: row `r` holds the coefficient of
//! unknown `r` in every constraint. Each modular constraint `j` adds a row
//! with its modulus in column `j`, so `expr ≡ r (mod m)` becomes
//! `expr − k·m = r` with a free multiplier `k`.
//!
//! Lattice points are then exactly the value vectors of the constraint
//! expressions (minus their constants), which is what the bounds constrain.

use crate::constraint::{Constraint, LinearExpr};
use crate::error::{LineqError, Result};
use crate::lattice::LatticeBasis;
use num_bigint::BigInt;
use num_traits::Zero;

/// Lattice form of a constraint system
#[derive(Debug, Clone)]
pub struct ConstraintMatrix {
    /// `(u + #modular) × k` basis
    pub basis: LatticeBasis,
    /// Constant term of each constraint
    pub constants: Vec<BigInt>,
    /// Unknown for each of the first `u` rows
    pub unknowns: Vec<String>,
}

/// Build the basis for a list of constraints
pub fn constraints_to_matrix(constraints: &[Constraint]) -> Result<ConstraintMatrix> {
    let exprs: Vec<&LinearExpr> = constraints.iter().map(|c| c.expr()).collect();
    exprs_to_matrix(&exprs)
}

/// Build the basis for a list of expressions
pub fn exprs_to_matrix(exprs: &[&LinearExpr]) -> Result<ConstraintMatrix> {
    if exprs.is_empty() {
        return Err(LineqError::EmptyBasis);
    }

    let mut unknowns: Vec<String> = Vec::new();
    for expr in exprs {
        for name in expr.variables() {
            if !unknowns.iter().any(|u| u == name) {
                unknowns.push(name.to_string());
            }
        }
    }

    let k = exprs.len();
    let mut rows: Vec<Vec<BigInt>> = unknowns
        .iter()
        .map(|name| exprs.iter().map(|e| e.coefficient(name)).collect())
        .collect();

    for (j, expr) in exprs.iter().enumerate() {
        if let Some(m) = expr.modulus() {
            let mut row = vec![BigInt::zero(); k];
            row[j] = m.clone();
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(LineqError::EmptyBasis);
    }

    let constants = exprs.iter().map(|e| e.constant_term().clone()).collect();
    log::debug!(
        "built {}×{} basis from {} constraints over {} unknowns",
        rows.len(),
        k,
        k,
        unknowns.len()
    );

    Ok(ConstraintMatrix {
        basis: LatticeBasis::new(rows)?,
        constants,
        unknowns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().copied().map(BigInt::from).collect()
    }

    #[test]
    fn test_modular_system_layout() {
        // 3x + 5y + 2 ≡ 1 (mod 11), 0 <= x <= 7, 0 <= y <= 7
        let p = 11;
        let x = LinearExpr::var("x");
        let y = LinearExpr::var("y");
        let relation = x
            .scale(3)
            .add(&y.scale(5))
            .unwrap()
            .add_constant(2)
            .modulo(p)
            .unwrap();
        let constraints = vec![
            relation.equals(1),
            x.in_range(0, 7).unwrap(),
            y.in_range(0, 7).unwrap(),
        ];

        let cm = constraints_to_matrix(&constraints).unwrap();
        assert_eq!(cm.unknowns, vec!["x", "y"]);
        assert_eq!(cm.constants, ints(&[2, 0, 0]));
        assert_eq!(
            cm.basis,
            LatticeBasis::from_rows(&[vec![3i64, 1, 0], vec![5, 0, 1], vec![11, 0, 0]]).unwrap()
        );
    }

    #[test]
    fn test_no_modulus_adds_no_rows() {
        let x = LinearExpr::var("x");
        let y = LinearExpr::var("y");
        let constraints = vec![
            x.add(&y).unwrap().equals(10),
            x.sub(&y).unwrap().equals(2),
        ];
        let cm = constraints_to_matrix(&constraints).unwrap();
        assert_eq!(cm.basis.n, 2);
        assert_eq!(cm.basis.get(1), ints(&[1, -1]).as_slice());
    }

    #[test]
    fn test_unknowns_in_first_appearance_order() {
        let constraints = vec![
            LinearExpr::var("b").equals(0),
            LinearExpr::var("a").add(&LinearExpr::var("b")).unwrap().equals(0),
            LinearExpr::var("c").equals(0),
        ];
        let cm = constraints_to_matrix(&constraints).unwrap();
        assert_eq!(cm.unknowns, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(constraints_to_matrix(&[]), Err(LineqError::EmptyBasis)));

        let only_constants = vec![LinearExpr::constant(4).equals(4)];
        assert!(matches!(
            constraints_to_matrix(&only_constants),
            Err(LineqError::EmptyBasis)
        ));
    }
}
