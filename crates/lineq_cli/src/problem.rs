//! Problem and matrix files
//!
//! Integers are decimal strings or JSON integers; values wider than 64 bits
//! must be strings. A problem file is either
//!
//! ```json
//! { "basis": [["3", "1"], ["11", "0"]], "bounds": [["0", "10"], 4] }
//! ```
//!
//! where a bound is `[lb, ub]` or a single exact value, or
//!
//! ```json
//! { "constraints": [
//!     { "terms": {"x": "3", "y": "5"}, "constant": "0", "modulus": "11", "lb": "1", "ub": "1" },
//!     { "terms": {"x": 1}, "lb": 0, "ub": 10 }
//! ] }
//! ```
//!
//! A constraint without `ub` is an equality.

use anyhow::{Context, Result};
use lineq_core::{
    ortho_lattice, solve_lineq, solve_lineq_poly, Bound, Constraint, LatticeBasis, LinearExpr,
    Reducer, SolveConfig,
};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Integer literal
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Integer {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl Integer {
    pub fn to_bigint(&self) -> Result<BigInt> {
        match self {
            Integer::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("invalid integer '{}'", s)),
            Integer::Signed(v) => Ok(BigInt::from(*v)),
            Integer::Unsigned(v) => Ok(BigInt::from(*v)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoundSpec {
    Range([Integer; 2]),
    Exact(Integer),
}

impl BoundSpec {
    pub fn to_bound(&self) -> Result<Bound> {
        match self {
            BoundSpec::Range([lb, ub]) => Ok(Bound::new(lb.to_bigint()?, ub.to_bigint()?)?),
            BoundSpec::Exact(v) => Ok(Bound::exact(v.to_bigint()?)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintSpec {
    pub terms: BTreeMap<String, Integer>,
    pub constant: Option<Integer>,
    pub modulus: Option<Integer>,
    pub lb: Integer,
    pub ub: Option<Integer>,
}

impl ConstraintSpec {
    pub fn to_constraint(&self) -> Result<Constraint> {
        let constant = self
            .constant
            .as_ref()
            .map(Integer::to_bigint)
            .transpose()?
            .unwrap_or_default();
        let mut expr = LinearExpr::constant(constant);
        for (name, coefficient) in &self.terms {
            expr = expr.add(&LinearExpr::term(coefficient.to_bigint()?, name.as_str()))?;
        }
        if let Some(modulus) = &self.modulus {
            expr = expr.modulo(modulus.to_bigint()?)?;
        }

        let lb = self.lb.to_bigint()?;
        let ub = match &self.ub {
            Some(ub) => ub.to_bigint()?,
            None => lb.clone(),
        };
        Ok(expr.in_range(lb, ub)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Problem {
    Basis {
        basis: Vec<Vec<Integer>>,
        bounds: Vec<BoundSpec>,
    },
    Constraints {
        constraints: Vec<ConstraintSpec>,
    },
}

/// A bare array of rows, or `{ "basis": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MatrixFile {
    Rows(Vec<Vec<Integer>>),
    Wrapped { basis: Vec<Vec<Integer>> },
}

#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub algorithm: String,
    pub reducer: &'static str,
    /// `null` when no acceptable point was found
    pub values: Option<Vec<String>>,
    /// Constraint expressions the values belong to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<String>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BasisReport {
    pub reducer: &'static str,
    pub rows: usize,
    pub columns: usize,
    pub basis: Vec<Vec<String>>,
    pub elapsed_ms: f64,
}

pub fn parse_problem(text: &str) -> Result<Problem> {
    serde_json::from_str(text)
        .context("expected {\"basis\", \"bounds\"} or {\"constraints\"}")
}

pub fn load_problem(path: &Path) -> Result<Problem> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_problem(&text).with_context(|| format!("invalid problem file {}", path.display()))
}

pub fn parse_matrix(text: &str) -> Result<LatticeBasis> {
    let file: MatrixFile = serde_json::from_str(text).context("expected an array of rows")?;
    let rows = match file {
        MatrixFile::Rows(rows) | MatrixFile::Wrapped { basis: rows } => rows,
    };
    to_basis(&rows)
}

pub fn load_matrix(path: &Path) -> Result<LatticeBasis> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_matrix(&text).with_context(|| format!("invalid matrix file {}", path.display()))
}

fn to_basis(rows: &[Vec<Integer>]) -> Result<LatticeBasis> {
    let rows = rows
        .iter()
        .map(|row| row.iter().map(Integer::to_bigint).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(LatticeBasis::new(rows)?)
}

fn decimal(values: &[BigInt]) -> Vec<String> {
    values.iter().map(BigInt::to_string).collect()
}

pub fn solve(problem: &Problem, config: &SolveConfig, reducer: &dyn Reducer) -> Result<SolveReport> {
    let start = Instant::now();
    let (values, expressions) = match problem {
        Problem::Basis { basis, bounds } => {
            let basis = to_basis(basis)?;
            let bounds = bounds
                .iter()
                .map(BoundSpec::to_bound)
                .collect::<Result<Vec<_>>>()?;
            (solve_lineq(&basis, &bounds, config, reducer)?, Vec::new())
        }
        Problem::Constraints { constraints } => {
            let relations = constraints
                .iter()
                .map(ConstraintSpec::to_constraint)
                .collect::<Result<Vec<_>>>()?;
            let expressions = relations.iter().map(|r| r.expr().to_string()).collect();
            (solve_lineq_poly(&relations, config, reducer)?, expressions)
        }
    };

    Ok(SolveReport {
        algorithm: config.algorithm.to_string(),
        reducer: reducer.name(),
        values: values.map(|v| decimal(&v)),
        expressions,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

pub fn reduce(basis: &LatticeBasis, reducer: &dyn Reducer) -> Result<BasisReport> {
    let start = Instant::now();
    let reduced = reducer.reduce(basis)?;
    Ok(basis_report(&reduced, reducer, start))
}

pub fn ortho(matrix: &LatticeBasis, modulus: Option<&BigInt>, reducer: &dyn Reducer) -> Result<BasisReport> {
    let start = Instant::now();
    let orthogonal = ortho_lattice(matrix, modulus, reducer)?;
    Ok(basis_report(&orthogonal, reducer, start))
}

fn basis_report(basis: &LatticeBasis, reducer: &dyn Reducer, start: Instant) -> BasisReport {
    BasisReport {
        reducer: reducer.name(),
        rows: basis.n,
        columns: basis.m,
        basis: basis.rows().map(|row| decimal(row)).collect(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineq_core::LllReducer;

    #[test]
    fn test_integer_literals() {
        let values: Vec<Integer> =
            serde_json::from_str(r#"["-12", 7, 18446744073709551615, "340282366920938463463374607431768211456"]"#)
                .unwrap();
        let values: Vec<BigInt> = values.iter().map(|v| v.to_bigint().unwrap()).collect();
        assert_eq!(values[0], BigInt::from(-12));
        assert_eq!(values[1], BigInt::from(7));
        assert_eq!(values[2], BigInt::from(u64::MAX));
        assert_eq!(values[3], BigInt::from(1u8) << 128);

        let bad: Integer = serde_json::from_str(r#""12x""#).unwrap();
        assert!(bad.to_bigint().is_err());
    }

    #[test]
    fn test_basis_problem() {
        let problem = parse_problem(
            r#"{ "basis": [[10, 0], [0, 10]], "bounds": [["16", "24"], [-4, 4]] }"#,
        )
        .unwrap();
        let report = solve(&problem, &SolveConfig::babai().checked(), &LllReducer::default()).unwrap();
        assert_eq!(report.values, Some(vec!["20".to_string(), "0".to_string()]));
        assert!(report.expressions.is_empty());
        assert_eq!(report.reducer, "lll");
    }

    #[test]
    fn test_exact_bound_spec() {
        let problem = parse_problem(r#"{ "basis": [[1, 0], [0, 1]], "bounds": [5, [0, 2]] }"#).unwrap();
        match problem {
            Problem::Basis { bounds, .. } => {
                assert_eq!(bounds[0].to_bound().unwrap(), Bound::exact(5));
                assert_eq!(bounds[1].to_bound().unwrap(), Bound::new(0, 2).unwrap());
            }
            _ => panic!("expected a basis problem"),
        }
    }

    #[test]
    fn test_constraint_problem() {
        // 5x + 3 == 38 (mod 1009), 0 <= x <= 15
        let problem = parse_problem(
            r#"{ "constraints": [
                { "terms": {"x": "5"}, "constant": "3", "modulus": "1009", "lb": "38" },
                { "terms": {"x": 1}, "lb": 0, "ub": 15 }
            ] }"#,
        )
        .unwrap();
        let report = solve(&problem, &SolveConfig::babai().checked(), &LllReducer::default()).unwrap();
        assert_eq!(report.values, Some(vec!["38".to_string(), "7".to_string()]));
        assert_eq!(report.expressions, vec!["5*x + 3".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_inverted_bound_is_an_error() {
        let problem = parse_problem(r#"{ "basis": [[1]], "bounds": [[3, 1]] }"#).unwrap();
        assert!(solve(&problem, &SolveConfig::default(), &LllReducer::default()).is_err());
    }

    #[test]
    fn test_matrix_formats() {
        let bare = parse_matrix(r#"[[1, 2, 3]]"#).unwrap();
        let wrapped = parse_matrix(r#"{ "basis": [["1", "2", "3"]] }"#).unwrap();
        assert_eq!(bare, wrapped);
        assert!(parse_matrix(r#"[[1, 2], [3]]"#).is_err());
    }

    #[test]
    fn test_ortho_report() {
        let matrix = parse_matrix(r#"[[1, 2, 3]]"#).unwrap();
        let report = ortho(&matrix, None, &LllReducer::default()).unwrap();
        assert_eq!((report.rows, report.columns), (2, 3));
    }
}
