//! Integer lattice bases
//!
//! Row-major big-integer matrices. Rows are basis vectors; columns are the
//! coordinates the caller puts bounds on.

use crate::error::{LineqError, Result};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::fmt;

/// `n` row vectors in Z^m spanning L(B) = {Σ x_i b_i : x_i ∈ Z}
///
/// Rows need not be independent; reducers drop the dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeBasis {
    pub vectors: Vec<Vec<BigInt>>,
    /// Row count
    pub n: usize,
    /// Column count
    pub m: usize,
}

impl LatticeBasis {
    /// Fails on no rows, no columns, or rows of different lengths
    pub fn new(vectors: Vec<Vec<BigInt>>) -> Result<Self> {
        let m = match vectors.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(LineqError::EmptyBasis),
        };
        if let Some((row, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != m) {
            return Err(LineqError::RaggedBasis { row, expected: m, found: v.len() });
        }
        Ok(Self { n: vectors.len(), m, vectors })
    }

    pub fn from_rows<T: Into<BigInt> + Clone>(rows: &[Vec<T>]) -> Result<Self> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().cloned().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn get(&self, i: usize) -> &[BigInt] {
        &self.vectors[i]
    }

    pub fn rows(&self) -> impl Iterator<Item = &Vec<BigInt>> {
        self.vectors.iter()
    }

    pub fn is_square(&self) -> bool {
        self.n == self.m
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.vectors.swap(i, j);
    }

    /// <b_i, b_j>
    pub fn inner_product(&self, i: usize, j: usize) -> BigInt {
        dot(&self.vectors[i], &self.vectors[j])
    }

    pub fn norm_squared(&self, i: usize) -> BigInt {
        self.inner_product(i, i)
    }

    /// b_i ← b_i − q·b_j
    pub fn reduce_vector(&mut self, i: usize, j: usize, q: &BigInt) {
        let (target, source) = self.pair_mut(i, j);
        for (x, y) in target.iter_mut().zip(source) {
            *x -= q * y;
        }
    }

    /// b_i ← b_i + q·b_j
    pub fn add_multiple(&mut self, i: usize, j: usize, q: &BigInt) {
        let (target, source) = self.pair_mut(i, j);
        for (x, y) in target.iter_mut().zip(source) {
            *x += q * y;
        }
    }

    pub fn negate_vector(&mut self, i: usize) {
        for x in self.vectors[i].iter_mut() {
            *x = -&*x;
        }
    }

    /// Row i mutably alongside row j
    ///
    /// # Panics
    /// Panics if `i == j`.
    fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Vec<BigInt>, &Vec<BigInt>) {
        assert_ne!(i, j, "row combined with itself");
        if i < j {
            let (head, tail) = self.vectors.split_at_mut(j);
            (&mut head[i], &tail[0])
        } else {
            let (head, tail) = self.vectors.split_at_mut(i);
            (&mut tail[0], &head[j])
        }
    }

    /// Every entry multiplied by `k`
    pub fn scaled(&self, k: &BigInt) -> Self {
        let vectors = self
            .vectors
            .iter()
            .map(|row| row.iter().map(|x| x * k).collect())
            .collect();
        Self { vectors, n: self.n, m: self.m }
    }

    /// Column j multiplied by `factors[j]`
    ///
    /// # Panics
    /// Panics if `factors.len() != m`; callers validate lengths first.
    pub fn scale_columns(&self, factors: &[BigInt]) -> Self {
        assert_eq!(factors.len(), self.m, "one factor per column");
        let vectors = self
            .vectors
            .iter()
            .map(|row| row.iter().zip(factors).map(|(x, w)| x * w).collect())
            .collect();
        Self { vectors, n: self.n, m: self.m }
    }

    pub fn column(&self, j: usize) -> Vec<BigInt> {
        self.vectors.iter().map(|row| row[j].clone()).collect()
    }

    /// Largest absolute entry
    pub fn max_entry(&self) -> BigInt {
        self.vectors
            .iter()
            .flatten()
            .map(Signed::abs)
            .max()
            .unwrap_or_else(BigInt::zero)
    }
}

pub fn dot(a: &[BigInt], b: &[BigInt]) -> BigInt {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `[[a b c]\n[d e f]]`, the layout fplll and flatter read
impl fmt::Display for LatticeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.vectors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let entries: Vec<String> = row.iter().map(BigInt::to_string).collect();
            write!(f, "[{}]", entries.join(" "))?;
        }
        write!(f, "]")
    }
}
