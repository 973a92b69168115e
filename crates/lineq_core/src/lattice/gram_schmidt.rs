//! Exact Gram-Schmidt data
//!
//! For rows b_0..b_{n-1}:
//!
//! ```text
//! b*_i = b_i - Σ_{j<i} μ_ij b*_j        μ_ij = <b_i, b*_j> / ||b*_j||²
//! ```
//!
//! [`GramSchmidt`] keeps only μ and ||b*_i||², which is all LLL and BKZ need,
//! and updates them in place after size reductions and adjacent swaps.
//! [`NearestPlane`] materializes the b*_i themselves for Babai's algorithm.

use super::basis::{dot, LatticeBasis};
use crate::rational::Rational;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

#[derive(Debug, Clone)]
pub struct GramSchmidt {
    /// Lower triangle: `mu[i][j]` for `j < i`
    pub mu: Vec<Vec<Rational>>,
    /// ||b*_i||²
    pub norms_sq: Vec<Rational>,
    pub n: usize,
}

impl GramSchmidt {
    /// Orthogonalize the rows of `basis`
    ///
    /// A row that depends on earlier rows gets ||b*_i||² = 0, and every μ
    /// against it stays zero.
    pub fn compute(basis: &LatticeBasis) -> Self {
        let n = basis.n;
        let mut mu: Vec<Vec<Rational>> = Vec::with_capacity(n);
        let mut norms_sq: Vec<Rational> = Vec::with_capacity(n);

        for i in 0..n {
            // r[j] = <b_i, b*_j> = <b_i, b_j> - Σ_{k<j} μ_jk r[k]
            let mut r: Vec<Rational> = Vec::with_capacity(i);
            let mut row: Vec<Rational> = Vec::with_capacity(i);
            for j in 0..i {
                let projection = (0..j).fold(
                    Rational::from_int(basis.inner_product(i, j)),
                    |acc, k| &acc - &(&mu[j][k] * &r[k]),
                );
                row.push(if norms_sq[j].is_zero() {
                    Rational::zero()
                } else {
                    &projection / &norms_sq[j]
                });
                r.push(projection);
            }

            let norm = (0..i).fold(Rational::from_int(basis.norm_squared(i)), |acc, j| {
                &acc - &(&row[j] * &r[j])
            });
            mu.push(row);
            norms_sq.push(norm);
        }

        Self { mu, norms_sq, n }
    }

    /// No b*_i vanished, i.e. the rows are independent
    pub fn is_full_rank(&self) -> bool {
        self.norms_sq.iter().all(|r| !r.is_zero())
    }

    /// μ_ij
    ///
    /// # Panics
    /// Panics unless j < i.
    pub fn get_mu(&self, i: usize, j: usize) -> &Rational {
        assert!(j < i, "μ_ij only defined for j < i");
        &self.mu[i][j]
    }

    pub fn get_norm_sq(&self, i: usize) -> &Rational {
        &self.norms_sq[i]
    }

    /// |μ_ij| > 1/2
    pub fn needs_size_reduction(&self, i: usize, j: usize) -> bool {
        self.get_mu(i, j).exceeds_half()
    }

    /// Lovász condition between rows k-1 and k
    ///
    /// δ·||b*_{k-1}||² ≤ ||b*_k||² + μ²_{k,k-1}·||b*_{k-1}||², evaluated as
    /// `(δ_num - δ_den·μ²)·||b*_{k-1}||² ≤ δ_den·||b*_k||²`.
    pub fn check_lovasz(&self, k: usize, delta_num: i64, delta_den: i64) -> bool {
        if k == 0 {
            return true;
        }
        let mu = &self.mu[k][k - 1];
        let den = Rational::from_int(delta_den);
        let factor = &Rational::from_int(delta_num) - &(&den * &(mu * mu));
        &factor * &self.norms_sq[k - 1] <= &den * &self.norms_sq[k]
    }

    /// Follow b_k ← b_k − q·b_j
    pub fn update_size_reduction(&mut self, k: usize, j: usize, q: &BigInt) {
        self.mu[k][j] = &self.mu[k][j] - &Rational::from_int(q.clone());
        for i in 0..j {
            let shift = &self.mu[j][i] * q;
            self.mu[k][i] = &self.mu[k][i] - &shift;
        }
    }

    /// Follow the swap of rows k-1 and k
    ///
    /// Requires ||b*_k||² + μ²·||b*_{k-1}||² > 0, which holds for independent rows.
    pub fn update_swap(&mut self, k: usize) {
        let mu = self.mu[k][k - 1].clone();
        let old_prev = self.norms_sq[k - 1].clone();
        let old_cur = self.norms_sq[k].clone();

        // The new b*_{k-1} is the old b*_k + μ·b*_{k-1}
        let new_prev = &old_cur + &(&(&mu * &mu) * &old_prev);
        let new_mu = &(&mu * &old_prev) / &new_prev;

        // Rows k-1 and k of μ trade their shared prefix; the tail entry is new.
        let mut upper = std::mem::take(&mut self.mu[k - 1]);
        let mut lower = std::mem::take(&mut self.mu[k]);
        lower.truncate(k - 1);
        upper.push(new_mu.clone());
        self.mu[k - 1] = lower;
        self.mu[k] = upper;

        self.norms_sq[k] = &(&old_prev * &old_cur) / &new_prev;
        self.norms_sq[k - 1] = new_prev;

        for i in k + 1..self.n {
            let t = self.mu[i][k].clone();
            let a = self.mu[i][k - 1].clone();
            self.mu[i][k] = &a - &(&mu * &t);
            self.mu[i][k - 1] = &t + &(&new_mu * &self.mu[i][k]);
        }
    }
}

/// Orthogonal basis prepared for nearest-plane rounding
///
/// Each b*_i is stored as an integer vector `v_i` with b*_i = v_i / s_i, so
/// that <t, b*_i> / <b*_i, b*_i> = s_i <t, v_i> / <v_i, v_i> stays exact.
#[derive(Debug, Clone)]
pub struct NearestPlane {
    /// The (reduced) basis the projections belong to
    pub basis: LatticeBasis,
    /// Integer-scaled orthogonal vectors v_i
    pub orthogonal: Vec<Vec<BigInt>>,
    /// Scale s_i with b*_i = v_i / s_i
    pub scales: Vec<BigInt>,
    /// <v_i, v_i>
    pub norms_sq: Vec<BigInt>,
}

impl NearestPlane {
    /// Orthogonalize `basis` and precompute projection denominators
    pub fn new(basis: LatticeBasis) -> Self {
        let gs = GramSchmidt::compute(&basis);
        let n = basis.n;

        let mut b_star: Vec<Vec<Rational>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut v: Vec<Rational> = basis.get(i).iter().cloned().map(Rational::from_int).collect();
            for (j, prev) in b_star.iter().enumerate() {
                let mu = &gs.mu[i][j];
                if mu.is_zero() {
                    continue;
                }
                for (x, y) in v.iter_mut().zip(prev) {
                    *x = &*x - &(mu * y);
                }
            }
            b_star.push(v);
        }

        let mut orthogonal = Vec::with_capacity(n);
        let mut scales = Vec::with_capacity(n);
        let mut norms_sq = Vec::with_capacity(n);
        for v in b_star {
            let scale = v.iter().fold(BigInt::one(), |acc, x| acc.lcm(&x.denominator));
            let ints: Vec<BigInt> = v
                .iter()
                .map(|x| &x.numerator * (&scale / &x.denominator))
                .collect();
            norms_sq.push(dot(&ints, &ints));
            orthogonal.push(ints);
            scales.push(scale);
        }

        Self { basis, orthogonal, scales, norms_sq }
    }

    /// Babai's nearest plane: lattice vector close to `target`
    ///
    /// Walks the basis from the last vector to the first, removing
    /// round(<diff, b*_i> / <b*_i, b*_i>) copies of b_i from the residual.
    pub fn closest(&self, target: &[BigInt]) -> Vec<BigInt> {
        let mut diff: Vec<BigInt> = target.to_vec();
        for i in (0..self.basis.n).rev() {
            if self.norms_sq[i].is_zero() {
                continue;
            }
            let num = dot(&diff, &self.orthogonal[i]) * &self.scales[i];
            let c = Rational::new(num, self.norms_sq[i].clone()).round();
            if c.is_zero() {
                continue;
            }
            for (d, b) in diff.iter_mut().zip(self.basis.get(i)) {
                *d -= &c * b;
            }
        }
        target.iter().zip(diff).map(|(t, d)| t - d).collect()
    }
}
