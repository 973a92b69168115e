//! Exact LLL reduction
//!
//! A δ-reduced basis is size reduced (`|μ_ij| ≤ 1/2` for `j < i`) and
//! satisfies the Lovász condition
//!
//! ```text
//! δ·||b*_{k-1}||² ≤ ||b*_k||² + μ²_{k,k-1}·||b*_{k-1}||²
//! ```
//!
//! All Gram-Schmidt data is kept as exact rationals, so the result does not
//! depend on floating point precision however large the entries get. This is
//! what the weighted CVP bases need: weights routinely push entries past
//! 2^200.
//!
//! Generating sets with dependent rows are accepted. They are first brought
//! to an integer row echelon form, which spans the same lattice with
//! independent rows.

use super::basis::LatticeBasis;
use super::gram_schmidt::GramSchmidt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::time::Instant;

/// LLL parameters; δ = `delta_num / delta_den` must lie in (1/4, 1]
#[derive(Debug, Clone)]
pub struct LLLConfig {
    pub delta_num: i64,
    pub delta_den: i64,
    /// Upper bound on loop iterations
    pub max_iterations: usize,
}

impl Default for LLLConfig {
    fn default() -> Self {
        Self {
            delta_num: 3,
            delta_den: 4,
            max_iterations: 1_000_000,
        }
    }
}

impl LLLConfig {
    /// δ = 0.99
    pub fn strong() -> Self {
        Self {
            delta_num: 99,
            delta_den: 100,
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.delta_den > 0
            && 4 * self.delta_num > self.delta_den
            && self.delta_num <= self.delta_den
    }
}

#[derive(Debug, Clone, Default)]
pub struct LLLStats {
    pub size_reductions: usize,
    pub swaps: usize,
    pub iterations: usize,
    /// Rows removed because they were linearly dependent
    pub dependent_rows: usize,
    /// Seconds
    pub total_time: f64,
}

pub struct LLL;

impl LLL {
    /// Reduce `basis`; zero rows are removed from the result
    pub fn reduce(basis: &LatticeBasis, config: &LLLConfig) -> (LatticeBasis, LLLStats) {
        let start = Instant::now();
        let mut run = Run::new(basis);

        let n = run.basis.n;
        let mut k = 1usize;
        while k < n && run.stats.iterations < config.max_iterations {
            run.stats.iterations += 1;
            run.size_reduce(k, k - 1);

            if run.gs.check_lovasz(k, config.delta_num, config.delta_den) {
                for j in (0..k - 1).rev() {
                    run.size_reduce(k, j);
                }
                k += 1;
            } else {
                run.basis.swap(k, k - 1);
                run.gs.update_swap(k);
                run.stats.swaps += 1;
                k = (k - 1).max(1);
            }

            if run.stats.iterations % 1000 == 0 {
                log::trace!(
                    "LLL iteration {}: k = {}, {} swaps",
                    run.stats.iterations,
                    k,
                    run.stats.swaps
                );
            }
        }

        if n > 1 && run.stats.iterations >= config.max_iterations {
            log::warn!("LLL stopped at the iteration limit ({})", config.max_iterations);
        }

        let Run { basis: reduced, mut stats, .. } = run;
        stats.total_time = start.elapsed().as_secs_f64();
        log::debug!(
            "LLL {}×{}: {} iterations, {} swaps, {} size reductions in {:.3}s",
            reduced.n,
            reduced.m,
            stats.iterations,
            stats.swaps,
            stats.size_reductions,
            stats.total_time
        );
        (reduced, stats)
    }

    /// Size reduced and Lovász for every consecutive pair
    pub fn is_reduced(basis: &LatticeBasis, config: &LLLConfig) -> bool {
        let gs = GramSchmidt::compute(basis);
        let size_reduced = (1..basis.n).all(|i| (0..i).all(|j| !gs.needs_size_reduction(i, j)));
        size_reduced && (1..basis.n).all(|k| gs.check_lovasz(k, config.delta_num, config.delta_den))
    }
}

/// Working basis and its Gram-Schmidt data, updated together
struct Run {
    basis: LatticeBasis,
    gs: GramSchmidt,
    stats: LLLStats,
}

impl Run {
    fn new(input: &LatticeBasis) -> Self {
        let mut stats = LLLStats::default();
        let gs = GramSchmidt::compute(input);
        if gs.is_full_rank() {
            return Self { basis: input.clone(), gs, stats };
        }

        let basis = row_echelon(input);
        stats.dependent_rows = input.n - basis.n;
        log::debug!(
            "LLL: dropped {} dependent rows from {}×{} generating set",
            stats.dependent_rows,
            input.n,
            input.m
        );
        let gs = GramSchmidt::compute(&basis);
        Self { basis, gs, stats }
    }

    /// b_k ← b_k − round(μ_kj)·b_j
    fn size_reduce(&mut self, k: usize, j: usize) {
        if !self.gs.needs_size_reduction(k, j) {
            return;
        }
        let q = self.gs.get_mu(k, j).round();
        if q.is_zero() {
            return;
        }
        self.basis.reduce_vector(k, j, &q);
        self.gs.update_size_reduction(k, j, &q);
        self.stats.size_reductions += 1;
    }
}

/// Integer row echelon form by unimodular row operations
///
/// Euclid on each column: keep subtracting multiples of the row with the
/// smallest non-zero pivot until a single row is left with a non-zero entry.
/// The returned rows are independent and span the same lattice.
pub(crate) fn row_echelon(basis: &LatticeBasis) -> LatticeBasis {
    let mut rows = basis.vectors.clone();
    let n = rows.len();
    let mut r = 0usize;

    for c in 0..basis.m {
        if r == n {
            break;
        }
        loop {
            let pivot = (r..n)
                .filter(|&i| !rows[i][c].is_zero())
                .min_by(|&a, &b| rows[a][c].abs().cmp(&rows[b][c].abs()));
            let Some(p) = pivot else { break };
            rows.swap(r, p);

            let mut done = true;
            for i in r + 1..n {
                if rows[i][c].is_zero() {
                    continue;
                }
                let q = rows[i][c].div_floor(&rows[r][c]);
                let pivot_row = rows[r].clone();
                for (x, y) in rows[i].iter_mut().zip(&pivot_row) {
                    *x -= &q * y;
                }
                if !rows[i][c].is_zero() {
                    done = false;
                }
            }
            if done {
                r += 1;
                break;
            }
        }
    }

    rows.truncate(r);
    LatticeBasis {
        n: rows.len(),
        m: basis.m,
        vectors: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinant::determinant;
    use num_bigint::BigInt;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_basis(n: usize, bits: u32, seed: u64) -> LatticeBasis {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = 1i64 << (bits - 1);
        let rows: Vec<Vec<i64>> = (0..n)
            .map(|_| (0..n).map(|_| rng.gen_range(-half..half)).collect())
            .collect();
        LatticeBasis::from_rows(&rows).unwrap()
    }

    /// Subset-sum lattice: 2·I with the weights in the last column
    fn subset_sum(a: &[i64], s: i64) -> LatticeBasis {
        let m = a.len() + 1;
        let mut rows = vec![vec![0i64; m]; m];
        for (i, &ai) in a.iter().enumerate() {
            rows[i][i] = 2;
            rows[i][m - 1] = ai;
        }
        for j in 0..a.len() {
            rows[m - 1][j] = 1;
        }
        rows[m - 1][m - 1] = s;
        LatticeBasis::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_reduced_basis_keeps_volume() {
        let basis = random_basis(6, 12, 7);
        let config = LLLConfig::default();
        let (reduced, _) = LLL::reduce(&basis, &config);

        assert!(LLL::is_reduced(&reduced, &config));
        assert_eq!(
            determinant(&reduced).map(|d| d.abs()),
            determinant(&basis).map(|d| d.abs())
        );
    }

    #[test]
    fn test_subset_sum_lattice() {
        let basis = subset_sum(&[3, 5, 7], 12);
        for config in [LLLConfig::default(), LLLConfig::strong()] {
            let (reduced, _) = LLL::reduce(&basis, &config);
            assert!(LLL::is_reduced(&reduced, &config));
            assert_eq!(reduced.n, 4);
        }
    }

    #[test]
    fn test_reduced_input_is_untouched() {
        let basis = LatticeBasis::from_rows(&[vec![2i64, 0, 0], vec![0, 3, 0], vec![0, 0, 5]]).unwrap();
        let (reduced, stats) = LLL::reduce(&basis, &LLLConfig::strong());
        assert_eq!(stats.swaps, 0);
        assert_eq!(stats.size_reductions, 0);
        assert_eq!(reduced, basis);
    }

    #[test]
    fn test_short_vector_in_modular_lattice() {
        // Rows (1, a) and (0, p) contain (x, a*x mod p) for every x; with
        // a = 3 * 17^-1 mod p the vector (17, 3) is unusually short.
        let p = 1_000_003i64;
        let inv17 = (1..p).find(|x| (17 * x) % p == 1).unwrap();
        let a = (3 * inv17) % p;
        let basis = LatticeBasis::from_rows(&[vec![1i64, a], vec![0, p]]).unwrap();

        let (reduced, _) = LLL::reduce(&basis, &LLLConfig::default());
        assert_eq!(reduced.norm_squared(0), BigInt::from(17 * 17 + 3 * 3));
    }

    #[test]
    fn test_dependent_generating_set() {
        let basis = LatticeBasis::from_rows(&[
            vec![2i64, 4, 6],
            vec![1, 2, 3],
            vec![0, 5, 1],
            vec![3, 11, 10],
        ])
        .unwrap();

        let config = LLLConfig::default();
        let (reduced, stats) = LLL::reduce(&basis, &config);
        assert_eq!(reduced.n, 2);
        assert_eq!(stats.dependent_rows, 2);
        assert!(LLL::is_reduced(&reduced, &config));
    }

    #[test]
    fn test_row_echelon_spans_same_lattice() {
        // 6Z + 10Z = 2Z
        let basis = LatticeBasis::from_rows(&[vec![6i64], vec![10]]).unwrap();
        let echelon = row_echelon(&basis);
        assert_eq!(echelon.n, 1);
        assert_eq!(echelon.get(0)[0].abs(), BigInt::from(2));
    }

    #[test]
    fn test_config_validation() {
        assert!(LLLConfig::default().is_valid());
        assert!(LLLConfig::strong().is_valid());
        let loose = LLLConfig { delta_num: 1, delta_den: 5, ..Default::default() };
        assert!(!loose.is_valid());
        let over = LLLConfig { delta_num: 101, delta_den: 100, ..Default::default() };
        assert!(!over.is_valid());
    }
}
