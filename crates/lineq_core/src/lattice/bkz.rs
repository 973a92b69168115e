//! BKZ (Block Korkine-Zolotarev) reduction
//!
//! Starts from an LLL-reduced basis and repeatedly sweeps a window of
//! `block_size` vectors over it. For each window the projected sublattice is
//! searched with Schnorr-Euchner enumeration; a vector shorter than the
//! current first projected vector is inserted and the basis is LLL-reduced
//! again.
//!
//! The basis itself stays exact. Only the enumeration runs in `f64`, on
//! Gram-Schmidt data converted from the exact rationals, so rounding can at
//! worst make a tour miss an improvement.

use super::basis::LatticeBasis;
use super::gram_schmidt::GramSchmidt;
use super::lll::{LLLConfig, LLL};
use num_bigint::BigInt;
use num_integer::Integer;
use std::time::Instant;

/// A candidate must beat the current block head by this factor
const IMPROVEMENT_FACTOR: f64 = 0.99;

/// BKZ configuration parameters
#[derive(Debug, Clone)]
pub struct BkzConfig {
    /// Window size β (2 degenerates to LLL)
    pub block_size: usize,
    /// LLL parameters used before and after every insertion
    pub lll: LLLConfig,
    /// Upper bound on full sweeps over the basis
    pub max_tours: usize,
    /// Node budget for a single enumeration
    pub max_nodes: u64,
}

impl Default for BkzConfig {
    fn default() -> Self {
        Self {
            block_size: 10,
            lll: LLLConfig::strong(),
            max_tours: 8,
            max_nodes: 200_000,
        }
    }
}

impl BkzConfig {
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size,
            ..Default::default()
        }
    }
}

/// Statistics from a BKZ run
#[derive(Debug, Clone, Default)]
pub struct BkzStats {
    pub tours: usize,
    pub improvements: usize,
    pub enum_calls: usize,
    pub enum_nodes: u64,
    /// Enumerations that hit `max_nodes`
    pub enum_timeouts: usize,
    pub total_time: f64,
}

/// BKZ lattice reduction
pub struct BKZ;

impl BKZ {
    /// Reduce a lattice basis with BKZ-β
    pub fn reduce(basis: &LatticeBasis, config: &BkzConfig) -> (LatticeBasis, BkzStats) {
        let start = Instant::now();
        let mut stats = BkzStats::default();

        let (mut b, _) = LLL::reduce(basis, &config.lll);
        let n = b.n;
        if n < 2 || config.block_size < 2 {
            stats.total_time = start.elapsed().as_secs_f64();
            return (b, stats);
        }

        for tour in 0..config.max_tours {
            stats.tours += 1;
            let improvements_before = stats.improvements;
            let mut gs = GramSchmidt::compute(&b);

            for k in 0..n - 1 {
                let end = (k + config.block_size).min(n);
                let (mu, r) = projected_block(&gs, k, end);

                stats.enum_calls += 1;
                let mut search = Enumeration::new(&mu, &r, config.max_nodes);
                let found = search.run(IMPROVEMENT_FACTOR * r[0]);
                stats.enum_nodes += search.nodes;
                if search.nodes >= config.max_nodes {
                    stats.enum_timeouts += 1;
                }

                if let Some(coeffs) = found {
                    insert_vector(&mut b, k, &coeffs);
                    b = LLL::reduce(&b, &config.lll).0;
                    gs = GramSchmidt::compute(&b);
                    stats.improvements += 1;
                }
            }

            log::debug!(
                "BKZ-{} tour {}: {} improvements",
                config.block_size,
                tour + 1,
                stats.improvements - improvements_before
            );
            if stats.improvements == improvements_before {
                break;
            }
        }

        stats.total_time = start.elapsed().as_secs_f64();
        log::debug!(
            "BKZ completed: {}×{}, {} tours, {} improvements, {} enumeration nodes, {:.3}s",
            b.n, b.m, stats.tours, stats.improvements, stats.enum_nodes, stats.total_time
        );
        (b, stats)
    }
}

/// μ and ||b*||² of rows `start..end`, re-indexed from zero, as `f64`
fn projected_block(gs: &GramSchmidt, start: usize, end: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mu = (start..end)
        .map(|i| (start..i).map(|j| gs.get_mu(i, j).to_f64()).collect())
        .collect();
    let r = (start..end).map(|i| gs.get_norm_sq(i).to_f64()).collect();
    (mu, r)
}

/// Schnorr-Euchner enumeration over a projected block
///
/// Finds the non-zero coefficient vector x minimizing
/// Σ_i (x_i + Σ_{j>i} x_j μ_ji)² r_i below an initial radius, shrinking the
/// radius every time a shorter vector is reached.
struct Enumeration<'a> {
    mu: &'a [Vec<f64>],
    r: &'a [f64],
    x: Vec<i64>,
    best: Option<Vec<i64>>,
    best_sq: f64,
    nodes: u64,
    max_nodes: u64,
}

impl<'a> Enumeration<'a> {
    fn new(mu: &'a [Vec<f64>], r: &'a [f64], max_nodes: u64) -> Self {
        Self {
            mu,
            r,
            x: vec![0; r.len()],
            best: None,
            best_sq: f64::INFINITY,
            nodes: 0,
            max_nodes,
        }
    }

    /// Shortest non-zero vector with squared norm below `radius_sq`
    fn run(&mut self, radius_sq: f64) -> Option<Vec<i64>> {
        if self.r.is_empty() || self.r.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return None;
        }
        self.best_sq = radius_sq;
        self.search(self.r.len() - 1, 0.0);
        self.best.take()
    }

    fn search(&mut self, level: usize, partial: f64) {
        self.nodes += 1;
        if self.nodes >= self.max_nodes {
            return;
        }

        let center: f64 = -(level + 1..self.x.len())
            .map(|j| self.x[j] as f64 * self.mu[j][level])
            .sum::<f64>();
        let base = center.round() as i64;

        // Zig-zag around the center: base, base ± 1, base ± 2, ...
        let mut step = 0i64;
        loop {
            let offsets = [step, -step];
            let count = if step == 0 { 1 } else { 2 };
            let mut inside = false;
            for &offset in &offsets[..count] {
                let value = base + offset;
                let diff = value as f64 - center;
                let dist = partial + diff * diff * self.r[level];
                if dist >= self.best_sq {
                    continue;
                }
                inside = true;
                self.x[level] = value;
                if level == 0 {
                    if self.x.iter().any(|&v| v != 0) {
                        self.best_sq = dist;
                        self.best = Some(self.x.clone());
                    }
                } else {
                    self.search(level - 1, dist);
                }
            }
            if !inside || self.nodes >= self.max_nodes {
                break;
            }
            step += 1;
        }
        self.x[level] = 0;
    }
}

/// Make Σ coeffs_i b_{start+i} the basis vector at `start`
///
/// Unimodular Euclid on the coefficients: `c_i -= q c_j` paired with
/// `b_j += q b_i` leaves Σ c_i b_i unchanged, and ends with a single
/// coefficient ±1 once the coefficients are coprime.
pub(crate) fn insert_vector(basis: &mut LatticeBasis, start: usize, coeffs: &[i64]) {
    let g = coeffs.iter().fold(0i64, |acc, &c| acc.gcd(&c));
    if g == 0 {
        return;
    }
    let mut c: Vec<i64> = coeffs.iter().map(|&x| x / g).collect();

    loop {
        let pivot = (0..c.len())
            .filter(|&i| c[i] != 0)
            .min_by_key(|&i| c[i].abs());
        let Some(j) = pivot else { return };

        let mut done = true;
        for i in 0..c.len() {
            if i == j || c[i] == 0 {
                continue;
            }
            let q = Integer::div_floor(&c[i], &c[j]);
            c[i] -= q * c[j];
            basis.add_multiple(start + j, start + i, &BigInt::from(q));
            if c[i] != 0 {
                done = false;
            }
        }

        if done {
            if c[j] < 0 {
                basis.negate_vector(start + j);
            }
            let row = basis.vectors.remove(start + j);
            basis.vectors.insert(start, row);
            return;
        }
    }
}
