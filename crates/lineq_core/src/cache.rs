//! Caching CVP solver
//!
//! Brute-force loops often ask many queries against one basis where only the
//! bound *centers* move while the bound *widths* stay the same. The weights,
//! and therefore the weighted basis and its reduction, depend only on the
//! widths, so [`CvpSolver`] reduces once per width signature and answers
//! every further query with a single nearest-plane pass.
//!
//! The cache is never evicted; [`CvpSolver::clear_cache`] drops it on demand.

use crate::bounds::{validate_bounds, Bound};
use crate::builder::exprs_to_matrix;
use crate::constraint::LinearExpr;
use crate::error::{LineqError, Result};
use crate::lattice::{LatticeBasis, NearestPlane};
use crate::reduce::Reducer;
use crate::solve::{accept, add_constants, unweight, weighted_basis, weighted_target};
use crate::weights::cvp_weights;
use num_bigint::BigInt;
use std::collections::HashMap;
use std::time::Instant;

/// Reduced weighted basis for one width signature
#[derive(Debug, Clone)]
struct CacheEntry {
    plane: NearestPlane,
    weights: Vec<BigInt>,
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Babai solver with reductions cached by bound widths
pub struct CvpSolver {
    basis: LatticeBasis,
    /// Constant terms when built from expressions
    constants: Option<Vec<BigInt>>,
    reducer: Box<dyn Reducer>,
    cache: HashMap<Vec<BigInt>, CacheEntry>,
    stats: CacheStats,
}

impl CvpSolver {
    pub fn from_basis(basis: LatticeBasis, reducer: Box<dyn Reducer>) -> Self {
        Self {
            basis,
            constants: None,
            reducer,
            cache: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Solver over the values of `exprs`
    ///
    /// Bounds passed to [`solve`](Self::solve) then constrain the expression
    /// values including their constant terms, and results are expression
    /// values, as with [`solve_lineq_poly`](crate::solve::solve_lineq_poly).
    pub fn from_exprs(exprs: &[LinearExpr], reducer: Box<dyn Reducer>) -> Result<Self> {
        let refs: Vec<&LinearExpr> = exprs.iter().collect();
        let cm = exprs_to_matrix(&refs)?;
        let mut solver = Self::from_basis(cm.basis, reducer);
        solver.constants = Some(cm.constants);
        Ok(solver)
    }

    pub fn basis(&self) -> &LatticeBasis {
        &self.basis
    }

    /// Number of cached width signatures
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Lattice point near the center of `bounds`
    ///
    /// Same contract as [`solve_lineq`](crate::solve::solve_lineq) with the
    /// Babai engine. With `check`, `Ok(None)` unless the point is in bounds.
    pub fn solve(&mut self, bounds: &[Bound], check: bool) -> Result<Option<Vec<BigInt>>> {
        validate_bounds(bounds, self.basis.m)?;
        let bounds: Vec<Bound> = match &self.constants {
            Some(constants) => bounds
                .iter()
                .zip(constants)
                .map(|(b, c)| b.shifted_down(c))
                .collect(),
            None => bounds.to_vec(),
        };

        let signature: Vec<BigInt> = bounds.iter().map(Bound::width).collect();
        if self.cache.contains_key(&signature) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let entry = self.prepare(&bounds)?;
            self.cache.insert(signature.clone(), entry);
        }
        let entry = &self.cache[&signature];

        let target = weighted_target(&bounds, &entry.weights);
        let point = unweight(&entry.plane.closest(&target), &entry.weights);
        let result = accept(point, &bounds, check);

        Ok(match &self.constants {
            Some(constants) => result.map(|values| add_constants(values, constants)),
            None => result,
        })
    }

    /// Weights, weighted basis and its reduction for a new signature
    fn prepare(&self, bounds: &[Bound]) -> Result<CacheEntry> {
        let start = Instant::now();
        let weights = cvp_weights(&self.basis, bounds)?;
        let reduced = self.reducer.reduce(&weighted_basis(&self.basis, &weights))?;
        if reduced.m != self.basis.m {
            return Err(LineqError::ReducerFailed {
                tool: self.reducer.name(),
                message: format!("returned {} columns, expected {}", reduced.m, self.basis.m),
            });
        }
        let plane = NearestPlane::new(reduced);
        log::debug!(
            "cache miss: reduced {}×{} basis with {} in {:.3}s ({} entries)",
            self.basis.n,
            self.basis.m,
            self.reducer.name(),
            start.elapsed().as_secs_f64(),
            self.cache.len() + 1
        );
        Ok(CacheEntry { plane, weights })
    }
}

impl std::fmt::Debug for CvpSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CvpSolver")
            .field("dimensions", &(self.basis.n, self.basis.m))
            .field("reducer", &self.reducer.name())
            .field("cache_len", &self.cache.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::LllReducer;
    use crate::solve::{solve_lineq, SolveConfig};
    use std::cell::Cell;
    use std::rc::Rc;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().copied().map(BigInt::from).collect()
    }

    fn counting_reducer() -> (Box<dyn Reducer>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let reducer = move |b: &LatticeBasis| -> Result<LatticeBasis> {
            counter.set(counter.get() + 1);
            LllReducer::default().reduce(b)
        };
        (Box::new(reducer), calls)
    }

    /// Rows (1, a) and (0, p): lattice points are (x, a*x mod p)
    fn modular_basis(p: i64, a: i64) -> LatticeBasis {
        LatticeBasis::from_rows(&[vec![1i64, a], vec![0, p]]).unwrap()
    }

    #[test]
    fn test_same_widths_reuse_reduction() {
        let (p, a) = (1_000_003i64, 271_828i64);
        let (reducer, calls) = counting_reducer();
        let mut solver = CvpSolver::from_basis(modular_basis(p, a), reducer);

        for x in [17i64, 42, 99] {
            let y = (a * x) % p;
            let bounds = vec![Bound::new(0, 127).unwrap(), Bound::exact(y)];
            let found = solver.solve(&bounds, true).unwrap();
            assert_eq!(found, Some(ints(&[x, y])));
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(solver.cache_len(), 1);
        assert_eq!(solver.stats(), CacheStats { hits: 2, misses: 1 });

        // A different width is a new entry
        let bounds = vec![Bound::new(0, 255).unwrap(), Bound::exact((a * 200) % p)];
        assert_eq!(solver.solve(&bounds, true).unwrap(), Some(ints(&[200, (a * 200) % p])));
        assert_eq!(calls.get(), 2);
        assert_eq!(solver.cache_len(), 2);

        solver.clear_cache();
        assert_eq!(solver.cache_len(), 0);
    }

    #[test]
    fn test_matches_one_shot_solver() {
        let (p, a) = (1_000_003i64, 314_159i64);
        let basis = modular_basis(p, a);
        let mut solver = CvpSolver::from_basis(basis.clone(), Box::new(LllReducer::default()));
        let reducer = LllReducer::default();

        for x in [3i64, 250, 1000] {
            let y = (a * x) % p;
            let bounds = vec![Bound::new(0, 1023).unwrap(), Bound::exact(y)];
            let cached = solver.solve(&bounds, false).unwrap();
            let one_shot = solve_lineq(&basis, &bounds, &SolveConfig::babai(), &reducer).unwrap();
            assert_eq!(cached, one_shot);
            assert_eq!(cached, Some(ints(&[x, y])));
        }
    }

    #[test]
    fn test_check_filters_infeasible_query() {
        let basis = LatticeBasis::from_rows(&[vec![10i64, 0], vec![0, 10]]).unwrap();
        let mut solver = CvpSolver::from_basis(basis, Box::new(LllReducer::default()));

        let empty_box = vec![Bound::new(1, 9).unwrap(), Bound::new(1, 9).unwrap()];
        assert_eq!(solver.solve(&empty_box, true).unwrap(), None);

        // Same widths, shifted onto a lattice point
        let shifted = vec![Bound::new(16, 24).unwrap(), Bound::new(-4, 4).unwrap()];
        assert_eq!(solver.solve(&shifted, true).unwrap(), Some(ints(&[20, 0])));
        assert_eq!(solver.cache_len(), 1);
    }

    #[test]
    fn test_from_exprs_shifts_constants() {
        // 5x + 3 ≡ c (mod 1009), x in [0, 15]
        let x = LinearExpr::var("x");
        let exprs = vec![
            x.scale(5).add_constant(3).modulo(1009).unwrap(),
            x.clone(),
        ];
        let mut solver = CvpSolver::from_exprs(&exprs, Box::new(LllReducer::default())).unwrap();
        assert_eq!(solver.basis().n, 2);

        for xv in [0i64, 7, 15] {
            let c = (5 * xv + 3) % 1009;
            let bounds = vec![Bound::exact(c), Bound::new(0, 15).unwrap()];
            assert_eq!(solver.solve(&bounds, true).unwrap(), Some(ints(&[c, xv])));
        }
        assert_eq!(solver.cache_len(), 1);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut solver = CvpSolver::from_basis(modular_basis(11, 3), Box::new(LllReducer::default()));
        assert!(matches!(
            solver.solve(&[Bound::exact(1)], false),
            Err(LineqError::LengthMismatch { .. })
        ));
        assert_eq!(solver.cache_len(), 0);
    }
}
