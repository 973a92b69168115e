//! Random modular recovery
//!
//! Each trial draws a random `modulus_bits`-bit modulus `p`, coefficients
//! `a, b < p` and unknowns `x, y < 2^unknown_bits`, publishes
//! `c = a·x + b·y mod p` and recovers `(x, y)` from `(a, b, c, p)`.
//! With `cached`, `p, a, b` are drawn once and every trial reuses the same
//! reduction through a [`CvpSolver`].

use anyhow::{ensure, Result};
use lineq_core::{
    solve_lineq_poly, Bound, Constraint, CvpAlgorithm, CvpSolver, LinearExpr, ReductionConfig,
    Reducer, SolveConfig,
};
use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

pub struct DemoOptions {
    pub modulus_bits: u64,
    pub unknown_bits: u64,
    pub trials: usize,
    pub seed: Option<u64>,
    pub cached: bool,
    pub solve: SolveConfig,
    pub reduction: ReductionConfig,
}

/// Public coefficients of `a·x + b·y ≡ c (mod p)`
#[derive(Debug, Clone)]
pub struct Relation {
    pub p: BigInt,
    pub a: BigInt,
    pub b: BigInt,
}

impl Relation {
    pub fn random<R: Rng>(rng: &mut R, modulus_bits: u64) -> Self {
        let low = BigInt::one() << (modulus_bits - 1);
        let high = BigInt::one() << modulus_bits;
        let p = rng.gen_bigint_range(&low, &high);
        let a = rng.gen_bigint_range(&BigInt::zero(), &p);
        let b = rng.gen_bigint_range(&BigInt::zero(), &p);
        Self { p, a, b }
    }

    pub fn evaluate(&self, x: &BigInt, y: &BigInt) -> BigInt {
        let c = (&self.a * x + &self.b * y) % &self.p;
        if c < BigInt::zero() {
            c + &self.p
        } else {
            c
        }
    }

    /// `[a·x + b·y mod p, x, y]`
    pub fn exprs(&self) -> Result<Vec<LinearExpr>> {
        let x = LinearExpr::var("x");
        let y = LinearExpr::var("y");
        let combined = x
            .scale(self.a.clone())
            .add(&y.scale(self.b.clone()))?
            .modulo(self.p.clone())?;
        Ok(vec![combined, x, y])
    }

    pub fn constraints(&self, c: &BigInt, unknown_bits: u64) -> Result<Vec<Constraint>> {
        let top = max_unknown(unknown_bits);
        let exprs = self.exprs()?;
        Ok(vec![
            exprs[0].equals(c.clone()),
            exprs[1].in_range(0, top.clone())?,
            exprs[2].in_range(0, top)?,
        ])
    }
}

fn max_unknown(unknown_bits: u64) -> BigInt {
    (BigInt::one() << unknown_bits) - 1
}

/// Result of one trial
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub recovered: bool,
    pub elapsed_ms: f64,
}

/// One uncached trial against `relation`
pub fn run_trial<R: Rng>(
    rng: &mut R,
    relation: &Relation,
    unknown_bits: u64,
    config: &SolveConfig,
    reducer: &dyn Reducer,
) -> Result<TrialResult> {
    let bound = BigInt::one() << unknown_bits;
    let x = rng.gen_bigint_range(&BigInt::zero(), &bound);
    let y = rng.gen_bigint_range(&BigInt::zero(), &bound);
    let c = relation.evaluate(&x, &y);

    let start = Instant::now();
    let found = solve_lineq_poly(&relation.constraints(&c, unknown_bits)?, config, reducer)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let recovered = matches!(&found, Some(values) if values[1] == x && values[2] == y);
    log::debug!("x = {}, y = {}, c = {}: recovered = {}", x, y, c, recovered);
    Ok(TrialResult { recovered, elapsed_ms })
}

/// One trial through the caching solver
pub fn run_cached_trial<R: Rng>(
    rng: &mut R,
    solver: &mut CvpSolver,
    relation: &Relation,
    unknown_bits: u64,
) -> Result<TrialResult> {
    let bound = BigInt::one() << unknown_bits;
    let x = rng.gen_bigint_range(&BigInt::zero(), &bound);
    let y = rng.gen_bigint_range(&BigInt::zero(), &bound);
    let c = relation.evaluate(&x, &y);

    let top = max_unknown(unknown_bits);
    let bounds = vec![
        Bound::exact(c),
        Bound::new(0, top.clone())?,
        Bound::new(0, top)?,
    ];

    let start = Instant::now();
    let found = solver.solve(&bounds, true)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let recovered = matches!(&found, Some(values) if values[1] == x && values[2] == y);
    Ok(TrialResult { recovered, elapsed_ms })
}

pub fn run_demo(options: &DemoOptions) -> Result<()> {
    ensure!(options.modulus_bits >= 2, "modulus must have at least 2 bits");
    ensure!(options.unknown_bits >= 1, "unknowns must have at least 1 bit");
    if 2 * options.unknown_bits >= options.modulus_bits {
        log::warn!(
            "two {}-bit unknowns carry more entropy than a {}-bit relation; recovery is unlikely",
            options.unknown_bits,
            options.modulus_bits
        );
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let algorithm = if options.cached {
        CvpAlgorithm::Babai
    } else {
        options.solve.algorithm
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Bounded Modular Recovery (weighted CVP)           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Modulus: {} bits, unknowns: {} bits, CVP: {}, reducer: {}{}",
        options.modulus_bits,
        options.unknown_bits,
        algorithm,
        options.reduction.algorithm,
        if options.cached { " (cached)" } else { "" }
    );
    println!();

    let mut cached = if options.cached {
        let relation = Relation::random(&mut rng, options.modulus_bits);
        let solver = CvpSolver::from_exprs(&relation.exprs()?, options.reduction.build()?)?;
        Some((relation, solver))
    } else {
        None
    };
    let reducer = options.reduction.build()?;

    println!("┌───────┬───────────┬────────────┐");
    println!("│ trial │ recovered │  time (ms) │");
    println!("├───────┼───────────┼────────────┤");

    let mut results = Vec::with_capacity(options.trials);
    for trial in 0..options.trials {
        let result = match cached.as_mut() {
            Some((relation, solver)) => {
                run_cached_trial(&mut rng, solver, relation, options.unknown_bits)?
            }
            None => {
                let relation = Relation::random(&mut rng, options.modulus_bits);
                run_trial(
                    &mut rng,
                    &relation,
                    options.unknown_bits,
                    &options.solve,
                    &*reducer,
                )?
            }
        };
        println!(
            "│ {:>5} │     {}     │ {:>10.2} │",
            trial + 1,
            if result.recovered { "✓" } else { "✗" },
            result.elapsed_ms
        );
        results.push(result);
    }

    println!("└───────┴───────────┴────────────┘");
    println!();

    let recovered = results.iter().filter(|r| r.recovered).count();
    let total_ms: f64 = results.iter().map(|r| r.elapsed_ms).sum();
    println!("Recovered: {}/{}", recovered, options.trials);
    if !results.is_empty() {
        println!("Mean time: {:.2} ms", total_ms / results.len() as f64);
    }
    if let Some((_, solver)) = &cached {
        let stats = solver.stats();
        println!("Cache:     {} hits, {} misses", stats.hits, stats.misses);
    }

    Ok(())
}
