//! lineq core library
//!
//! Recovers bounded unknowns from linear (optionally modular) integer
//! relations by turning them into a weighted closest vector problem.
//!
//! # Overview
//!
//! Constraints such as `a·x + b·y ≡ c (mod p)`, `0 ≤ x < 2⁴⁰` are flattened
//! into a lattice basis whose points are exactly the value vectors of the
//! constraint expressions. Each coordinate is weighted by the width of its
//! bound, and a CVP engine (Kannan embedding or Babai nearest plane) looks for
//! the lattice point closest to the center of the bound box.
//!
//! # Key Components
//!
//! - [`constraint`] - Linear expressions and range constraints
//! - [`builder`] - Constraint list → lattice basis
//! - [`weights`] - Per-column CVP weights
//! - [`cvp`] - Kannan and Babai CVP engines
//! - [`solve`] - One-shot solving (`solve_lineq`, `solve_lineq_poly`)
//! - [`cache`] - Solver that reuses reductions across queries
//! - [`ortho`] - Orthogonal lattices
//! - [`reduce`] - The `Reducer` capability and bundled reducers
//! - [`lattice`] - Exact LLL, BKZ and Gram-Schmidt
//!
//! # Example
//!
//! ```
//! use lineq_core::{solve_lineq_poly, LinearExpr, LllReducer, SolveConfig};
//! use num_bigint::BigInt;
//!
//! let x = LinearExpr::var("x");
//! let relations = vec![
//!     x.scale(5).add_constant(3).modulo(1009).unwrap().equals(38),
//!     x.in_range(0, 15).unwrap(),
//! ];
//! let found = solve_lineq_poly(&relations, &SolveConfig::babai().checked(), &LllReducer::default())
//!     .unwrap();
//! assert_eq!(found, Some(vec![BigInt::from(38), BigInt::from(7)]));
//! ```

pub mod bounds;
pub mod builder;
pub mod cache;
pub mod constraint;
pub mod cvp;
pub mod determinant;
pub mod error;
pub mod flatter;
pub mod lattice;
pub mod ortho;
pub mod rational;
pub mod reduce;
pub mod solve;
pub mod weights;

pub use bounds::Bound;
pub use builder::{constraints_to_matrix, ConstraintMatrix};
pub use cache::{CacheStats, CvpSolver};
pub use constraint::{Constraint, LinearExpr};
pub use cvp::{cvp_babai, cvp_kannan, CvpAlgorithm};
pub use determinant::determinant;
pub use error::{LineqError, Result};
pub use lattice::{LatticeBasis, NearestPlane};
pub use ortho::ortho_lattice;
pub use rational::Rational;
pub use reduce::{
    BkzReducer, FlatterReducer, LllReducer, ReductionAlgorithm, ReductionConfig, Reducer,
};
pub use solve::{solve_lineq, solve_lineq_poly, SolveConfig};
pub use weights::cvp_weights;
