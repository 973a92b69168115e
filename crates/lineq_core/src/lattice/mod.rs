//! Lattice basis reduction algorithms
//!
//! Exact big-integer lattice code used by the CVP engines.
//!
//! # Key Components
//!
//! - [`LatticeBasis`] - Row-major integer basis
//! - [`GramSchmidt`] - Exact rational Gram-Schmidt orthogonalization
//! - [`NearestPlane`] - Precomputed projections for Babai's algorithm
//! - [`LLL`] - LLL lattice reduction
//! - [`BKZ`] - Block Korkine-Zolotarev reduction on top of LLL
//!
//! # Example
//!
//! ```
//! use lineq_core::lattice::{LatticeBasis, LLL, LLLConfig};
//!
//! let basis = LatticeBasis::from_rows(&[
//!     vec![1i64, 0, 3],
//!     vec![0, 1, 5],
//!     vec![0, 0, 7],
//! ])
//! .unwrap();
//!
//! let (reduced, stats) = LLL::reduce(&basis, &LLLConfig::default());
//! assert_eq!(reduced.n, 3);
//! println!("{} swaps", stats.swaps);
//! ```

pub mod basis;
pub mod bkz;
pub mod gram_schmidt;
pub mod lll;

pub use basis::LatticeBasis;
pub use bkz::{BkzConfig, BkzStats, BKZ};
pub use gram_schmidt::{GramSchmidt, NearestPlane};
pub use lll::{LLLConfig, LLLStats, LLL};
