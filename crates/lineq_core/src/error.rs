//! Error types for lineq_core

use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineqError {
    #[error("polynomial is not linear")]
    NonLinear,

    #[error("incompatible modulus: {left} vs {right}")]
    IncompatibleModulus { left: BigInt, right: BigInt },

    #[error("modulus must be positive, got {0}")]
    InvalidModulus(BigInt),

    #[error("invalid bound: lower bound {lb} is greater than upper bound {ub}")]
    InvalidBound { lb: BigInt, ub: BigInt },

    #[error("length mismatch: expected {expected} bounds (one per column), got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid algorithm '{0}', must either be 'kannan' or 'babai'")]
    InvalidAlgorithm(String),

    #[error("invalid reduction parameters: {0}")]
    InvalidReduction(String),

    #[error("lattice basis is empty")]
    EmptyBasis,

    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedBasis { row: usize, expected: usize, found: usize },

    #[error("'{tool}' is not installed on your system: {hint}")]
    ReducerUnavailable { tool: &'static str, hint: &'static str },

    #[error("reducer '{tool}' failed: {message}")]
    ReducerFailed { tool: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LineqError>;
