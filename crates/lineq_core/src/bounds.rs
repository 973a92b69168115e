//! Per-coordinate bounds

use crate::error::{LineqError, Result};
use num_bigint::BigInt;
use std::fmt;

/// Inclusive range `[lb, ub]` for one basis column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub lb: BigInt,
    pub ub: BigInt,
}

impl Bound {
    pub fn new(lb: impl Into<BigInt>, ub: impl Into<BigInt>) -> Result<Self> {
        let (lb, ub) = (lb.into(), ub.into());
        if lb > ub {
            return Err(LineqError::InvalidBound { lb, ub });
        }
        Ok(Self { lb, ub })
    }

    /// The single value `v`
    pub fn exact(v: impl Into<BigInt>) -> Self {
        let v = v.into();
        Self { lb: v.clone(), ub: v }
    }

    /// `ub - lb`
    pub fn width(&self) -> BigInt {
        &self.ub - &self.lb
    }

    /// `lb + ub`, twice the center
    pub fn doubled_center(&self) -> BigInt {
        &self.lb + &self.ub
    }

    pub fn contains(&self, x: &BigInt) -> bool {
        &self.lb <= x && x <= &self.ub
    }

    /// The same range moved by `-offset`
    pub fn shifted_down(&self, offset: &BigInt) -> Self {
        Self {
            lb: &self.lb - offset,
            ub: &self.ub - offset,
        }
    }
}

impl From<(i64, i64)> for Bound {
    fn from((lb, ub): (i64, i64)) -> Self {
        Self { lb: lb.into(), ub: ub.into() }
    }
}

impl From<(BigInt, BigInt)> for Bound {
    fn from((lb, ub): (BigInt, BigInt)) -> Self {
        Self { lb, ub }
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Self::exact(v)
    }
}

impl From<BigInt> for Bound {
    fn from(v: BigInt) -> Self {
        Self::exact(v)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lb == self.ub {
            write!(f, "{}", self.lb)
        } else {
            write!(f, "{}..{}", self.lb, self.ub)
        }
    }
}

/// One bound per column, each with `lb <= ub`
pub fn validate_bounds(bounds: &[Bound], columns: usize) -> Result<()> {
    if bounds.len() != columns {
        return Err(LineqError::LengthMismatch {
            expected: columns,
            actual: bounds.len(),
        });
    }
    if let Some(bad) = bounds.iter().find(|b| b.lb > b.ub) {
        return Err(LineqError::InvalidBound {
            lb: bad.lb.clone(),
            ub: bad.ub.clone(),
        });
    }
    Ok(())
}

/// Every coordinate of `x` lies inside its bound
pub fn within_bounds(x: &[BigInt], bounds: &[Bound]) -> bool {
    x.len() == bounds.len() && x.iter().zip(bounds).all(|(v, b)| b.contains(v))
}
