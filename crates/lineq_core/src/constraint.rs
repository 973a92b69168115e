//! Symbolic linear constraints
//!
//! [`LinearExpr`] is a linear combination of named integer unknowns plus a
//! constant, optionally reduced modulo a positive modulus. Expressions are
//! immutable values built with explicit combinators:
//!
//! ```
//! use lineq_core::constraint::LinearExpr;
//!
//! let expr = LinearExpr::term(3, "x")
//!     .add(&LinearExpr::term(4, "y"))
//!     .unwrap()
//!     .modulo(6)
//!     .unwrap();
//! let constraint = expr.in_range(3, 5).unwrap();
//! assert_eq!(constraint.to_string(), "3*x + 4*y == 3..5 (mod 6)");
//! ```

use crate::error::{LineqError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// Linear polynomial over the integers with an optional modulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearExpr {
    /// Non-zero coefficients, in order of first appearance
    terms: Vec<(String, BigInt)>,
    constant: BigInt,
    modulus: Option<BigInt>,
}

impl LinearExpr {
    /// The unknown `name` with coefficient 1
    pub fn var(name: impl Into<String>) -> Self {
        Self::term(1, name)
    }

    pub fn constant(c: impl Into<BigInt>) -> Self {
        Self {
            terms: Vec::new(),
            constant: c.into(),
            modulus: None,
        }
    }

    /// `c * name`
    pub fn term(c: impl Into<BigInt>, name: impl Into<String>) -> Self {
        let mut expr = Self::constant(0);
        expr.terms.push((name.into(), c.into()));
        expr.normalized()
    }

    pub fn terms(&self) -> &[(String, BigInt)] {
        &self.terms
    }

    /// Coefficient of `name` (zero if absent)
    pub fn coefficient(&self, name: &str) -> BigInt {
        self.terms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
            .unwrap_or_else(BigInt::zero)
    }

    pub fn constant_term(&self) -> &BigInt {
        &self.constant
    }

    pub fn modulus(&self) -> Option<&BigInt> {
        self.modulus.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(n, _)| n.as_str())
    }

    pub fn add(&self, other: &LinearExpr) -> Result<Self> {
        let modulus = self.combined_modulus(other.modulus.as_ref())?;
        let mut terms = self.terms.clone();
        for (name, c) in &other.terms {
            match terms.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing += c,
                None => terms.push((name.clone(), c.clone())),
            }
        }
        Ok(Self {
            terms,
            constant: &self.constant + &other.constant,
            modulus,
        }
        .normalized())
    }

    pub fn sub(&self, other: &LinearExpr) -> Result<Self> {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        self.scale(-1)
    }

    /// Multiply by an integer constant
    pub fn scale(&self, k: impl Into<BigInt>) -> Self {
        let k = k.into();
        Self {
            terms: self.terms.iter().map(|(n, c)| (n.clone(), c * &k)).collect(),
            constant: &self.constant * &k,
            modulus: self.modulus.clone(),
        }
        .normalized()
    }

    pub fn add_constant(&self, c: impl Into<BigInt>) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: &self.constant + c.into(),
            modulus: self.modulus.clone(),
        }
        .normalized()
    }

    /// Product of two expressions, at least one of which must be constant
    pub fn mul(&self, other: &LinearExpr) -> Result<Self> {
        let modulus = self.combined_modulus(other.modulus.as_ref())?;
        let product = if other.is_constant() {
            self.scale(other.constant.clone())
        } else if self.is_constant() {
            other.scale(self.constant.clone())
        } else {
            return Err(LineqError::NonLinear);
        };
        Ok(Self { modulus, ..product }.normalized())
    }

    /// Reduce modulo `m`
    pub fn modulo(&self, m: impl Into<BigInt>) -> Result<Self> {
        let m = m.into();
        if !m.is_positive() {
            return Err(LineqError::InvalidModulus(m));
        }
        let modulus = self.combined_modulus(Some(&m))?;
        Ok(Self {
            modulus,
            ..self.clone()
        }
        .normalized())
    }

    /// `self == v`
    pub fn equals(&self, v: impl Into<BigInt>) -> Constraint {
        let v = v.into();
        Constraint {
            expr: self.clone(),
            lb: v.clone(),
            ub: v,
        }
    }

    /// `lb <= self <= ub`
    pub fn in_range(&self, lb: impl Into<BigInt>, ub: impl Into<BigInt>) -> Result<Constraint> {
        let (lb, ub) = (lb.into(), ub.into());
        if lb > ub {
            return Err(LineqError::InvalidBound { lb, ub });
        }
        Ok(Constraint {
            expr: self.clone(),
            lb,
            ub,
        })
    }

    fn combined_modulus(&self, other: Option<&BigInt>) -> Result<Option<BigInt>> {
        match (&self.modulus, other) {
            (Some(a), Some(b)) if a != b => Err(LineqError::IncompatibleModulus {
                left: a.clone(),
                right: b.clone(),
            }),
            (Some(a), _) => Ok(Some(a.clone())),
            (None, b) => Ok(b.cloned()),
        }
    }

    /// Reduce coefficients to canonical residues and drop zero terms
    fn normalized(mut self) -> Self {
        if let Some(m) = &self.modulus {
            for (_, c) in self.terms.iter_mut() {
                *c = c.mod_floor(m);
            }
            self.constant = self.constant.mod_floor(m);
        }
        self.terms.retain(|(_, c)| !c.is_zero());
        self
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constant = (!self.constant.is_zero() || self.terms.is_empty())
            .then_some((&self.constant, None));
        let parts = self
            .terms
            .iter()
            .map(|(name, c)| (c, Some(name.as_str())))
            .chain(constant);

        for (i, (c, name)) in parts.enumerate() {
            if i == 0 {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {} ", if c.is_negative() { "-" } else { "+" })?;
            }
            let magnitude = c.abs();
            match name {
                Some(name) if magnitude.is_one() => write!(f, "{}", name)?,
                Some(name) => write!(f, "{}*{}", magnitude, name)?,
                None => write!(f, "{}", magnitude)?,
            }
        }
        Ok(())
    }
}

/// `lb <= expr <= ub`, reduced modulo the expression's modulus if it has one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    expr: LinearExpr,
    lb: BigInt,
    ub: BigInt,
}

impl Constraint {
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn lb(&self) -> &BigInt {
        &self.lb
    }

    pub fn ub(&self) -> &BigInt {
        &self.ub
    }

    pub fn modulus(&self) -> Option<&BigInt> {
        self.expr.modulus()
    }

    pub fn is_equality(&self) -> bool {
        self.lb == self.ub
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_equality() {
            write!(f, "{} == {}", self.expr, self.lb)?;
        } else {
            write!(f, "{} == {}..{}", self.expr, self.lb, self.ub)?;
        }
        if let Some(m) = self.modulus() {
            write!(f, " (mod {})", m)?;
        }
        Ok(())
    }
}
