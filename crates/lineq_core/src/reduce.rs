//! Pluggable lattice reduction
//!
//! Everything that needs a reduced basis takes a `&dyn Reducer`. Three
//! reducers ship with the crate ([`LllReducer`], [`BkzReducer`],
//! [`FlatterReducer`]); any closure `Fn(&LatticeBasis) -> Result<LatticeBasis>`
//! works as well.
//!
//! A reducer must return a basis of the same lattice whose rows are short and
//! close to orthogonal. Zero rows may be dropped.

use crate::error::{LineqError, Result};
use crate::flatter::{flatter, require_flatter, FlatterOptions};
use crate::lattice::{BkzConfig, LLLConfig, LatticeBasis, BKZ, LLL};
use std::fmt;
use std::str::FromStr;

/// Lattice basis reduction capability
pub trait Reducer {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn reduce(&self, basis: &LatticeBasis) -> Result<LatticeBasis>;
}

impl<F> Reducer for F
where
    F: Fn(&LatticeBasis) -> Result<LatticeBasis>,
{
    fn name(&self) -> &'static str {
        "custom"
    }

    fn reduce(&self, basis: &LatticeBasis) -> Result<LatticeBasis> {
        self(basis)
    }
}

/// Exact LLL
#[derive(Debug, Clone, Default)]
pub struct LllReducer {
    pub config: LLLConfig,
}

impl LllReducer {
    pub fn new(config: LLLConfig) -> Self {
        Self { config }
    }

    /// δ = 0.99
    pub fn strong() -> Self {
        Self::new(LLLConfig::strong())
    }
}

impl Reducer for LllReducer {
    fn name(&self) -> &'static str {
        "lll"
    }

    fn reduce(&self, basis: &LatticeBasis) -> Result<LatticeBasis> {
        if !self.config.is_valid() {
            return Err(LineqError::InvalidReduction(format!(
                "LLL delta {}/{} is outside (1/4, 1]",
                self.config.delta_num, self.config.delta_den
            )));
        }
        Ok(LLL::reduce(basis, &self.config).0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BkzReducer {
    pub config: BkzConfig,
}

impl BkzReducer {
    pub fn new(config: BkzConfig) -> Self {
        Self { config }
    }

    pub fn with_block_size(block_size: usize) -> Self {
        Self::new(BkzConfig::with_block_size(block_size))
    }
}

impl Reducer for BkzReducer {
    fn name(&self) -> &'static str {
        "bkz"
    }

    fn reduce(&self, basis: &LatticeBasis) -> Result<LatticeBasis> {
        if !self.config.lll.is_valid() {
            return Err(LineqError::InvalidReduction(format!(
                "BKZ delta {}/{} is outside (1/4, 1]",
                self.config.lll.delta_num, self.config.lll.delta_den
            )));
        }
        Ok(BKZ::reduce(basis, &self.config).0)
    }
}

/// Runs the external `flatter` binary
#[derive(Debug, Clone, Default)]
pub struct FlatterReducer {
    pub options: FlatterOptions,
}

impl FlatterReducer {
    pub fn with_rhf(rhf: f64) -> Self {
        Self {
            options: FlatterOptions { rhf: Some(rhf), ..Default::default() },
        }
    }
}

impl Reducer for FlatterReducer {
    fn name(&self) -> &'static str {
        "flatter"
    }

    fn reduce(&self, basis: &LatticeBasis) -> Result<LatticeBasis> {
        flatter(basis, &self.options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionAlgorithm {
    #[default]
    Lll,
    Bkz,
    Flatter,
}

impl FromStr for ReductionAlgorithm {
    type Err = LineqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lll" => Ok(Self::Lll),
            "bkz" => Ok(Self::Bkz),
            "flatter" => Ok(Self::Flatter),
            other => Err(LineqError::InvalidReduction(format!(
                "unknown reduction algorithm '{}', expected lll, bkz or flatter",
                other
            ))),
        }
    }
}

impl fmt::Display for ReductionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lll => "lll",
            Self::Bkz => "bkz",
            Self::Flatter => "flatter",
        };
        write!(f, "{}", name)
    }
}

/// Reduction parameters as a plain value
///
/// `delta` is `(numerator, denominator)`; `None` leaves each reducer's own
/// default in place (3/4 for LLL, 99/100 for BKZ, flatter's built-in).
#[derive(Debug, Clone)]
pub struct ReductionConfig {
    pub algorithm: ReductionAlgorithm,
    pub block_size: usize,
    pub delta: Option<(i64, i64)>,
    pub max_tours: usize,
    pub rhf: Option<f64>,
    pub alpha: Option<f64>,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            algorithm: ReductionAlgorithm::Lll,
            block_size: 10,
            delta: None,
            max_tours: BkzConfig::default().max_tours,
            rhf: None,
            alpha: None,
        }
    }
}

impl ReductionConfig {
    pub fn lll() -> Self {
        Self::default()
    }

    pub fn bkz(block_size: usize) -> Self {
        Self {
            algorithm: ReductionAlgorithm::Bkz,
            block_size,
            ..Default::default()
        }
    }

    pub fn flatter(rhf: Option<f64>) -> Self {
        Self {
            algorithm: ReductionAlgorithm::Flatter,
            rhf,
            ..Default::default()
        }
    }

    /// Validate the parameters and instantiate the reducer
    pub fn build(&self) -> Result<Box<dyn Reducer>> {
        if let Some((num, den)) = self.delta {
            let lll = LLLConfig { delta_num: num, delta_den: den, ..Default::default() };
            if !lll.is_valid() {
                return Err(LineqError::InvalidReduction(format!(
                    "delta {}/{} is outside (1/4, 1]",
                    num, den
                )));
            }
        }

        let reducer: Box<dyn Reducer> = match self.algorithm {
            ReductionAlgorithm::Lll => {
                let mut config = LLLConfig::default();
                if let Some((num, den)) = self.delta {
                    config.delta_num = num;
                    config.delta_den = den;
                }
                Box::new(LllReducer::new(config))
            }
            ReductionAlgorithm::Bkz => {
                if self.block_size < 2 {
                    return Err(LineqError::InvalidReduction(format!(
                        "BKZ block size must be at least 2, got {}",
                        self.block_size
                    )));
                }
                let mut config = BkzConfig {
                    block_size: self.block_size,
                    max_tours: self.max_tours,
                    ..Default::default()
                };
                if let Some((num, den)) = self.delta {
                    config.lll.delta_num = num;
                    config.lll.delta_den = den;
                }
                Box::new(BkzReducer::new(config))
            }
            ReductionAlgorithm::Flatter => {
                require_flatter()?;
                Box::new(FlatterReducer {
                    options: FlatterOptions {
                        alpha: self.alpha,
                        rhf: self.rhf,
                        delta: self.delta.map(|(num, den)| num as f64 / den as f64),
                    },
                })
            }
        };

        log::debug!("using {} reducer", reducer.name());
        Ok(reducer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatter::find_flatter;
    use num_bigint::BigInt;

    #[test]
    fn test_closure_is_a_reducer() {
        let identity = |b: &LatticeBasis| -> Result<LatticeBasis> { Ok(b.clone()) };
        let reducer: &dyn Reducer = &identity;
        let basis = LatticeBasis::from_rows(&[vec![5i64, 7]]).unwrap();

        assert_eq!(reducer.name(), "custom");
        assert_eq!(reducer.reduce(&basis).unwrap(), basis);
    }

    #[test]
    fn test_lll_reducer_drops_zero_rows() {
        let basis = LatticeBasis::from_rows(&[vec![0i64, 0], vec![3, 1], vec![6, 2]]).unwrap();
        let reduced = LllReducer::default().reduce(&basis).unwrap();
        assert_eq!(reduced.n, 1);
        assert_eq!(reduced.norm_squared(0), BigInt::from(10));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("lll".parse::<ReductionAlgorithm>().unwrap(), ReductionAlgorithm::Lll);
        assert_eq!("BKZ".parse::<ReductionAlgorithm>().unwrap(), ReductionAlgorithm::Bkz);
        assert_eq!("flatter".parse::<ReductionAlgorithm>().unwrap(), ReductionAlgorithm::Flatter);
        assert!(matches!(
            "hkz".parse::<ReductionAlgorithm>(),
            Err(LineqError::InvalidReduction(_))
        ));
    }

    #[test]
    fn test_build_validates_parameters() {
        assert_eq!(ReductionConfig::lll().build().unwrap().name(), "lll");
        assert_eq!(ReductionConfig::bkz(8).build().unwrap().name(), "bkz");

        assert!(ReductionConfig::bkz(1).build().is_err());
        let bad_delta = ReductionConfig { delta: Some((1, 8)), ..ReductionConfig::lll() };
        assert!(matches!(bad_delta.build(), Err(LineqError::InvalidReduction(_))));
    }

    #[test]
    fn test_flatter_checked_at_build() {
        let built = ReductionConfig::flatter(Some(1.03)).build();
        match find_flatter() {
            Some(_) => assert_eq!(built.unwrap().name(), "flatter"),
            None => assert!(matches!(
                built,
                Err(LineqError::ReducerUnavailable { tool: "flatter", .. })
            )),
        }
    }
}
