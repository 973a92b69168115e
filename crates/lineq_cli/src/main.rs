//! lineq CLI
//!
//! Recovers bounded unknowns from linear relations with lattice reduction.
//!
//! # Usage
//! ```bash
//! # Solve a problem file
//! lineq solve --input problem.json --algorithm babai --check
//!
//! # Reduce a basis with BKZ-20
//! lineq reduce --input matrix.json --reducer bkz --block-size 20
//!
//! # Kernel of a matrix modulo 10007
//! lineq ortho --input matrix.json --modulus 10007
//!
//! # Recover two 40-bit unknowns from one 128-bit modular relation
//! lineq demo --trials 10
//! ```

mod demo;
mod problem;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lineq_core::{CvpAlgorithm, ReductionAlgorithm, ReductionConfig, SolveConfig};
use log::LevelFilter;
use num_bigint::BigInt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lineq")]
#[command(about = "Bounded linear system recovery via weighted CVP")]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the solution as JSON
    Solve {
        /// Problem file (basis + bounds, or constraints)
        #[arg(long)]
        input: PathBuf,

        /// CVP engine: kannan or babai
        #[arg(long, default_value = "kannan")]
        algorithm: CvpAlgorithm,

        /// Only report a solution that lies inside every bound
        #[arg(long)]
        check: bool,

        /// Kannan embedding factor (default: rounded target norm)
        #[arg(long)]
        q: Option<BigInt>,

        #[command(flatten)]
        reduction: ReductionArgs,
    },

    /// Reduce a lattice basis
    Reduce {
        /// Matrix file, one row per basis vector
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        reduction: ReductionArgs,
    },

    /// Lattice of integer vectors orthogonal to the columns of a matrix
    Ortho {
        /// Matrix file
        #[arg(long)]
        input: PathBuf,

        /// Work modulo this value
        #[arg(long)]
        modulus: Option<BigInt>,

        #[command(flatten)]
        reduction: ReductionArgs,
    },

    /// Recover random unknowns from a random modular relation
    Demo {
        /// Bit size of the random modulus
        #[arg(long, default_value = "128")]
        modulus_bits: u64,

        /// Bit size of each unknown
        #[arg(long, default_value = "40")]
        unknown_bits: u64,

        /// Number of trials
        #[arg(long, default_value = "10")]
        trials: usize,

        /// CVP engine: kannan or babai
        #[arg(long, default_value = "kannan")]
        algorithm: CvpAlgorithm,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the coefficients fixed and reuse one reduction for every trial
        #[arg(long)]
        cached: bool,

        #[command(flatten)]
        reduction: ReductionArgs,
    },
}

/// Reduction backend options shared by every subcommand
#[derive(Args, Debug, Clone)]
struct ReductionArgs {
    /// Reduction algorithm: lll, bkz or flatter
    #[arg(long, default_value = "lll")]
    reducer: ReductionAlgorithm,

    /// BKZ block size
    #[arg(long, default_value = "10")]
    block_size: usize,

    /// Maximum number of BKZ tours
    #[arg(long, default_value = "8")]
    max_tours: usize,

    /// LLL parameter as a fraction, e.g. 99/100
    #[arg(long, value_parser = parse_delta)]
    delta: Option<(i64, i64)>,

    /// flatter target root Hermite factor
    #[arg(long)]
    rhf: Option<f64>,

    /// flatter alpha
    #[arg(long)]
    alpha: Option<f64>,
}

impl ReductionArgs {
    fn config(&self) -> ReductionConfig {
        ReductionConfig {
            algorithm: self.reducer,
            block_size: self.block_size,
            delta: self.delta,
            max_tours: self.max_tours,
            rhf: self.rhf,
            alpha: self.alpha,
        }
    }
}

fn parse_delta(s: &str) -> std::result::Result<(i64, i64), String> {
    let (num, den) = s
        .split_once('/')
        .ok_or_else(|| format!("expected a fraction like 99/100, got '{}'", s))?;
    let num = num.trim().parse::<i64>().map_err(|e| e.to_string())?;
    let den = den.trim().parse::<i64>().map_err(|e| e.to_string())?;
    Ok((num, den))
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level.into())
        .init();

    match cli.command {
        Commands::Solve {
            input,
            algorithm,
            check,
            q,
            reduction,
        } => {
            let reducer = reduction.config().build()?;
            let problem = problem::load_problem(&input)?;
            let config = SolveConfig {
                algorithm,
                check,
                embedding_factor: q,
            };
            let report = problem::solve(&problem, &config, &*reducer)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Reduce { input, reduction } => {
            let reducer = reduction.config().build()?;
            let basis = problem::load_matrix(&input)?;
            let report = problem::reduce(&basis, &*reducer)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Ortho {
            input,
            modulus,
            reduction,
        } => {
            let reducer = reduction.config().build()?;
            let matrix = problem::load_matrix(&input)?;
            let report = problem::ortho(&matrix, modulus.as_ref(), &*reducer)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Demo {
            modulus_bits,
            unknown_bits,
            trials,
            algorithm,
            seed,
            cached,
            reduction,
        } => {
            let options = demo::DemoOptions {
                modulus_bits,
                unknown_bits,
                trials,
                seed,
                cached,
                solve: SolveConfig {
                    algorithm,
                    check: true,
                    embedding_factor: None,
                },
                reduction: reduction.config(),
            };
            demo::run_demo(&options)?;
        }
    }

    Ok(())
}
