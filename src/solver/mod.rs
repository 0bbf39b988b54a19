//! Solver interface for l0mip.
//!
//! This module provides:
//! - Model stuffing to convert a `Model` into a flat standard form
//! - The `Backend` trait every solver integration implements
//! - SCIP integration for mixed-integer problems (feature `scip`)
//! - Clarabel integration for continuous relaxations

pub mod clarabel;
#[cfg(feature = "scip")]
pub mod scip;
pub mod solution;
pub mod stuffing;

pub use self::clarabel::Clarabel;
#[cfg(feature = "scip")]
pub use self::scip::Scip;
pub use solution::{Solution, SolveStatus};
pub use stuffing::{stuff_problem, Column, Row, StandardForm};

use crate::error::Result;

/// A solver that can consume a [`StandardForm`].
pub trait Backend {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether integrality of binary columns is enforced.
    fn supports_integers(&self) -> bool;

    /// Solve the problem. Blocks until the solver returns.
    ///
    /// Returns `Ok` for any solver outcome, including infeasibility; only
    /// failures to set up or run the solver are errors.
    fn solve(&self, problem: &StandardForm, settings: &Settings) -> Result<Solution>;
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Print solver output.
    pub verbose: bool,
    /// Time limit in seconds.
    pub time_limit: f64,
    /// Relative MIP gap at which the search stops (solver default if `None`).
    pub mip_gap: Option<f64>,
    /// Maximum interior-point iterations.
    pub max_iter: u32,
    /// Absolute tolerance.
    pub tol_gap_abs: f64,
    /// Relative tolerance.
    pub tol_gap_rel: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            verbose: false,
            time_limit: f64::INFINITY,
            mip_gap: None,
            max_iter: 200,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
        }
    }
}

/// The mixed-integer backend compiled into this build.
#[cfg(feature = "scip")]
pub fn mip_backend() -> Result<Box<dyn Backend>> {
    Ok(Box::new(Scip))
}

/// The mixed-integer backend compiled into this build.
#[cfg(not(feature = "scip"))]
pub fn mip_backend() -> Result<Box<dyn Backend>> {
    Err(crate::L0Error::Unsupported {
        backend: "none",
        reason: "built without a mixed-integer solver (enable feature `scip`)".into(),
    })
}
