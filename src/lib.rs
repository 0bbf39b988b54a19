//! # l0mip
//!
//! Sparse linear regression with an L0 penalty, solved exactly as a
//! mixed-integer quadratic program.
//!
//! Each feature `j` gets a continuous coefficient `x_j` and a binary
//! indicator `z_j`. Big-M rows force `x_j = 0` whenever `z_j = 0`, and the
//! objective charges `lambda` for every active indicator:
//!
//! ```text
//! minimize    (1/m) ||y - A x||_2^2 + lambda * sum_j z_j
//! subject to  -M z_j <= x_j <= M z_j
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use l0mip::prelude::*;
//!
//! let data = make_regression(&RegressionSpec::default())?;
//! let m = big_m(&data.a, &data.y, DEFAULT_FACTOR)?;
//! let l0 = L0Formulation::build(&data.a, &data.y, 50.0, m)?;
//! let fit = l0.solve(&data.a, &data.y, &Scip)?;
//!
//! println!("{}", Report::from(&fit));
//! ```
//!
//! ## Architecture
//!
//! - **Modeling layer** (`model`): variables, linear and quadratic
//!   expressions, linear constraints, independent of any solver
//! - **Stuffing** (`solver::stuffing`): lowers a model to columns, rows and
//!   diagonal squares
//! - **Backends**: SCIP for the mixed-integer problem, Clarabel for
//!   continuous relaxations
//! - **Pipeline** (`pipeline`): data generation, big-M selection, solve,
//!   post-solve checks and the printed report

pub mod bigm;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod solver;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use l0mip::prelude::*;
/// ```
pub mod prelude {
    // Modeling
    pub use crate::model::{
        AffineVec, Constraint, ConstraintExt, LinExpr, Model, ObjSense, QuadExpr, Var, VarKind,
        VarVec, VariableBuilder,
    };

    // Data and big-M
    pub use crate::bigm::{big_m, check_big_m, least_squares, DEFAULT_FACTOR};
    pub use crate::data::{make_regression, Dataset, RegressionSpec};

    // Regression
    pub use crate::regression::{L0Fit, L0Formulation};
    pub use crate::report::Report;

    // Solver
    #[cfg(feature = "scip")]
    pub use crate::solver::Scip;
    pub use crate::solver::{Backend, Clarabel, Settings, Solution, SolveStatus};

    // Errors
    pub use crate::error::{L0Error, Result};
}

// Re-export main types at crate root
pub use error::{L0Error, Result};
pub use model::Model;
pub use solver::{Solution, SolveStatus};
