//! Error types for l0mip.

use thiserror::Error;

use crate::solver::SolveStatus;

/// Error type for l0mip operations.
#[derive(Debug, Error)]
pub enum L0Error {
    /// Dataset parameters cannot produce a dataset.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Invalid model specification.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Quadratic objective does not match the optimization sense.
    #[error("Objective is not convex: {0}")]
    NonConvex(String),

    /// The backend cannot handle the problem class.
    #[error("Unsupported by backend {backend}: {reason}")]
    Unsupported {
        backend: &'static str,
        reason: String,
    },

    /// Solver error.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// The solver stopped without a usable solution.
    #[error("No solution available (status: {0:?})")]
    NoSolution(SolveStatus),

    /// Numerical error.
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// A least-squares coefficient reaches the big-M bound.
    #[error("big-M {big_m} does not exceed |coefficient| {coefficient} of feature {feature}")]
    BigMTooSmall {
        feature: usize,
        coefficient: f64,
        big_m: f64,
    },

    /// A returned solution breaks a formulation invariant.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for l0mip operations.
pub type Result<T> = std::result::Result<T, L0Error>;
