//! Clarabel solver integration.
//!
//! Clarabel is an interior-point solver for convex QPs and conic programs. It
//! has no notion of integrality, so this backend only accepts continuous
//! problems; it is used to solve continuous relaxations of the MIP.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use log::debug;

use super::solution::{Solution, SolveStatus};
use super::stuffing::StandardForm;
use super::{Backend, Settings};
use crate::error::{L0Error, Result};
use crate::sparse::{csc_from_triplets, Triplets};

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => SolveStatus::Optimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                SolveStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                SolveStatus::Unbounded
            }
            SolverStatus::MaxIterations => SolveStatus::OtherLimit,
            SolverStatus::MaxTime => SolveStatus::TimeLimit,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
                SolveStatus::NumericalError
            }
            _ => SolveStatus::Unknown,
        }
    }
}

/// The Clarabel backend (continuous problems only).
#[derive(Debug, Clone, Copy, Default)]
pub struct Clarabel;

impl Backend for Clarabel {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn supports_integers(&self) -> bool {
        false
    }

    fn solve(&self, problem: &StandardForm, settings: &Settings) -> Result<Solution> {
        if problem.has_integers() {
            return Err(L0Error::Unsupported {
                backend: self.name(),
                reason: "integer columns".into(),
            });
        }

        let n = problem.num_cols();
        let p = to_clarabel_csc(&quadratic_matrix(problem));
        let conic = conic_rows(problem);
        let a = to_clarabel_csc(&csc_from_triplets(conic.rows(), n, conic.a));
        let cones = to_clarabel_cones(conic.zero, conic.nonneg);

        // Build Clarabel settings
        let clarabel_settings = DefaultSettingsBuilder::default()
            .verbose(settings.verbose)
            .max_iter(settings.max_iter)
            .time_limit(settings.time_limit)
            .tol_gap_abs(settings.tol_gap_abs)
            .tol_gap_rel(settings.tol_gap_rel)
            .build()
            .map_err(|e| L0Error::SolverError(format!("invalid Clarabel settings: {}", e)))?;

        // Create and run solver
        let mut solver = DefaultSolver::new(
            &p,
            &problem.objective,
            &a,
            &conic.b,
            &cones,
            clarabel_settings,
        );
        solver.solve();

        // Extract solution
        let status: SolveStatus = solver.solution.status.into();
        let solve_time = solver.solution.solve_time;
        let iterations = solver.info.iterations;
        debug!(
            "clarabel: status {:?} after {} iterations in {:.3}s",
            solver.solution.status, iterations, solve_time
        );

        if status == SolveStatus::Optimal {
            let x = solver.solution.x.clone();
            Ok(Solution {
                status,
                value: Some(problem.objective_value(&x)),
                primal: Some(x),
                solve_time,
                iterations: Some(iterations),
            })
        } else {
            Ok(Solution {
                iterations: Some(iterations),
                ..Solution::empty(status, solve_time)
            })
        }
    }
}

/// Rows of `A x + s = b` split by cone.
struct ConicRows {
    a: Triplets,
    b: Vec<f64>,
    zero: usize,
    nonneg: usize,
}

impl ConicRows {
    fn rows(&self) -> usize {
        self.zero + self.nonneg
    }

    fn push(&mut self, coeffs: impl IntoIterator<Item = (usize, f64)>, sign: f64, rhs: f64) {
        let row = self.b.len();
        for (col, val) in coeffs {
            self.a.push(row, col, sign * val);
        }
        self.b.push(rhs);
    }
}

/// Quadratic cost matrix P for Clarabel's (1/2) x' P x, upper triangle.
fn quadratic_matrix(problem: &StandardForm) -> nalgebra_sparse::CscMatrix<f64> {
    let n = problem.num_cols();
    let mut p = Triplets::new();
    for &(col, weight) in &problem.squares {
        // w x^2 = (1/2) (2w) x^2
        p.push(col, col, 2.0 * weight);
    }
    csc_from_triplets(n, n, p)
}

/// Convert rows and bounds to zero-cone rows followed by nonnegative-cone rows.
///
/// Zero cone: a' x = b. Nonnegative cone: a' x + s = b with s >= 0, i.e. a' x <= b;
/// lower bounds are negated into that form.
fn conic_rows(problem: &StandardForm) -> ConicRows {
    let mut out = ConicRows {
        a: Triplets::new(),
        b: Vec::new(),
        zero: 0,
        nonneg: 0,
    };

    for row in problem.rows.iter().filter(|r| r.is_equality()) {
        out.push(row.coeffs.iter().copied(), 1.0, row.rhs);
        out.zero += 1;
    }

    for row in problem.rows.iter().filter(|r| !r.is_equality()) {
        if row.rhs.is_finite() {
            out.push(row.coeffs.iter().copied(), 1.0, row.rhs);
            out.nonneg += 1;
        }
        if row.lhs.is_finite() {
            out.push(row.coeffs.iter().copied(), -1.0, -row.lhs);
            out.nonneg += 1;
        }
    }

    for (j, col) in problem.columns.iter().enumerate() {
        if col.ub.is_finite() {
            out.push([(j, 1.0)], 1.0, col.ub);
            out.nonneg += 1;
        }
        if col.lb.is_finite() {
            out.push([(j, 1.0)], -1.0, -col.lb);
            out.nonneg += 1;
        }
    }

    out
}

/// Convert nalgebra CSC to Clarabel CSC.
fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

/// Convert cone dimensions to Clarabel cones.
fn to_clarabel_cones(zero: usize, nonneg: usize) -> Vec<SupportedConeT<f64>> {
    let mut cones = Vec::new();

    if zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(zero));
    }

    if nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(nonneg));
    }

    cones
}
