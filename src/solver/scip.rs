//! SCIP solver integration.
//!
//! SCIP solves mixed-integer programs with nonlinear constraints by spatial
//! branch-and-bound. Its objective is linear, so the quadratic part of the
//! standard form is moved into one constraint through an epigraph column:
//!
//! ```text
//! minimize    t + q' x + offset
//! subject to  sum_k w_k * x_{c_k}^2 - t <= 0
//! ```

use std::time::Instant;

use log::debug;
use russcip::prelude::*;
use russcip::Status;

use super::solution::{Solution, SolveStatus};
use super::stuffing::StandardForm;
use super::{Backend, Settings};
use crate::error::{L0Error, Result};
use crate::model::VarKind;

impl From<Status> for SolveStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Optimal => SolveStatus::Optimal,
            Status::Infeasible => SolveStatus::Infeasible,
            Status::Unbounded => SolveStatus::Unbounded,
            Status::Inforunbd => SolveStatus::InfeasibleOrUnbounded,
            Status::TimeLimit => SolveStatus::TimeLimit,
            Status::GapLimit => SolveStatus::GapLimit,
            Status::NodeLimit
            | Status::TotalNodeLimit
            | Status::StallNodeLimit
            | Status::MemoryLimit
            | Status::SolutionLimit
            | Status::BestSolutionLimit
            | Status::RestartLimit => SolveStatus::OtherLimit,
            Status::UserInterrupt => SolveStatus::Interrupted,
            _ => SolveStatus::Unknown,
        }
    }
}

/// The SCIP backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scip;

impl Backend for Scip {
    fn name(&self) -> &'static str {
        "scip"
    }

    fn supports_integers(&self) -> bool {
        true
    }

    fn solve(&self, problem: &StandardForm, settings: &Settings) -> Result<Solution> {
        let mut model = Model::new();
        if !settings.verbose {
            model = model.hide_output();
        }
        let mut model = model
            .include_default_plugins()
            .create_prob("l0mip")
            .set_obj_sense(ObjSense::Minimize);

        if settings.time_limit.is_finite() {
            model = model
                .set_real_param("limits/time", settings.time_limit)
                .map_err(|e| L0Error::SolverError(format!("limits/time: {:?}", e)))?;
        }
        if let Some(gap) = settings.mip_gap {
            model = model
                .set_real_param("limits/gap", gap)
                .map_err(|e| L0Error::SolverError(format!("limits/gap: {:?}", e)))?;
        }

        // Columns carry their linear objective coefficient
        let vars: Vec<_> = problem
            .columns
            .iter()
            .zip(&problem.objective)
            .map(|(col, &obj)| {
                let var_type = match col.kind {
                    VarKind::Continuous => VarType::Continuous,
                    VarKind::Binary => VarType::Binary,
                };
                model.add_var(col.lb, col.ub, obj, &col.name, var_type)
            })
            .collect();

        for row in &problem.rows {
            let row_vars: Vec<_> = row.coeffs.iter().map(|&(c, _)| vars[c].clone()).collect();
            let coefs: Vec<f64> = row.coeffs.iter().map(|&(_, a)| a).collect();
            model.add_cons(row_vars, &coefs, row.lhs, row.rhs, &row.name);
        }

        if !problem.squares.is_empty() {
            let t = model.add_var(0.0, f64::INFINITY, 1.0, "obj_epigraph", VarType::Continuous);
            let quad_vars: Vec<_> = problem
                .squares
                .iter()
                .map(|&(c, _)| vars[c].clone())
                .collect();
            let mut quad_coefs: Vec<f64> = problem.squares.iter().map(|&(_, w)| w).collect();
            let mut lin_coefs = vec![-1.0];
            model.add_cons_quadratic(
                vec![t.clone()],
                &mut lin_coefs,
                quad_vars.clone(),
                quad_vars,
                &mut quad_coefs,
                f64::NEG_INFINITY,
                0.0,
                "obj_epigraph",
            );
        }

        debug!(
            "scip: {} columns, {} rows, {} squared terms",
            problem.num_cols(),
            problem.rows.len(),
            problem.squares.len()
        );

        let start = Instant::now();
        let solved = model.solve();
        let solve_time = start.elapsed().as_secs_f64();

        let status: SolveStatus = solved.status().into();
        debug!("scip: status {:?} in {:.3}s", status, solve_time);

        match solved.best_sol() {
            Some(sol) => {
                let x: Vec<f64> = vars.iter().map(|v| sol.val(v.clone())).collect();
                Ok(Solution {
                    status,
                    value: Some(solved.obj_val() + problem.objective_offset),
                    primal: Some(x),
                    solve_time,
                    iterations: None,
                })
            }
            None => Ok(Solution::empty(status, solve_time)),
        }
    }
}
