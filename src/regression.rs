//! L0-penalized least squares as a big-M mixed-integer program.
//!
//! ```text
//! minimize    (1/m) ||y - A x||_2^2 + lambda * sum_j z_j
//! subject to  x_j - M z_j <= 0
//!             x_j + M z_j >= 0
//!             x free, z binary
//! ```
//!
//! With `z_j = 0` the two rows pin `x_j` to zero; with `z_j = 1` they only
//! bound `|x_j| <= M`.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

use crate::bigm;
use crate::error::{L0Error, Result};
use crate::model::{AffineVec, ConstraintExt, Model, ObjSense, VarVec, VariableBuilder};
use crate::solver::{Backend, Clarabel, Settings, SolveStatus};

/// Indicator values above this count as "feature active".
pub const ACTIVE_THRESHOLD: f64 = 0.5;

/// The big-M model together with its variable handles.
#[derive(Debug, Clone)]
pub struct L0Formulation {
    pub model: Model,
    /// Regression coefficients, one per feature.
    pub x: VarVec,
    /// Activity indicators, one per feature.
    pub z: VarVec,
    pub lambda: f64,
    pub big_m: f64,
}

impl L0Formulation {
    /// Build the model for data `(A, y)`.
    pub fn build(a: &DMatrix<f64>, y: &DVector<f64>, lambda: f64, big_m: f64) -> Result<Self> {
        let (m, n) = a.shape();
        if m == 0 || n == 0 {
            return Err(L0Error::InvalidModel("empty design matrix".into()));
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(L0Error::InvalidModel(format!(
                "penalty weight must be finite and non-negative, got {}",
                lambda
            )));
        }
        if !big_m.is_finite() || big_m <= 0.0 {
            return Err(L0Error::InvalidModel(format!(
                "big-M must be finite and positive, got {}",
                big_m
            )));
        }

        let mut model = Model::new("l0_regression");

        // Declare variables
        let x = model.add_vars(n, VariableBuilder::continuous().name("x"));
        let z = model.add_vars(n, VariableBuilder::binary().name("z"));
        let r = AffineVec::residual(y, a, &x)?;

        // Declare objective and constraints
        let objective = (1.0 / m as f64) * r.sum_squares() + lambda * z.sum();
        model.set_objective(objective, ObjSense::Minimize);
        model.add_constrs(
            "bigm_upper",
            x.iter()
                .zip(z.iter())
                .map(|(xj, zj)| (xj - big_m * zj).leq(0.0)),
        );
        model.add_constrs(
            "bigm_lower",
            x.iter()
                .zip(z.iter())
                .map(|(xj, zj)| (xj + big_m * zj).geq(0.0)),
        );

        debug!(
            "built L0 model: {} samples, {} features, lambda {}, big-M {:.4e}",
            m, n, lambda, big_m
        );

        Ok(L0Formulation {
            model,
            x,
            z,
            lambda,
            big_m,
        })
    }

    pub fn features(&self) -> usize {
        self.x.len()
    }

    /// Solve with a mixed-integer backend and collect the fit.
    pub fn solve(
        &self,
        a: &DMatrix<f64>,
        y: &DVector<f64>,
        backend: &dyn Backend,
    ) -> Result<L0Fit> {
        let solution = self.model.optimize(backend)?;
        let coefficients = solution.values(&self.x)?;
        let indicators = solution.values(&self.z)?;
        let objective = solution.value.ok_or(L0Error::NoSolution(solution.status))?;
        let loss = mean_squared_residual(a, y, &coefficients)?;
        let nonzeros = indicators.iter().filter(|&&v| v > ACTIVE_THRESHOLD).count();

        Ok(L0Fit {
            status: solution.status,
            objective,
            loss,
            nonzeros,
            coefficients,
            indicators,
            solve_time: solution.solve_time,
            lambda: self.lambda,
            big_m: self.big_m,
        })
    }

    /// Lower bound on the MIP optimum from the continuous relaxation.
    pub fn relaxation_bound(&self, settings: &Settings) -> Result<f64> {
        let relaxed = self.model.relaxed();
        let solution = relaxed.optimize_with(&Clarabel, settings)?;
        let bound = solution.value.ok_or(L0Error::NoSolution(solution.status))?;
        info!(
            "relaxation bound {:.6} ({} iterations, {:.3}s)",
            bound,
            solution.iterations.unwrap_or(0),
            solution.solve_time
        );
        Ok(bound)
    }
}

/// `(1/m) ||y - A x||_2^2`.
pub fn mean_squared_residual(
    a: &DMatrix<f64>,
    y: &DVector<f64>,
    x: &DVector<f64>,
) -> Result<f64> {
    if a.nrows() != y.len() || a.ncols() != x.len() {
        return Err(L0Error::ShapeMismatch {
            expected: format!("{}x{} system", a.nrows(), a.ncols()),
            got: format!("y of length {}, x of length {}", y.len(), x.len()),
        });
    }
    let residual = y - a * x;
    Ok(residual.norm_squared() / a.nrows() as f64)
}

/// Result of solving an [`L0Formulation`].
#[derive(Debug, Clone)]
pub struct L0Fit {
    pub status: SolveStatus,
    /// Objective value reported by the solver.
    pub objective: f64,
    /// Loss recomputed from `coefficients`.
    pub loss: f64,
    /// Number of indicators above [`ACTIVE_THRESHOLD`].
    pub nonzeros: usize,
    pub coefficients: DVector<f64>,
    pub indicators: DVector<f64>,
    /// Wall-clock solve time in seconds.
    pub solve_time: f64,
    pub lambda: f64,
    pub big_m: f64,
}

impl L0Fit {
    /// Indices of active features.
    pub fn support(&self) -> Vec<usize> {
        self.indicators
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > ACTIVE_THRESHOLD)
            .map(|(j, _)| j)
            .collect()
    }

    /// Every inactive indicator must come with a zero coefficient.
    pub fn check_indicator_consistency(&self, tol: f64) -> Result<()> {
        for (j, (x, z)) in self
            .coefficients
            .iter()
            .zip(self.indicators.iter())
            .enumerate()
        {
            if *z <= ACTIVE_THRESHOLD && x.abs() > tol {
                return Err(L0Error::InvariantViolation(format!(
                    "feature {} has indicator {} but coefficient {}",
                    j, z, x
                )));
            }
        }
        Ok(())
    }

    /// Objective recomputed from the fit: loss + lambda * nonzeros.
    pub fn recomputed_objective(&self) -> f64 {
        self.loss + self.lambda * self.nonzeros as f64
    }

    /// `|objective - (loss + lambda * nonzeros)|`.
    pub fn objective_residual(&self) -> f64 {
        (self.objective - self.recomputed_objective()).abs()
    }

    /// The reported objective must match its decomposition within `rel_tol`.
    pub fn check_objective_decomposition(&self, rel_tol: f64) -> Result<()> {
        let scale = self.objective.abs().max(1.0);
        if self.objective_residual() > rel_tol * scale {
            return Err(L0Error::InvariantViolation(format!(
                "objective {} differs from loss {} + {} * {} nonzeros",
                self.objective, self.loss, self.lambda, self.nonzeros
            )));
        }
        Ok(())
    }

    /// Features whose coefficient sits at the big-M bound.
    pub fn boundary_features(&self, rel_tol: f64) -> Vec<usize> {
        bigm::boundary_features(&self.coefficients, self.big_m, rel_tol)
    }

    /// Slack the big-M rows leave on `x_j` when `z_j` is within `tol` of zero.
    pub fn indicator_tolerance(&self, tol: f64) -> f64 {
        tol * self.big_m.max(1.0)
    }

    /// Run all post-solve checks, logging soft failures.
    ///
    /// `tol` is the solver's integrality tolerance; the coefficient check is
    /// scaled by big-M through [`L0Fit::indicator_tolerance`].
    pub fn verify(&self, tol: f64) -> Result<()> {
        self.check_indicator_consistency(self.indicator_tolerance(tol))?;
        self.check_objective_decomposition(tol.max(1e-6) * 100.0)?;
        let clipped = self.boundary_features(1e-6);
        if !clipped.is_empty() {
            warn!(
                "coefficients of features {:?} sit at big-M {:.4e}; the bound may be too tight",
                clipped, self.big_m
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toy() -> (DMatrix<f64>, DVector<f64>) {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let y = DVector::from_vec(vec![2.0, 0.0, 2.0]);
        (a, y)
    }

    fn fit(coefficients: Vec<f64>, indicators: Vec<f64>, objective: f64) -> L0Fit {
        let (a, y) = toy();
        let coefficients = DVector::from_vec(coefficients);
        let loss = mean_squared_residual(&a, &y, &coefficients).unwrap();
        let indicators = DVector::from_vec(indicators);
        let nonzeros = indicators.iter().filter(|&&v| v > ACTIVE_THRESHOLD).count();
        L0Fit {
            status: SolveStatus::Optimal,
            objective,
            loss,
            nonzeros,
            coefficients,
            indicators,
            solve_time: 0.0,
            lambda: 1.0,
            big_m: 10.0,
        }
    }

    #[test]
    fn test_model_structure() {
        let (a, y) = toy();
        let f = L0Formulation::build(&a, &y, 1.0, 10.0).unwrap();
        assert_eq!(f.features(), 2);
        assert_eq!(f.model.num_vars(), 4);
        assert_eq!(f.model.num_constrs(), 4);
        assert!(f.model.has_integers());
        assert_eq!(f.model.constraints()[0].name, "bigm_upper[0]");
        assert_eq!(f.model.constraints()[3].name, "bigm_lower[1]");
    }

    #[test]
    fn test_objective_matches_formula() {
        let (a, y) = toy();
        let f = L0Formulation::build(&a, &y, 1.0, 10.0).unwrap();
        // x = (2, 0), z = (1, 0): residual 0 -> objective lambda * 1
        let point = [2.0, 0.0, 1.0, 0.0];
        assert_relative_eq!(f.model.evaluate_objective(&point).unwrap(), 1.0);
        assert_eq!(f.model.max_violation(&point).unwrap(), 0.0);
        // x_1 active with z_1 off violates the big-M rows
        assert!(f.model.max_violation(&[2.0, 0.5, 1.0, 0.0]).unwrap() > 0.0);
    }

    #[test]
    fn test_build_rejects_bad_parameters() {
        let (a, y) = toy();
        assert!(L0Formulation::build(&a, &y, -1.0, 10.0).is_err());
        assert!(L0Formulation::build(&a, &y, 1.0, 0.0).is_err());
        assert!(L0Formulation::build(&a, &y, 1.0, f64::INFINITY).is_err());
        let short = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            L0Formulation::build(&a, &short, 1.0, 10.0),
            Err(L0Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_indicator_consistency() {
        assert!(fit(vec![2.0, 0.0], vec![1.0, 0.0], 1.0)
            .check_indicator_consistency(1e-6)
            .is_ok());
        assert!(matches!(
            fit(vec![2.0, 1e-3], vec![1.0, 0.0], 1.0).check_indicator_consistency(1e-6),
            Err(L0Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_verify_allows_big_m_slack_on_near_zero_indicator() {
        // z_1 is integral within solver tolerance; the rows allow |x_1| <= M z_1
        let big_m = 10.0;
        let near_zero = fit(vec![2.0, big_m * 1e-7], vec![1.0, 1e-7], 1.0);
        assert_relative_eq!(near_zero.indicator_tolerance(1e-6), 1e-5);
        assert!(near_zero.verify(1e-6).is_ok());

        let with_large_m = L0Fit {
            big_m: 8306.0,
            coefficients: DVector::from_vec(vec![2.0, 8306.0 * 1e-7]),
            ..near_zero.clone()
        };
        assert!(with_large_m.check_indicator_consistency(1e-6).is_err());
        assert!(with_large_m.verify(1e-6).is_ok());

        // A coefficient far beyond the slack is still rejected
        let broken = L0Fit {
            coefficients: DVector::from_vec(vec![2.0, 0.5]),
            ..near_zero
        };
        assert!(matches!(
            broken.verify(1e-6),
            Err(L0Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_verify_flags_coefficient_at_bound() {
        // x_0 sits exactly at big-M: reported, but not an error
        let (a, y) = toy();
        let coefficients = DVector::from_vec(vec![10.0, 0.0]);
        let loss = mean_squared_residual(&a, &y, &coefficients).unwrap();
        let at_bound = L0Fit {
            objective: loss + 1.0,
            loss,
            coefficients,
            ..fit(vec![2.0, 0.0], vec![1.0, 0.0], 1.0)
        };
        assert_eq!(at_bound.boundary_features(1e-6), vec![0]);
        assert!(at_bound.verify(1e-6).is_ok());

        let inside = fit(vec![2.0, 0.0], vec![1.0, 0.0], 1.0);
        assert!(inside.boundary_features(1e-6).is_empty());
    }

    #[test]
    fn test_objective_decomposition() {
        let good = fit(vec![2.0, 0.0], vec![1.0, 0.0], 1.0);
        assert_relative_eq!(good.loss, 0.0);
        assert!(good.check_objective_decomposition(1e-6).is_ok());

        let bad = fit(vec![2.0, 0.0], vec![1.0, 0.0], 3.0);
        assert_relative_eq!(bad.objective_residual(), 2.0);
        assert!(bad.check_objective_decomposition(1e-6).is_err());
    }

    #[test]
    fn test_relaxation_bound_below_feasible_point() {
        let (a, y) = toy();
        let f = L0Formulation::build(&a, &y, 1.0, 10.0).unwrap();
        let bound = f.relaxation_bound(&Settings::default()).unwrap();
        // (x, z) = (2, 0, 1, 0) is feasible with objective 1
        assert!(bound <= 1.0 + 1e-6, "bound {}", bound);
        assert!(bound >= -1e-6);
    }
}
