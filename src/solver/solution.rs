//! Solve status and solution values shared by all backends.

use nalgebra::DVector;

use crate::model::{Var, VarVec};

/// Solution status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found (within the configured gap).
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver proved infeasibility or unboundedness without deciding which.
    InfeasibleOrUnbounded,
    /// Time limit reached.
    TimeLimit,
    /// Relative gap limit reached.
    GapLimit,
    /// Node, iteration, solution-count or memory limit reached.
    OtherLimit,
    /// Solve interrupted by the user or a callback.
    Interrupted,
    /// Numerical difficulties.
    NumericalError,
    /// Unknown status.
    Unknown,
}

/// Solution returned by a backend.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status.
    pub status: SolveStatus,
    /// Objective value of the best point (if any).
    pub value: Option<f64>,
    /// Primal values indexed by variable column (if any).
    pub primal: Option<Vec<f64>>,
    /// Wall-clock solve time in seconds.
    pub solve_time: f64,
    /// Interior-point iterations, when the backend reports them.
    pub iterations: Option<u32>,
}

impl Solution {
    /// A solution carrying only a status.
    pub fn empty(status: SolveStatus, solve_time: f64) -> Self {
        Solution {
            status,
            value: None,
            primal: None,
            solve_time,
            iterations: None,
        }
    }

    /// Whether the solver produced a primal point.
    pub fn has_incumbent(&self) -> bool {
        self.primal.is_some() && self.value.is_some()
    }

    /// Get the value of a variable.
    pub fn get_value(&self, var: Var) -> Option<f64> {
        self.primal.as_ref().and_then(|p| p.get(var.index()).copied())
    }

    /// Get the value of a variable, returning an error on failure.
    pub fn try_value(&self, var: Var) -> crate::Result<f64> {
        let primal = self
            .primal
            .as_ref()
            .ok_or(crate::L0Error::NoSolution(self.status))?;
        primal.get(var.index()).copied().ok_or_else(|| {
            crate::L0Error::InvalidModel(format!("variable {} not in solution", var.index()))
        })
    }

    /// Get the value of a variable.
    ///
    /// # Panics
    ///
    /// Panics if there is no primal point or the variable is not in it. Use
    /// `try_value()` for explicit error handling.
    pub fn value(&self, var: Var) -> f64 {
        self.try_value(var).expect("failed to get variable value")
    }

    /// Values of a variable vector as a dense vector.
    pub fn values(&self, vars: &VarVec) -> crate::Result<DVector<f64>> {
        let values = vars
            .iter()
            .map(|v| self.try_value(v))
            .collect::<crate::Result<Vec<f64>>>()?;
        Ok(DVector::from_vec(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_solution_has_no_values() {
        let sol = Solution::empty(SolveStatus::TimeLimit, 1.0);
        assert!(!sol.has_incumbent());
        assert!(sol.get_value(Var::new(0)).is_none());
        assert!(matches!(
            sol.try_value(Var::new(0)),
            Err(crate::L0Error::NoSolution(SolveStatus::TimeLimit))
        ));
    }

    #[test]
    fn test_values_of_var_vec() {
        let sol = Solution {
            status: SolveStatus::Optimal,
            value: Some(1.0),
            primal: Some(vec![1.0, 2.0, 3.0]),
            solve_time: 0.0,
            iterations: None,
        };
        let v = VarVec::new(vec![Var::new(2), Var::new(0)]);
        assert_eq!(sol.values(&v).unwrap(), DVector::from_vec(vec![3.0, 1.0]));
    }
}
