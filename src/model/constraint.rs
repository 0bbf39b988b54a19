//! Linear constraints.
//!
//! Constraints are stored in one of two normalized forms:
//! - Zero: expr == 0
//! - NonNeg: expr >= 0

use super::expr::LinExpr;
use super::variable::Var;

/// A linear constraint in an optimization model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Equality constraint: expr == 0.
    Zero(LinExpr),

    /// Inequality constraint: expr >= 0.
    NonNeg(LinExpr),
}

impl Constraint {
    /// Create an equality constraint: lhs == rhs.
    pub fn eq(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Constraint::Zero(lhs.into() - rhs.into())
    }

    /// Create an inequality constraint: lhs <= rhs.
    pub fn leq(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        // lhs <= rhs  <=>  rhs - lhs >= 0
        Constraint::NonNeg(rhs.into() - lhs.into())
    }

    /// Create an inequality constraint: lhs >= rhs.
    pub fn geq(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Constraint::NonNeg(lhs.into() - rhs.into())
    }

    /// The normalized expression.
    pub fn expr(&self) -> &LinExpr {
        match self {
            Constraint::Zero(e) | Constraint::NonNeg(e) => e,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Constraint::Zero(_))
    }

    /// Row bounds `(lhs, rhs)` on the variable part `a.x`.
    ///
    /// For `a.x + c == 0` this is `(-c, -c)`; for `a.x + c >= 0` it is `(-c, inf)`.
    pub fn row_bounds(&self) -> (f64, f64) {
        match self {
            Constraint::Zero(e) => (-e.constant_term(), -e.constant_term()),
            Constraint::NonNeg(e) => (-e.constant_term(), f64::INFINITY),
        }
    }

    /// Largest violation at a point (zero when satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        match self {
            Constraint::Zero(e) => e.evaluate(values).abs(),
            Constraint::NonNeg(e) => (-e.evaluate(values)).max(0.0),
        }
    }

    /// Get all variables in this constraint.
    pub fn variables(&self) -> Vec<Var> {
        self.expr().variables()
    }
}

/// Extension trait for creating constraints from expressions.
pub trait ConstraintExt {
    /// Create equality constraint: self == rhs.
    fn equals(&self, rhs: impl Into<LinExpr>) -> Constraint;

    /// Create inequality constraint: self <= rhs.
    fn leq(&self, rhs: impl Into<LinExpr>) -> Constraint;

    /// Create inequality constraint: self >= rhs.
    fn geq(&self, rhs: impl Into<LinExpr>) -> Constraint;
}

impl ConstraintExt for LinExpr {
    fn equals(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::eq(self.clone(), rhs)
    }

    fn leq(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::leq(self.clone(), rhs)
    }

    fn geq(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::geq(self.clone(), rhs)
    }
}

impl ConstraintExt for Var {
    fn equals(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::eq(*self, rhs)
    }

    fn leq(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::leq(*self, rhs)
    }

    fn geq(&self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint::geq(*self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leq_normalizes_to_nonneg() {
        let x = Var::new(0);
        let c = x.leq(3.0);
        assert!(!c.is_equality());
        // 3 - x >= 0  =>  -x >= -3
        assert_eq!(c.expr().coeff(x), -1.0);
        assert_eq!(c.row_bounds(), (-3.0, f64::INFINITY));
    }

    #[test]
    fn test_big_m_pair_violation() {
        let x = Var::new(0);
        let z = Var::new(1);
        let upper = (x - 10.0 * z).leq(0.0);
        let lower = (x + 10.0 * z).geq(0.0);

        // z = 0 forces x = 0
        assert_eq!(upper.violation(&[2.0, 0.0]), 2.0);
        assert_eq!(lower.violation(&[-2.0, 0.0]), 2.0);
        // z = 1 allows |x| <= 10
        assert_eq!(upper.violation(&[9.0, 1.0]), 0.0);
        assert_eq!(lower.violation(&[-9.0, 1.0]), 0.0);
    }

    #[test]
    fn test_equality_bounds() {
        let x = Var::new(0);
        let c = (x + 2.0).equals(5.0);
        assert!(c.is_equality());
        assert_eq!(c.row_bounds(), (3.0, 3.0));
    }
}
