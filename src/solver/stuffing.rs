//! Model stuffing: lowers a `Model` to the flat form every backend consumes.
//!
//! The standard form is
//!
//! ```text
//! minimize    sum_k w_k * x_{c_k}^2 + q' x + offset
//! subject to  lhs_i <= a_i' x <= rhs_i
//!             lb_j <= x_j <= ub_j,  x_j integer for binary columns
//! ```
//!
//! with `w_k >= 0`. Each squared affine expression `w * (a' x + c)^2` of the
//! objective that is not already a single scaled variable gets an auxiliary
//! free column `r` and an equality row `a' x - r = -c`.

use crate::error::{L0Error, Result};
use crate::model::{Model, ObjSense, VarKind};

/// A column (variable) of the standard form.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: VarKind,
    pub lb: f64,
    pub ub: f64,
}

/// A two-sided linear row `lhs <= a' x <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    /// (column, coefficient) pairs in column order.
    pub coeffs: Vec<(usize, f64)>,
    pub lhs: f64,
    pub rhs: f64,
}

impl Row {
    pub fn is_equality(&self) -> bool {
        self.lhs == self.rhs
    }
}

/// Stuffed problem ready for a backend.
#[derive(Debug, Clone)]
pub struct StandardForm {
    /// User columns first, then auxiliary columns.
    pub columns: Vec<Column>,
    /// Linear cost vector q (one entry per column).
    pub objective: Vec<f64>,
    /// Constant offset in objective.
    pub objective_offset: f64,
    /// Diagonal quadratic terms (column, weight), weights non-negative.
    pub squares: Vec<(usize, f64)>,
    pub rows: Vec<Row>,
    /// Number of columns that belong to model variables.
    pub num_user_vars: usize,
}

impl StandardForm {
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn has_integers(&self) -> bool {
        self.columns.iter().any(|c| c.kind.is_integer())
    }

    /// Objective value at a point over all columns.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        let linear: f64 = self.objective.iter().zip(x).map(|(q, xi)| q * xi).sum();
        let quadratic: f64 = self.squares.iter().map(|&(c, w)| w * x[c] * x[c]).sum();
        linear + quadratic + self.objective_offset
    }
}

/// Build the standard form of a model.
///
/// Maximization is converted to minimization by negating the objective, so
/// the reported objective must be negated back by the caller.
pub fn stuff_problem(model: &Model) -> Result<StandardForm> {
    let objective = model
        .objective()
        .ok_or_else(|| L0Error::InvalidModel("objective has not been set".into()))?;

    let sign = match objective.sense {
        ObjSense::Minimize => 1.0,
        ObjSense::Maximize => -1.0,
    };
    let expr = objective.expr.scale(sign);

    let mut columns: Vec<Column> = model
        .vars()
        .iter()
        .map(|v| Column {
            name: v.name.clone(),
            kind: v.kind,
            lb: v.lb,
            ub: v.ub,
        })
        .collect();
    let num_user_vars = columns.len();

    let mut q = vec![0.0; num_user_vars];
    for (var, coef) in expr.linear().coeffs() {
        q[var.index()] += coef;
    }
    let mut objective_offset = expr.linear().constant_term();

    // Constraint rows
    let mut rows: Vec<Row> = model
        .constraints()
        .iter()
        .map(|c| {
            let (lhs, rhs) = c.constraint.row_bounds();
            Row {
                name: c.name.clone(),
                coeffs: c
                    .constraint
                    .expr()
                    .coeffs()
                    .map(|(v, a)| (v.index(), a))
                    .collect(),
                lhs,
                rhs,
            }
        })
        .collect();

    // Squared terms
    let mut squares = Vec::new();
    for (k, (weight, term)) in expr.squares().iter().enumerate() {
        if *weight == 0.0 {
            continue;
        }
        if *weight < 0.0 || weight.is_nan() {
            let curvature = if objective.sense == ObjSense::Minimize {
                "concave term in a minimization"
            } else {
                "convex term in a maximization"
            };
            return Err(L0Error::NonConvex(format!(
                "squared term {} has weight {} ({})",
                k,
                weight * sign,
                curvature
            )));
        }
        if term.is_constant() {
            let c = term.constant_term();
            objective_offset += weight * c * c;
            continue;
        }
        if let Some((var, a)) = term.as_single_term() {
            squares.push((var.index(), weight * a * a));
            continue;
        }

        let aux = columns.len();
        columns.push(Column {
            name: format!("aux_sq[{}]", k),
            kind: VarKind::Continuous,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
        });
        q.push(0.0);

        let mut coeffs: Vec<(usize, f64)> = term.coeffs().map(|(v, a)| (v.index(), a)).collect();
        coeffs.push((aux, -1.0));
        let c = term.constant_term();
        rows.push(Row {
            name: format!("aux_sq_def[{}]", k),
            coeffs,
            lhs: -c,
            rhs: -c,
        });
        squares.push((aux, *weight));
    }

    Ok(StandardForm {
        columns,
        objective: q,
        objective_offset,
        squares,
        rows,
        num_user_vars,
    })
}
