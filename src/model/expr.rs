//! Linear and quadratic expressions over model variables.
//!
//! - Linear: sum_j(a_j * x_j) + c
//! - Affine vector: one linear expression per row, e.g. `y - A x`
//! - Quadratic: sum_k(w_k * e_k^2) + linear, where each e_k is linear
//!
//! Coefficients are kept in a `BTreeMap` so that lowering visits variables
//! in column order and repeated runs feed the solver identical input.

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{DMatrix, DVector};

use super::variable::{Var, VarVec};
use crate::error::{L0Error, Result};

/// A linear expression: sum_j(a_j * x_j) + c
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    coeffs: BTreeMap<Var, f64>,
    constant: f64,
}

impl LinExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        LinExpr {
            coeffs: BTreeMap::new(),
            constant: value,
        }
    }

    /// A single term `coef * var`.
    pub fn term(var: Var, coef: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coef);
        e
    }

    /// Add `coef * var` in place.
    pub fn add_term(&mut self, var: Var, coef: f64) {
        let entry = self.coeffs.entry(var).or_insert(0.0);
        *entry += coef;
        if *entry == 0.0 {
            self.coeffs.remove(&var);
        }
    }

    /// Add a constant in place.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Iterate over (variable, coefficient) pairs in column order.
    pub fn coeffs(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.coeffs.iter().map(|(v, c)| (*v, *c))
    }

    /// Coefficient of `var` (zero if absent).
    pub fn coeff(&self, var: Var) -> f64 {
        self.coeffs.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Check if this is a constant (no variables).
    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Number of variables with a non-zero coefficient.
    pub fn num_terms(&self) -> usize {
        self.coeffs.len()
    }

    /// If the expression is exactly `coef * var`, return the pair.
    pub fn as_single_term(&self) -> Option<(Var, f64)> {
        if self.constant != 0.0 || self.coeffs.len() != 1 {
            return None;
        }
        self.coeffs.iter().next().map(|(v, c)| (*v, *c))
    }

    /// Scale by a scalar.
    pub fn scale(&self, scalar: f64) -> LinExpr {
        if scalar == 0.0 {
            return LinExpr::zero();
        }
        LinExpr {
            coeffs: self.coeffs.iter().map(|(v, c)| (*v, c * scalar)).collect(),
            constant: self.constant * scalar,
        }
    }

    /// Get all variables in this expression, sorted.
    pub fn variables(&self) -> Vec<Var> {
        self.coeffs.keys().copied().collect()
    }

    /// Evaluate at a point indexed by variable column.
    ///
    /// # Panics
    ///
    /// Panics if a variable index is outside `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coeffs
            .iter()
            .map(|(v, c)| c * values[v.index()])
            .sum::<f64>()
            + self.constant
    }

    fn merge(&mut self, other: &LinExpr, sign: f64) {
        for (v, c) in &other.coeffs {
            self.add_term(*v, sign * c);
        }
        self.constant += sign * other.constant;
    }
}

impl From<Var> for LinExpr {
    fn from(var: Var) -> Self {
        LinExpr::term(var, 1.0)
    }
}

impl From<f64> for LinExpr {
    fn from(value: f64) -> Self {
        LinExpr::constant(value)
    }
}

// ============================================================================
// Operator overloading for LinExpr
// ============================================================================

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scale(-1.0)
    }
}

impl Neg for &LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scale(-1.0)
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        self.merge(&rhs.into(), 1.0);
        self
    }
}

impl Add<&LinExpr> for &LinExpr {
    type Output = LinExpr;

    fn add(self, rhs: &LinExpr) -> LinExpr {
        let mut out = self.clone();
        out.merge(rhs, 1.0);
        out
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: T) -> LinExpr {
        self.merge(&rhs.into(), -1.0);
        self
    }
}

impl Sub<&LinExpr> for &LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: &LinExpr) -> LinExpr {
        let mut out = self.clone();
        out.merge(rhs, -1.0);
        out
    }
}

// Scalar multiplication
impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        self.scale(rhs)
    }
}

impl Mul<LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs.scale(self)
    }
}

impl Mul<&LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: &LinExpr) -> LinExpr {
        rhs.scale(self)
    }
}

// Var arithmetic produces linear expressions
impl Mul<f64> for Var {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr::term(self, rhs)
    }
}

impl Mul<Var> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: Var) -> LinExpr {
        LinExpr::term(rhs, self)
    }
}

impl<T: Into<LinExpr>> Add<T> for Var {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for Var {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

/// A vector of linear expressions, one per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffineVec {
    rows: Vec<LinExpr>,
}

impl AffineVec {
    /// Constant vector.
    pub fn from_vector(values: &DVector<f64>) -> Self {
        AffineVec {
            rows: values.iter().map(|&v| LinExpr::constant(v)).collect(),
        }
    }

    /// Matrix-vector product `A x`.
    pub fn matvec(a: &DMatrix<f64>, x: &VarVec) -> Result<Self> {
        if a.ncols() != x.len() {
            return Err(L0Error::ShapeMismatch {
                expected: format!("{} variables", a.ncols()),
                got: format!("{} variables", x.len()),
            });
        }
        let rows = (0..a.nrows())
            .map(|i| {
                let mut e = LinExpr::zero();
                for (j, var) in x.iter().enumerate() {
                    let aij = a[(i, j)];
                    if aij != 0.0 {
                        e.add_term(var, aij);
                    }
                }
                e
            })
            .collect();
        Ok(AffineVec { rows })
    }

    /// Residual `y - A x`.
    pub fn residual(y: &DVector<f64>, a: &DMatrix<f64>, x: &VarVec) -> Result<Self> {
        if a.nrows() != y.len() {
            return Err(L0Error::ShapeMismatch {
                expected: format!("{} rows", y.len()),
                got: format!("{} rows", a.nrows()),
            });
        }
        Ok(AffineVec::from_vector(y) - AffineVec::matvec(a, x)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LinExpr] {
        &self.rows
    }

    /// Squared Euclidean norm: sum_i e_i^2.
    pub fn sum_squares(&self) -> QuadExpr {
        QuadExpr {
            squares: self.rows.iter().map(|e| (1.0, e.clone())).collect(),
            linear: LinExpr::zero(),
        }
    }

    /// Evaluate every row at a point.
    pub fn evaluate(&self, values: &[f64]) -> DVector<f64> {
        DVector::from_iterator(self.rows.len(), self.rows.iter().map(|e| e.evaluate(values)))
    }
}

impl Sub for AffineVec {
    type Output = AffineVec;

    /// Row-wise difference; the shorter operand is treated as zero-padded.
    fn sub(self, rhs: AffineVec) -> AffineVec {
        let n = self.rows.len().max(rhs.rows.len());
        let mut lhs = self.rows;
        lhs.resize(n, LinExpr::zero());
        for (l, r) in lhs.iter_mut().zip(rhs.rows.iter()) {
            l.merge(r, -1.0);
        }
        AffineVec { rows: lhs }
    }
}

/// A quadratic expression: sum_k(w_k * e_k^2) + linear
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadExpr {
    squares: Vec<(f64, LinExpr)>,
    linear: LinExpr,
}

impl QuadExpr {
    /// Create a quadratic expression from a linear expression.
    pub fn from_linear(linear: LinExpr) -> Self {
        QuadExpr {
            squares: Vec::new(),
            linear,
        }
    }

    /// `weight * expr^2`.
    pub fn square(expr: LinExpr, weight: f64) -> Self {
        QuadExpr {
            squares: vec![(weight, expr)],
            linear: LinExpr::zero(),
        }
    }

    /// Weighted squared terms.
    pub fn squares(&self) -> &[(f64, LinExpr)] {
        &self.squares
    }

    pub fn linear(&self) -> &LinExpr {
        &self.linear
    }

    /// Check if this is purely linear (no quadratic terms).
    pub fn is_linear(&self) -> bool {
        self.squares.iter().all(|(w, _)| *w == 0.0)
    }

    /// Scale by a scalar.
    pub fn scale(&self, scalar: f64) -> QuadExpr {
        QuadExpr {
            squares: self
                .squares
                .iter()
                .map(|(w, e)| (w * scalar, e.clone()))
                .collect(),
            linear: self.linear.scale(scalar),
        }
    }

    /// Get all variables in this expression, sorted.
    pub fn variables(&self) -> Vec<Var> {
        let mut vars = self.linear.variables();
        for (_, e) in &self.squares {
            vars.extend(e.variables());
        }
        vars.sort();
        vars.dedup();
        vars
    }

    /// Evaluate at a point indexed by variable column.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let quad: f64 = self
            .squares
            .iter()
            .map(|(w, e)| {
                let v = e.evaluate(values);
                w * v * v
            })
            .sum();
        quad + self.linear.evaluate(values)
    }
}

impl From<LinExpr> for QuadExpr {
    fn from(linear: LinExpr) -> Self {
        QuadExpr::from_linear(linear)
    }
}

impl Add<QuadExpr> for QuadExpr {
    type Output = QuadExpr;

    fn add(mut self, rhs: QuadExpr) -> QuadExpr {
        self.squares.extend(rhs.squares);
        self.linear.merge(&rhs.linear, 1.0);
        self
    }
}

impl Add<LinExpr> for QuadExpr {
    type Output = QuadExpr;

    fn add(mut self, rhs: LinExpr) -> QuadExpr {
        self.linear.merge(&rhs, 1.0);
        self
    }
}

impl Mul<f64> for QuadExpr {
    type Output = QuadExpr;

    fn mul(self, rhs: f64) -> QuadExpr {
        self.scale(rhs)
    }
}

impl Mul<QuadExpr> for f64 {
    type Output = QuadExpr;

    fn mul(self, rhs: QuadExpr) -> QuadExpr {
        rhs.scale(self)
    }
}

impl Neg for QuadExpr {
    type Output = QuadExpr;

    fn neg(self) -> QuadExpr {
        self.scale(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(n: usize) -> VarVec {
        VarVec::new((0..n).map(Var::new).collect())
    }

    #[test]
    fn test_lin_expr_cancels_terms() {
        let x = Var::new(0);
        let e = LinExpr::from(x) + 2.0 * x - 3.0 * x;
        assert!(e.is_constant());
        assert_eq!(e.num_terms(), 0);
    }

    #[test]
    fn test_lin_expr_constant_arithmetic() {
        let x = Var::new(1);
        let e = (x + 4.0) * 2.0 - 1.0;
        assert_eq!(e.coeff(x), 2.0);
        assert_eq!(e.constant_term(), 7.0);
        assert_eq!(e.evaluate(&[0.0, 0.5]), 8.0);
    }

    #[test]
    fn test_single_term_detection() {
        let x = Var::new(3);
        assert_eq!(LinExpr::term(x, 2.5).as_single_term(), Some((x, 2.5)));
        assert_eq!((x + 1.0).as_single_term(), None);
    }

    #[test]
    fn test_residual_evaluates_like_dense_algebra() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 0.0, -1.0, 0.5, 3.0]);
        let y = DVector::from_vec(vec![4.0, -2.0]);
        let x = vars(3);
        let r = AffineVec::residual(&y, &a, &x).unwrap();

        let point = [1.0, -1.0, 2.0];
        let expected = &y - &a * DVector::from_row_slice(&point);
        assert_eq!(r.evaluate(&point), expected);
    }

    #[test]
    fn test_matvec_shape_mismatch() {
        let a = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            AffineVec::matvec(&a, &vars(4)),
            Err(L0Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_quad_expr_evaluate() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 2.0]);
        let y = DVector::from_vec(vec![1.0, 1.0]);
        let x = vars(2);
        let q = 0.5 * AffineVec::residual(&y, &a, &x).unwrap().sum_squares() + 3.0 * x.sum();
        // r = (1 - 0, 1 - 2) = (1, -1); 0.5 * 2 + 3 * 1 = 4
        assert_eq!(q.evaluate(&[0.0, 1.0]), 4.0);
        assert!(!q.is_linear());
        assert_eq!(q.variables(), vec![Var::new(0), Var::new(1)]);
    }
}
