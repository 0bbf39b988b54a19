//! Big-M bound for the indicator constraints.
//!
//! The bound `M = factor * max_j |(A' y)_j|` is a data-driven heuristic. It
//! is only valid if no coefficient of interest reaches it, which is checked
//! against the minimum-norm least-squares solution.

use nalgebra::{DMatrix, DVector};

use crate::error::{L0Error, Result};

/// Multiplier applied to the largest correlation.
pub const DEFAULT_FACTOR: f64 = 1.5;

/// Singular values below this (relative to the largest) are treated as zero.
const PINV_RTOL: f64 = 1e-12;

/// Correlation vector `A' y`.
pub fn correlation(a: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_dims(a, y)?;
    Ok(a.tr_mul(y))
}

/// `factor * max_j |(A' y)_j|`.
pub fn big_m(a: &DMatrix<f64>, y: &DVector<f64>, factor: f64) -> Result<f64> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(L0Error::InvalidModel(format!(
            "big-M factor must be finite and positive, got {}",
            factor
        )));
    }
    let corr = correlation(a, y)?;
    let m = factor * corr.amax();
    if !m.is_finite() || m <= 0.0 {
        return Err(L0Error::InvalidModel(format!(
            "degenerate big-M {} (all correlations are zero or non-finite)",
            m
        )));
    }
    Ok(m)
}

/// Minimum-norm least-squares solution of `A x = y`.
pub fn least_squares(a: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_dims(a, y)?;
    let svd = a.clone().svd(true, true);
    let smax = svd.singular_values.max();
    let eps = (smax * PINV_RTOL).max(f64::MIN_POSITIVE);
    svd.solve(y, eps)
        .map_err(|e| L0Error::NumericalError(format!("least squares: {}", e)))
}

/// Check that every least-squares coefficient is strictly inside the bound.
pub fn check_big_m(a: &DMatrix<f64>, y: &DVector<f64>, big_m: f64) -> Result<()> {
    let beta = least_squares(a, y)?;
    match beta.iter().enumerate().find(|(_, b)| b.abs() >= big_m) {
        Some((feature, &coefficient)) => Err(L0Error::BigMTooSmall {
            feature,
            coefficient,
            big_m,
        }),
        None => Ok(()),
    }
}

/// Features whose coefficient sits at the bound, within `rel_tol`.
///
/// A non-empty result means the bound may have clipped the optimum.
pub fn boundary_features(x: &DVector<f64>, big_m: f64, rel_tol: f64) -> Vec<usize> {
    let threshold = big_m * (1.0 - rel_tol);
    x.iter()
        .enumerate()
        .filter(|(_, v)| v.abs() >= threshold)
        .map(|(j, _)| j)
        .collect()
}

fn check_dims(a: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
    if a.nrows() != y.len() {
        return Err(L0Error::ShapeMismatch {
            expected: format!("response of length {}", a.nrows()),
            got: format!("length {}", y.len()),
        });
    }
    if a.is_empty() {
        return Err(L0Error::InvalidModel("empty design matrix".into()));
    }
    Ok(())
}
