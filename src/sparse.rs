//! Sparse matrix utilities.
//!
//! Helper functions for assembling nalgebra-sparse matrices from
//! (row, col, value) triplets.

use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Accumulated (row, col, value) triplets.
#[derive(Debug, Clone, Default)]
pub struct Triplets {
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
}

impl Triplets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: usize, col: usize, val: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.vals.push(val);
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }
}

/// Create a CSC matrix from triplets.
///
/// Duplicates are summed together. Entries outside the shape are dropped.
pub fn csc_from_triplets(nrows: usize, ncols: usize, triplets: Triplets) -> CscMatrix<f64> {
    if triplets.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }

    // Build COO matrix first
    let mut coo = CooMatrix::new(nrows, ncols);
    let Triplets { rows, cols, vals } = triplets;
    for ((row, col), val) in rows.into_iter().zip(cols).zip(vals) {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }

    // Convert to CSC
    CscMatrix::from(&coo)
}
