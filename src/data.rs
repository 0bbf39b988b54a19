//! Seeded synthetic regression datasets.
//!
//! Samples follow a sparse linear model:
//!
//! ```text
//! A_ij ~ N(0, 1)
//! w_j  = 100 * U[0, 1)   for the first `informative` features, 0 otherwise
//! y    = A w + bias + noise * N(0, 1)
//! ```
//!
//! then rows and columns are optionally permuted, so informative features
//! end up at random positions. All randomness comes from one
//! `ChaCha8Rng`, which gives the same stream on every platform.

use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::error::{L0Error, Result};

/// Parameters of a synthetic regression dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSpec {
    pub samples: usize,
    pub features: usize,
    /// Number of features with a non-zero ground-truth coefficient.
    pub informative: usize,
    pub bias: f64,
    /// Standard deviation of the Gaussian noise added to `y`.
    pub noise: f64,
    /// Permute samples and features after generation.
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for RegressionSpec {
    fn default() -> Self {
        RegressionSpec {
            samples: 50,
            features: 60,
            informative: 10,
            bias: 0.0,
            noise: 0.0,
            shuffle: true,
            seed: 0,
        }
    }
}

impl RegressionSpec {
    pub fn new(samples: usize, features: usize, informative: usize, seed: u64) -> Self {
        RegressionSpec {
            samples,
            features,
            informative,
            seed,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(L0Error::InvalidDataset("samples must be positive".into()));
        }
        if self.features == 0 {
            return Err(L0Error::InvalidDataset("features must be positive".into()));
        }
        if self.informative > self.features {
            return Err(L0Error::InvalidDataset(format!(
                "informative ({}) exceeds features ({})",
                self.informative, self.features
            )));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(L0Error::InvalidDataset(format!(
                "noise must be finite and non-negative, got {}",
                self.noise
            )));
        }
        if !self.bias.is_finite() {
            return Err(L0Error::InvalidDataset(format!(
                "bias must be finite, got {}",
                self.bias
            )));
        }
        Ok(())
    }
}

/// A design matrix with its response and ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Design matrix, samples x features.
    pub a: DMatrix<f64>,
    /// Response, one entry per sample.
    pub y: DVector<f64>,
    /// Ground-truth coefficients used to generate `y`.
    pub coef: DVector<f64>,
}

impl Dataset {
    pub fn samples(&self) -> usize {
        self.a.nrows()
    }

    pub fn features(&self) -> usize {
        self.a.ncols()
    }

    /// Indices of features with a non-zero ground-truth coefficient.
    pub fn support(&self) -> Vec<usize> {
        self.coef
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0.0)
            .map(|(j, _)| j)
            .collect()
    }
}

/// Generate a regression dataset.
pub fn make_regression(spec: &RegressionSpec) -> Result<Dataset> {
    spec.validate()?;
    let (m, n) = (spec.samples, spec.features);
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

    // Row-major draw so the stream does not depend on storage order
    let mut a = DMatrix::<f64>::zeros(m, n);
    for i in 0..m {
        for j in 0..n {
            a[(i, j)] = rng.sample(StandardNormal);
        }
    }

    let mut coef = DVector::<f64>::zeros(n);
    for j in 0..spec.informative {
        coef[j] = 100.0 * rng.gen::<f64>();
    }

    let mut y = &a * &coef;
    y.add_scalar_mut(spec.bias);
    if spec.noise > 0.0 {
        for yi in y.iter_mut() {
            *yi += spec.noise * rng.sample::<f64, _>(StandardNormal);
        }
    }

    if spec.shuffle {
        let mut rows: Vec<usize> = (0..m).collect();
        rows.shuffle(&mut rng);
        let mut cols: Vec<usize> = (0..n).collect();
        cols.shuffle(&mut rng);

        a = DMatrix::from_fn(m, n, |i, j| a[(rows[i], cols[j])]);
        y = DVector::from_fn(m, |i, _| y[rows[i]]);
        coef = DVector::from_fn(n, |j, _| coef[cols[j]]);
    }

    Ok(Dataset { a, y, coef })
}
