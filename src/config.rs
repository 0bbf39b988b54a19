//! Run configuration.
//!
//! Defaults reproduce the reference experiment: 50 samples, 60 features of
//! which 10 are informative, seed 0, penalty weight 50.

use crate::bigm::DEFAULT_FACTOR;
use crate::data::RegressionSpec;
use crate::error::{L0Error, Result};
use crate::solver::Settings;

/// Everything needed for one end-to-end run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data: RegressionSpec,
    /// Weight of the L0 penalty.
    pub lambda: f64,
    /// Big-M multiplier applied to `max |A' y|`.
    pub big_m_factor: f64,
    pub settings: Settings,
    /// Also solve the continuous relaxation and log its bound.
    pub relaxation_bound: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data: RegressionSpec::default(),
            lambda: 50.0,
            big_m_factor: DEFAULT_FACTOR,
            settings: Settings::default(),
            relaxation_bound: false,
        }
    }
}

impl RunConfig {
    /// Reject values that would only fail later inside the solver.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(L0Error::InvalidModel(format!(
                "lambda must be finite and non-negative, got {}",
                self.lambda
            )));
        }
        if !self.big_m_factor.is_finite() || self.big_m_factor <= 1.0 {
            return Err(L0Error::InvalidModel(format!(
                "big-M factor must be finite and greater than 1, got {}",
                self.big_m_factor
            )));
        }
        if self.settings.time_limit.is_nan() || self.settings.time_limit <= 0.0 {
            return Err(L0Error::InvalidModel(format!(
                "time limit must be positive, got {}",
                self.settings.time_limit
            )));
        }
        if let Some(gap) = self.settings.mip_gap {
            if !(0.0..=1.0).contains(&gap) {
                return Err(L0Error::InvalidModel(format!(
                    "MIP gap must be in [0, 1], got {}",
                    gap
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = RunConfig::default();
        assert_eq!(config.data.samples, 50);
        assert_eq!(config.data.features, 60);
        assert_eq!(config.data.informative, 10);
        assert_eq!(config.data.seed, 0);
        assert_eq!(config.lambda, 50.0);
        assert_eq!(config.big_m_factor, 1.5);
        assert!(!config.settings.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RunConfig::default();
        config.lambda = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.big_m_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.settings.time_limit = 0.0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.settings.mip_gap = Some(2.0);
        assert!(config.validate().is_err());
    }
}
