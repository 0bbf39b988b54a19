//! End-to-end tests for the big-M L0 regression.

use l0mip::bigm::{big_m, least_squares};
use l0mip::config::RunConfig;
use l0mip::prelude::*;

/// Tolerance for comparing floating point results
const TOL: f64 = 1e-6;

/// Ground-truth coefficients followed by their indicators, in model order.
fn ground_truth_point(data: &Dataset) -> Vec<f64> {
    let indicators = data.coef.iter().map(|&c| if c != 0.0 { 1.0 } else { 0.0 });
    data.coef.iter().copied().chain(indicators).collect()
}

#[test]
fn test_default_dataset_is_reproducible() {
    let spec = RegressionSpec::default();
    let first = make_regression(&spec).unwrap();
    let second = make_regression(&spec).unwrap();
    assert_eq!(first.a, second.a);
    assert_eq!(first.y, second.y);
    assert_eq!(first.samples(), 50);
    assert_eq!(first.features(), 60);
    assert_eq!(first.support().len(), 10);
}

#[test]
fn test_big_m_bounds_least_squares_on_default_dataset() {
    let data = make_regression(&RegressionSpec::default()).unwrap();
    let m = big_m(&data.a, &data.y, DEFAULT_FACTOR).unwrap();
    let beta = least_squares(&data.a, &data.y).unwrap();
    assert!(beta.amax() < m, "max |beta| {} vs big-M {}", beta.amax(), m);
    assert!(check_big_m(&data.a, &data.y, m).is_ok());
    // The ground truth fits inside the bound too
    assert!(data.coef.amax() < m);
}

#[test]
fn test_ground_truth_is_feasible() {
    let data = make_regression(&RegressionSpec::default()).unwrap();
    let m = big_m(&data.a, &data.y, DEFAULT_FACTOR).unwrap();
    let l0 = L0Formulation::build(&data.a, &data.y, 50.0, m).unwrap();

    let point = ground_truth_point(&data);
    assert_eq!(l0.model.max_violation(&point).unwrap(), 0.0);
    let value = l0.model.evaluate_objective(&point).unwrap();
    assert!((value - 500.0).abs() < 1e-6 * 500.0, "value {}", value);
}

#[test]
fn test_relaxation_bound_below_ground_truth() {
    let data = make_regression(&RegressionSpec::new(20, 12, 4, 5)).unwrap();
    let m = big_m(&data.a, &data.y, DEFAULT_FACTOR).unwrap();
    let l0 = L0Formulation::build(&data.a, &data.y, 2.0, m).unwrap();

    let truth = l0
        .model
        .evaluate_objective(&ground_truth_point(&data))
        .unwrap();
    let bound = l0.relaxation_bound(&Settings::default()).unwrap();
    assert!(bound >= -TOL, "bound {}", bound);
    assert!(bound <= truth + TOL, "bound {} above feasible value {}", bound, truth);
}

#[cfg(feature = "scip")]
mod with_scip {
    use super::*;
    use l0mip::pipeline::{run, run_detailed};

    fn small_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.data = RegressionSpec::new(20, 10, 3, 11);
        config.lambda = 1.0;
        config.settings.time_limit = 60.0;
        config
    }

    #[test]
    fn test_small_instance_invariants() {
        let config = small_config();
        let outcome = run_detailed(&config, &Scip).unwrap();
        let fit = &outcome.fit;

        fit.check_indicator_consistency(fit.indicator_tolerance(TOL)).unwrap();
        fit.check_objective_decomposition(1e-4).unwrap();

        // The ground truth is feasible with objective 3 * lambda
        assert!(fit.nonzeros <= 3, "nonzeros {}", fit.nonzeros);
        assert!(fit.objective <= 3.0 * config.lambda + 1e-4, "objective {}", fit.objective);
        assert!(fit.loss >= 0.0);
        assert_eq!(fit.support().len(), fit.nonzeros);
    }

    #[test]
    fn test_relaxation_bound_below_mip_objective() {
        let mut config = small_config();
        config.relaxation_bound = true;
        let outcome = run_detailed(&config, &Scip).unwrap();
        let bound = outcome.relaxation_bound.expect("bound requested");
        assert!(
            bound <= outcome.fit.objective + 1e-4,
            "bound {} above MIP objective {}",
            bound,
            outcome.fit.objective
        );
    }

    #[test]
    fn test_repeated_runs_agree() {
        let config = small_config();
        let first = run(&config, &Scip).unwrap();
        let second = run(&config, &Scip).unwrap();
        assert_eq!(first.nonzeros, second.nonzeros);
        assert!((first.objective - second.objective).abs() < 1e-4);
        assert!((first.loss - second.loss).abs() < 1e-4);
    }

    #[test]
    fn test_zero_penalty_keeps_fit_exact() {
        // Without a penalty the solver has no reason to drop features
        let mut config = small_config();
        config.lambda = 0.0;
        let outcome = run_detailed(&config, &Scip).unwrap();
        assert!(outcome.fit.loss < 1e-3, "loss {}", outcome.fit.loss);
    }

    #[test]
    fn test_default_scenario() {
        let mut config = RunConfig::default();
        config.settings.time_limit = 120.0;
        let outcome = run_detailed(&config, &Scip).unwrap();
        let fit = &outcome.fit;

        assert!(fit.nonzeros > 0 && fit.nonzeros < 60, "nonzeros {}", fit.nonzeros);
        // Ground truth has objective 10 * 50
        if fit.status == SolveStatus::Optimal {
            assert!(fit.objective <= 500.0 + 1e-3, "objective {}", fit.objective);
        }
        fit.check_indicator_consistency(fit.indicator_tolerance(TOL)).unwrap();

        let printed = outcome.report.to_string();
        assert!(printed.starts_with("Results\n"));
        assert_eq!(printed.lines().count(), 5);
        assert!(printed.ends_with(&format!(" - non-zeros : {}", fit.nonzeros)));
    }
}
