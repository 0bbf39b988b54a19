//! End-to-end run: generate data, build the big-M model, solve, summarize.

use log::{info, warn};

use crate::bigm;
use crate::config::RunConfig;
use crate::data::{make_regression, Dataset};
use crate::error::{L0Error, Result};
use crate::regression::{L0Fit, L0Formulation};
use crate::report::Report;
use crate::solver::Backend;

/// Integrality tolerance assumed by the post-solve checks.
const VERIFY_TOL: f64 = 1e-6;

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub dataset: Dataset,
    pub fit: L0Fit,
    /// Continuous relaxation bound, if requested.
    pub relaxation_bound: Option<f64>,
    pub report: Report,
}

/// Run the full experiment and return the printed summary.
pub fn run(config: &RunConfig, backend: &dyn Backend) -> Result<Report> {
    Ok(run_detailed(config, backend)?.report)
}

/// Like [`run`], keeping the dataset and fit around.
pub fn run_detailed(config: &RunConfig, backend: &dyn Backend) -> Result<RunOutcome> {
    config.validate()?;

    let dataset = make_regression(&config.data)?;
    info!(
        "generated dataset: {} samples, {} features, {} informative (seed {})",
        dataset.samples(),
        dataset.features(),
        config.data.informative,
        config.data.seed
    );

    let big_m = bigm::big_m(&dataset.a, &dataset.y, config.big_m_factor)?;
    match bigm::check_big_m(&dataset.a, &dataset.y, big_m) {
        Ok(()) => info!("big-M {:.4e} bounds the least-squares solution", big_m),
        Err(err @ L0Error::BigMTooSmall { .. }) => warn!("{}", err),
        Err(err) => return Err(err),
    }

    let mut formulation = L0Formulation::build(&dataset.a, &dataset.y, config.lambda, big_m)?;
    *formulation.model.settings_mut() = config.settings.clone();

    let fit = formulation.solve(&dataset.a, &dataset.y, backend)?;
    fit.verify(VERIFY_TOL)?;
    info!(
        "{} selected {} of {} features (status {:?})",
        backend.name(),
        fit.nonzeros,
        formulation.features(),
        fit.status
    );

    let relaxation_bound = if config.relaxation_bound {
        let bound = formulation.relaxation_bound(&config.settings)?;
        if bound > fit.objective + VERIFY_TOL * fit.objective.abs().max(1.0) {
            warn!(
                "relaxation bound {:.6} exceeds MIP objective {:.6}",
                bound, fit.objective
            );
        }
        Some(bound)
    } else {
        None
    };

    let report = Report::from(&fit);
    Ok(RunOutcome {
        dataset,
        fit,
        relaxation_bound,
        report,
    })
}
