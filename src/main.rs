use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use l0mip::bigm::DEFAULT_FACTOR;
use l0mip::config::RunConfig;
use l0mip::data::RegressionSpec;
use l0mip::pipeline;
use l0mip::solver::{self, Settings};

/// L0-penalized least squares on synthetic data, solved as a MIP.
#[derive(Parser, Debug, Clone)]
#[command(name = "l0mip")]
#[command(version)]
#[command(about = "Best-subset regression via a big-M mixed-integer program")]
struct Cli {
    /// Number of samples
    #[arg(long, default_value_t = 50)]
    samples: usize,

    /// Number of features
    #[arg(long, default_value_t = 60)]
    features: usize,

    /// Number of features with a non-zero ground-truth coefficient
    #[arg(long, default_value_t = 10)]
    informative: usize,

    /// Random seed for data generation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Standard deviation of the Gaussian noise on the response
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Weight of the L0 penalty
    #[arg(long, default_value_t = 50.0)]
    lambda: f64,

    /// Big-M multiplier applied to max |A' y|
    #[arg(long, default_value_t = DEFAULT_FACTOR)]
    big_m_factor: f64,

    /// Solver time limit in seconds
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Relative MIP gap at which the solver stops
    #[arg(long, value_name = "GAP")]
    mip_gap: Option<f64>,

    /// Show solver output
    #[arg(short, long)]
    verbose: bool,

    /// Also solve the continuous relaxation and log its bound
    #[arg(long)]
    relaxation_bound: bool,
}

impl Cli {
    fn to_config(&self) -> RunConfig {
        RunConfig {
            data: RegressionSpec {
                noise: self.noise,
                ..RegressionSpec::new(self.samples, self.features, self.informative, self.seed)
            },
            lambda: self.lambda,
            big_m_factor: self.big_m_factor,
            settings: Settings {
                verbose: self.verbose,
                time_limit: self.time_limit.unwrap_or(f64::INFINITY),
                mip_gap: self.mip_gap,
                ..Settings::default()
            },
            relaxation_bound: self.relaxation_bound,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.to_config();
    config.validate().context("invalid configuration")?;

    let backend = solver::mip_backend().context("no mixed-integer solver available")?;
    let report = pipeline::run(&config, backend.as_ref())
        .with_context(|| format!("solving with {} failed", backend.name()))?;

    println!("{}", report);
    Ok(())
}
