use crate::errors::{LabError, LabResult};
use crate::hedging::monte_carlo::run_monte_carlo;
use crate::hedging::{HedgeParams, HedgeTrace};
use crate::models::black_scholes::BlackScholes;
use crate::models::gbm::simulate_paths;
use crate::models::{OptionSpec, PricingInputs};
use crate::risk::stats::{self, Histogram, RiskSummary};
use smallvec::SmallVec;

/// Inputs shared by a simulate run and every point of a convergence study.
#[derive(Debug, Clone, Copy)]
pub struct ExperimentParams {
    pub spot: f64,
    pub rate: f64,
    pub option: OptionSpec,
    /// Volatility the paths are simulated with.
    pub true_sigma: f64,
    /// Volatility the hedger believes in.
    pub assumed_sigma: f64,
    pub n_paths: usize,
    pub transaction_cost_bps: f64,
    pub seed: Option<u64>,
    pub short_option: bool,
    pub parallel: bool,
}

impl ExperimentParams {
    fn hedge_params(&self) -> HedgeParams {
        HedgeParams {
            option: self.option,
            rate: self.rate,
            assumed_sigma: self.assumed_sigma,
            transaction_cost_bps: self.transaction_cost_bps,
            short_option: self.short_option,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub option_price0: f64,
    pub summary: RiskSummary,
    pub histogram: Histogram,
    pub sample_path: HedgeTrace,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConvergencePoint {
    pub n_steps: usize,
    #[serde(flatten)]
    pub summary: RiskSummary,
}

#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    pub option_price0: f64,
    /// Ascending by `n_steps`.
    pub points: SmallVec<[ConvergencePoint; 8]>,
}

/// Simulate with the true vol, hedge with the assumed vol, summarize.
pub fn run_simulation(
    pricer: &BlackScholes,
    params: &ExperimentParams,
    n_steps: usize,
    histogram_bins: usize,
) -> LabResult<SimulationReport> {
    let hedge = params.hedge_params();
    hedge.validate()?;

    let batch = simulate_paths(
        params.spot,
        params.rate,
        params.true_sigma,
        params.option.maturity,
        n_steps,
        params.n_paths,
        params.seed,
    )?;
    let mc = run_monte_carlo(pricer, &batch, &hedge, params.parallel)?;

    let summary = stats::summarize(&mc.pnls)?;
    let histogram = stats::histogram(&mc.pnls, histogram_bins)?;

    Ok(SimulationReport {
        option_price0: mc.option_price0,
        summary,
        histogram,
        sample_path: mc.sample_trace,
    })
}

/// Repeat the full pipeline once per distinct step count, everything else
/// (seed included) held fixed, to isolate the effect of hedging frequency.
pub fn run_convergence(
    pricer: &BlackScholes,
    params: &ExperimentParams,
    steps_list: &[usize],
) -> LabResult<ConvergenceReport> {
    if steps_list.is_empty() {
        return Err(LabError::invalid("steps_list must be non-empty"));
    }
    if steps_list.iter().any(|s| *s == 0) {
        return Err(LabError::invalid("All n_steps in steps_list must be > 0"));
    }
    let hedge = params.hedge_params();
    hedge.validate()?;

    // Same premium for every point, priced once at the initial spot
    let option_price0 = pricer
        .price_and_greeks(&PricingInputs {
            spot: params.spot,
            strike: params.option.strike,
            rate: params.rate,
            sigma: params.assumed_sigma,
            tau: params.option.maturity,
            kind: params.option.kind,
        })?
        .price;

    let mut steps: SmallVec<[usize; 8]> = steps_list.iter().copied().collect();
    steps.sort_unstable();
    steps.dedup();

    let mut points = SmallVec::new();
    for n_steps in steps {
        let batch = simulate_paths(
            params.spot,
            params.rate,
            params.true_sigma,
            params.option.maturity,
            n_steps,
            params.n_paths,
            params.seed,
        )?;
        let mc = run_monte_carlo(pricer, &batch, &hedge, params.parallel)?;
        let summary = stats::summarize(&mc.pnls)?;

        tracing::debug!(
            n_steps,
            mean_pnl = summary.mean_pnl,
            std_pnl = summary.std_pnl,
            "convergence point"
        );
        points.push(ConvergencePoint { n_steps, summary });
    }

    Ok(ConvergenceReport { option_price0, points })
}
