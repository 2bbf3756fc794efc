//! Request/response bodies for the HTTP boundary.
//!
//! Field names follow the JSON contract the front end already speaks
//! (`S0`, `K`, `r`, `T`, ...). Range checks here mirror the service limits
//! in `AppConfig`; the core re-checks its own preconditions regardless.

use crate::config::AppConfig;
use crate::errors::{LabError, LabResult};
use crate::hedging::experiments::{ConvergencePoint, ExperimentParams};
use crate::hedging::HedgeTrace;
use crate::models::{OptionKind, OptionSpec, PriceGreeks};
use crate::risk::stats::{Histogram, RiskSummary};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ── Greeks ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GreeksRequest {
    #[serde(rename = "S0")]
    pub spot: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    pub r: f64,
    pub sigma: f64,
    #[serde(rename = "T")]
    pub maturity: f64,
    pub option_type: OptionKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GreeksResponse {
    pub price: f64,
    pub greeks: Greeks,
    pub inputs: GreeksRequest,
}

impl GreeksResponse {
    pub fn new(g: PriceGreeks, inputs: GreeksRequest) -> Self {
        Self {
            price: g.price,
            greeks: Greeks {
                delta: g.delta,
                gamma: g.gamma,
                theta: g.theta,
                vega: g.vega,
                rho: g.rho,
            },
            inputs,
        }
    }
}

// ── Hedge simulation ──

fn default_n_paths() -> usize {
    2000
}

fn default_n_steps() -> usize {
    252
}

fn default_short_option() -> bool {
    true
}

fn default_steps_list() -> Vec<usize> {
    vec![12, 52, 252, 1000]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeSimRequest {
    #[serde(rename = "S0")]
    pub spot: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    pub r: f64,
    #[serde(rename = "T")]
    pub maturity: f64,
    pub option_type: OptionKind,
    pub true_sigma: f64,
    pub assumed_sigma: f64,
    #[serde(default = "default_n_paths")]
    pub n_paths: usize,
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
    #[serde(default)]
    pub transaction_cost_bps: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_short_option")]
    pub short_option: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HedgeSimResponse {
    pub option_price0: f64,
    pub summary: RiskSummary,
    pub histogram: Histogram,
    pub sample_path: HedgeTrace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceRequest {
    #[serde(rename = "S0")]
    pub spot: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    pub r: f64,
    #[serde(rename = "T")]
    pub maturity: f64,
    pub option_type: OptionKind,
    pub true_sigma: f64,
    pub assumed_sigma: f64,
    #[serde(default = "default_n_paths")]
    pub n_paths: usize,
    #[serde(default = "default_steps_list")]
    pub steps_list: Vec<usize>,
    #[serde(default)]
    pub transaction_cost_bps: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_short_option")]
    pub short_option: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceResponse {
    pub option_price0: f64,
    pub points: SmallVec<[ConvergencePoint; 8]>,
}

// ── Boundary validation ──

fn require_positive(name: &str, value: f64) -> LabResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(LabError::invalid(format!("{name} must be > 0")))
    }
}

fn require_in_range(name: &str, value: usize, max: usize) -> LabResult<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(LabError::invalid(format!("{name} must be between 1 and {max}")))
    }
}

impl GreeksRequest {
    pub fn validate(&self) -> LabResult<()> {
        require_positive("S0", self.spot)?;
        require_positive("K", self.strike)?;
        require_positive("sigma", self.sigma)?;
        require_positive("T", self.maturity)?;
        if !self.r.is_finite() {
            return Err(LabError::invalid("r must be finite"));
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn experiment_params(
    cfg: &AppConfig,
    spot: f64,
    strike: f64,
    r: f64,
    maturity: f64,
    kind: OptionKind,
    true_sigma: f64,
    assumed_sigma: f64,
    n_paths: usize,
    transaction_cost_bps: f64,
    seed: Option<u64>,
    short_option: bool,
) -> LabResult<ExperimentParams> {
    require_positive("S0", spot)?;
    require_positive("true_sigma", true_sigma)?;
    require_positive("assumed_sigma", assumed_sigma)?;
    if !r.is_finite() {
        return Err(LabError::invalid("r must be finite"));
    }
    require_in_range("n_paths", n_paths, cfg.max_paths)?;
    if !(0.0..=cfg.max_transaction_cost_bps).contains(&transaction_cost_bps) {
        return Err(LabError::invalid(format!(
            "transaction_cost_bps must be between 0 and {}",
            cfg.max_transaction_cost_bps
        )));
    }

    Ok(ExperimentParams {
        spot,
        rate: r,
        option: OptionSpec::new(strike, maturity, kind)?,
        true_sigma,
        assumed_sigma,
        n_paths,
        transaction_cost_bps,
        seed,
        short_option,
        parallel: cfg.parallel_hedging,
    })
}

impl HedgeSimRequest {
    pub fn to_params(&self, cfg: &AppConfig) -> LabResult<ExperimentParams> {
        require_in_range("n_steps", self.n_steps, cfg.max_steps)?;
        experiment_params(
            cfg,
            self.spot,
            self.strike,
            self.r,
            self.maturity,
            self.option_type,
            self.true_sigma,
            self.assumed_sigma,
            self.n_paths,
            self.transaction_cost_bps,
            self.seed,
            self.short_option,
        )
    }
}

impl ConvergenceRequest {
    pub fn to_params(&self, cfg: &AppConfig) -> LabResult<ExperimentParams> {
        if self.steps_list.is_empty() {
            return Err(LabError::invalid("steps_list must be non-empty"));
        }
        for &n_steps in &self.steps_list {
            require_in_range("each entry of steps_list", n_steps, cfg.max_steps)?;
        }
        experiment_params(
            cfg,
            self.spot,
            self.strike,
            self.r,
            self.maturity,
            self.option_type,
            self.true_sigma,
            self.assumed_sigma,
            self.n_paths,
            self.transaction_cost_bps,
            self.seed,
            self.short_option,
        )
    }
}
