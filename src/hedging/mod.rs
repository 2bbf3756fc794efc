pub mod experiments;
pub mod ledger;
pub mod monte_carlo;

use crate::errors::{LabError, LabResult};
use crate::models::OptionSpec;

/// Per-batch hedging parameters. Shared read-only by every path.
#[derive(Debug, Clone, Copy)]
pub struct HedgeParams {
    pub option: OptionSpec,
    pub rate: f64,
    /// Volatility used for hedge ratios (may differ from the simulated one).
    pub assumed_sigma: f64,
    /// Cost per unit notional traded, in basis points. <= 0 means free.
    pub transaction_cost_bps: f64,
    /// true = sold the option and hedge it; false = bought it.
    pub short_option: bool,
}

impl HedgeParams {
    pub fn validate(&self) -> LabResult<()> {
        if !(self.option.strike > 0.0 && self.option.maturity > 0.0 && self.assumed_sigma > 0.0) {
            return Err(LabError::invalid("K, T, assumed_sigma must be > 0"));
        }
        if !(self.rate.is_finite() && self.assumed_sigma.is_finite() && self.transaction_cost_bps.is_finite()) {
            return Err(LabError::invalid("r, assumed_sigma and transaction_cost_bps must be finite"));
        }
        Ok(())
    }
}

/// Ledger history for one path, one entry per time point.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct HedgeTrace {
    pub t: Vec<f64>,
    #[serde(rename = "S")]
    pub spot: Vec<f64>,
    pub delta: Vec<f64>,
    pub shares: Vec<f64>,
    pub cash: Vec<f64>,
}

impl HedgeTrace {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            spot: Vec::with_capacity(n),
            delta: Vec::with_capacity(n),
            shares: Vec::with_capacity(n),
            cash: Vec::with_capacity(n),
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.t.len()
    }
}
