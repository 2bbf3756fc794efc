pub mod black_scholes;
pub mod gbm;

use crate::errors::{LabError, LabResult};

// ── Option contract ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Intrinsic value at expiry.
    #[inline]
    pub fn payoff(&self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(LabError::invalid(format!(
                "option_type must be 'call' or 'put', got '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for OptionKind {
    type Error = LabError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Immutable per-request contract terms.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub strike: f64,
    /// Years.
    pub maturity: f64,
    pub kind: OptionKind,
}

impl OptionSpec {
    pub fn new(strike: f64, maturity: f64, kind: OptionKind) -> LabResult<Self> {
        if !(strike > 0.0) || !strike.is_finite() {
            return Err(LabError::invalid("K must be > 0"));
        }
        if !(maturity > 0.0) || !maturity.is_finite() {
            return Err(LabError::invalid("T must be > 0"));
        }
        Ok(Self { strike, maturity, kind })
    }
}

// ── Pricer input/output (stack, Copy) ──

#[derive(Debug, Clone, Copy)]
pub struct PricingInputs {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub sigma: f64,
    /// Time to maturity in years.
    pub tau: f64,
    pub kind: OptionKind,
}

/// Price and sensitivities. Theta is per year, vega per unit vol,
/// rho per unit rate (divide by 100 for per-point figures).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceGreeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}
