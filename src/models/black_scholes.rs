use crate::errors::{LabError, LabResult};
use crate::models::{OptionKind, PriceGreeks, PricingInputs};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Black-Scholes-Merton European pricer.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*tau) / (sigma * sqrt(tau))
/// d2 = d1 - sigma * sqrt(tau)
///
/// Puts use N(-d1), N(-d2). Pure: deterministic output from inputs only,
/// so it is shared freely across hedging threads.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// Price and Greeks. Near-zero tau or sigma is rejected, never clamped.
    pub fn price_and_greeks(&self, inputs: &PricingInputs) -> LabResult<PriceGreeks> {
        let PricingInputs {
            spot: s,
            strike: k,
            rate: r,
            sigma,
            tau,
            kind,
        } = *inputs;

        if !(s > 0.0 && k > 0.0 && sigma > 0.0 && tau > 0.0) {
            return Err(LabError::invalid("S, K, sigma, and T must be > 0"));
        }
        if !(s.is_finite() && k.is_finite() && sigma.is_finite() && tau.is_finite() && r.is_finite()) {
            return Err(LabError::invalid("S, K, r, sigma, and T must be finite"));
        }

        let sqrt_t = tau.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * tau) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        let n_d1 = self.normal.pdf(d1);
        let disc = (-r * tau).exp();
        // Time decay shared by both kinds
        let decay = -(s * n_d1 * sigma) / (2.0 * sqrt_t);

        let (price, delta, theta, rho) = match kind {
            OptionKind::Call => {
                let cdf_d1 = self.normal.cdf(d1);
                let cdf_d2 = self.normal.cdf(d2);
                (
                    s * cdf_d1 - k * disc * cdf_d2,
                    cdf_d1,
                    decay - r * k * disc * cdf_d2,
                    k * tau * disc * cdf_d2,
                )
            }
            OptionKind::Put => {
                let cdf_neg_d1 = self.normal.cdf(-d1);
                let cdf_neg_d2 = self.normal.cdf(-d2);
                (
                    k * disc * cdf_neg_d2 - s * cdf_neg_d1,
                    -cdf_neg_d1,
                    decay + r * k * disc * cdf_neg_d2,
                    -k * tau * disc * cdf_neg_d2,
                )
            }
        };

        Ok(PriceGreeks {
            price,
            delta,
            gamma: n_d1 / (s * sigma_sqrt_t),
            theta,
            vega: s * n_d1 * sqrt_t,
            rho,
        })
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}
