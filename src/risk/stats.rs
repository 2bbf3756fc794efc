/// Risk statistics over a realized PnL sample.
/// All functions are pure -- they take a sample and return computed values.
use crate::errors::{LabError, LabResult};

/// Tail probability used for VaR / CVaR.
const TAIL_PROB: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RiskSummary {
    pub mean_pnl: f64,
    /// Sample standard deviation (n - 1); 0 for a single observation.
    pub std_pnl: f64,
    /// 5th percentile of PnL, a signed PnL level (not a loss magnitude).
    pub var_95: f64,
    /// Mean of all outcomes at or below `var_95`.
    pub cvar_95: f64,
    /// Fraction of outcomes strictly below zero.
    pub prob_loss: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Histogram {
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u64>,
}

pub fn summarize(pnls: &[f64]) -> LabResult<RiskSummary> {
    validate_sample(pnls)?;

    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let std = if pnls.len() > 1 {
        let ss: f64 = pnls.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let prob_loss = pnls.iter().filter(|x| **x < 0.0).count() as f64 / n;

    let mut sorted = pnls.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let var_95 = quantile_sorted(&sorted, TAIL_PROB);

    let (tail_sum, tail_count) = sorted
        .iter()
        .take_while(|x| **x <= var_95)
        .fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    let cvar_95 = if tail_count > 0 {
        tail_sum / tail_count as f64
    } else {
        var_95
    };

    Ok(RiskSummary {
        mean_pnl: mean,
        std_pnl: std,
        var_95,
        cvar_95,
        prob_loss,
    })
}

/// Quantile of an ascending sample with linear interpolation between
/// order statistics: rank = p * (n - 1).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = p * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = rank - lo as f64;
        sorted[lo] + w * (sorted[hi] - sorted[lo])
    }
}

/// Equal-width histogram over [min, max]. Bins are half-open except the
/// last, which also takes `max`, so counts always sum to the sample size.
/// A zero-width sample range is widened by max(0.5, |x| * 1e-12) each side.
pub fn histogram(pnls: &[f64], n_bins: usize) -> LabResult<Histogram> {
    validate_sample(pnls)?;
    if n_bins <= 1 {
        return Err(LabError::invalid("n_bins must be > 1"));
    }

    let (mut lo, mut hi) = pnls
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(*x), hi.max(*x)));
    if lo == hi {
        let pad = (lo.abs() * 1e-12).max(0.5);
        lo -= pad;
        hi += pad;
    }

    let width = (hi - lo) / n_bins as f64;
    if !width.is_finite() || width <= 0.0 {
        return Err(LabError::invalid("pnls span too wide a range to bin"));
    }
    let mut bin_edges: Vec<f64> = (0..=n_bins).map(|i| lo + width * i as f64).collect();
    bin_edges[n_bins] = hi;

    let last = n_bins - 1;
    let mut counts = vec![0u64; n_bins];
    for &x in pnls {
        let mut idx = (((x - lo) / width) as usize).min(last);
        // Float division can land one bin off near an edge
        if idx > 0 && x < bin_edges[idx] {
            idx -= 1;
        } else if idx < last && x >= bin_edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Ok(Histogram { bin_edges, counts })
}

fn validate_sample(pnls: &[f64]) -> LabResult<()> {
    if pnls.is_empty() {
        return Err(LabError::invalid("pnls must be a non-empty 1D array"));
    }
    if pnls.iter().any(|x| !x.is_finite()) {
        return Err(LabError::invalid("pnls must be finite"));
    }
    Ok(())
}
