use crate::errors::{LabError, LabResult};
use crate::hedging::ledger::{hedge_pnl, run_hedge};
use crate::hedging::{HedgeParams, HedgeTrace};
use crate::models::black_scholes::BlackScholes;
use crate::models::gbm::PathBatch;
use rayon::prelude::*;

/// Aggregated batch result. `pnls[i]` belongs to path `i`; the trace and
/// premium come from path 0 so a fixed seed always reports the same sample.
#[derive(Debug, Clone)]
pub struct MonteCarloResult {
    pub pnls: Vec<f64>,
    pub sample_trace: HedgeTrace,
    pub option_price0: f64,
}

/// Hedge every path of `batch`.
///
/// Paths are independent, so with `parallel` the tail of the batch runs on
/// the rayon pool; results are collected back in path order either way.
/// The first failing path aborts the batch.
pub fn run_monte_carlo(
    pricer: &BlackScholes,
    batch: &PathBatch,
    params: &HedgeParams,
    parallel: bool,
) -> LabResult<MonteCarloResult> {
    if batch.n_steps() < 1 {
        return Err(LabError::invalid(
            "paths must be 2D array (n_paths, n_steps+1) with n_steps+1 >= 2",
        ));
    }
    params.validate()?;

    let head = run_hedge(pricer, batch.path(0), params)?;

    let rest: Vec<f64> = if parallel {
        (1..batch.n_paths())
            .into_par_iter()
            .map(|i| hedge_pnl(pricer, batch.path(i), params))
            .collect::<LabResult<_>>()?
    } else {
        batch
            .iter()
            .skip(1)
            .map(|path| hedge_pnl(pricer, path, params))
            .collect::<LabResult<_>>()?
    };

    let mut pnls = Vec::with_capacity(batch.n_paths());
    pnls.push(head.pnl);
    pnls.extend(rest);

    Ok(MonteCarloResult {
        pnls,
        sample_trace: head.trace,
        option_price0: head.option_price0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gbm::simulate_paths;
    use crate::models::{OptionKind, OptionSpec};

    fn params() -> HedgeParams {
        HedgeParams {
            option: OptionSpec::new(100.0, 1.0, OptionKind::Call).unwrap(),
            rate: 0.01,
            assumed_sigma: 0.2,
            transaction_cost_bps: 5.0,
            short_option: true,
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let bs = BlackScholes::new();
        let batch = simulate_paths(100.0, 0.01, 0.25, 1.0, 52, 300, Some(17)).unwrap();
        let seq = run_monte_carlo(&bs, &batch, &params(), false).unwrap();
        let par = run_monte_carlo(&bs, &batch, &params(), true).unwrap();

        assert_eq!(seq.pnls.len(), 300);
        assert_eq!(seq.pnls, par.pnls);
        assert_eq!(seq.sample_trace, par.sample_trace);
    }

    #[test]
    fn test_pnls_in_path_order_and_trace_from_path_zero() {
        let bs = BlackScholes::new();
        let batch = simulate_paths(100.0, 0.01, 0.2, 1.0, 20, 10, Some(3)).unwrap();
        let mc = run_monte_carlo(&bs, &batch, &params(), true).unwrap();

        for (i, path) in batch.iter().enumerate() {
            assert_eq!(mc.pnls[i], hedge_pnl(&bs, path, &params()).unwrap());
        }
        assert_eq!(mc.sample_trace.spot.as_slice(), batch.path(0));
    }

    #[test]
    fn test_option_price0_is_assumed_vol_premium() {
        let bs = BlackScholes::new();
        let batch = simulate_paths(100.0, 0.0, 0.4, 1.0, 10, 5, Some(1)).unwrap();
        let mut p = params();
        p.rate = 0.0;
        let mc = run_monte_carlo(&bs, &batch, &p, false).unwrap();
        // Priced with assumed 20% vol, not the simulated 40%
        approx::assert_abs_diff_eq!(mc.option_price0, 7.9656, epsilon = 5e-5);
    }

    #[test]
    fn test_single_path_batch() {
        let bs = BlackScholes::new();
        let batch = PathBatch::from_rows(vec![vec![100.0, 101.0, 102.0]]).unwrap();
        let mc = run_monte_carlo(&bs, &batch, &params(), true).unwrap();
        assert_eq!(mc.pnls.len(), 1);
        assert_eq!(mc.sample_trace.len(), 3);
    }

    #[test]
    fn test_bad_path_aborts_batch() {
        let bs = BlackScholes::new();
        let batch = PathBatch::from_rows(vec![vec![100.0, 101.0, 102.0], vec![100.0, -1.0, 99.0]]).unwrap();
        assert!(matches!(
            run_monte_carlo(&bs, &batch, &params(), true),
            Err(LabError::InvalidInput(_))
        ));
    }
}
