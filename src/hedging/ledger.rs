use crate::errors::{LabError, LabResult};
use crate::hedging::{HedgeParams, HedgeTrace};
use crate::models::black_scholes::BlackScholes;
use crate::models::PricingInputs;

/// Cost of trading `notional` at `bps` basis points. bps <= 0 is free.
#[inline]
pub fn transaction_cost(notional: f64, bps: f64) -> f64 {
    if bps <= 0.0 {
        return 0.0;
    }
    notional.abs() * (bps / 10_000.0)
}

/// Self-financing cash/shares position for one path.
///
/// The only external cash flow is the option premium at open. Afterwards
/// every share trade is paid from cash (plus its cost) and cash only
/// otherwise changes by interest accrual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeLedgerState {
    pub shares: f64,
    pub cash: f64,
    pub delta: f64,
}

impl HedgeLedgerState {
    /// Sold option: premium received. Bought option: premium paid.
    #[inline]
    pub fn open(premium: f64, short_option: bool) -> Self {
        Self {
            shares: 0.0,
            cash: if short_option { premium } else { -premium },
            delta: 0.0,
        }
    }

    /// Continuous compounding over one step; `growth` = exp(r*dt).
    #[inline]
    pub fn accrue(&mut self, growth: f64) {
        self.cash *= growth;
    }

    /// Trade to `target` shares at `spot`, paying notional plus cost from cash.
    #[inline]
    pub fn rehedge(&mut self, target: f64, spot: f64, bps: f64) {
        let notional = (target - self.shares) * spot;
        self.cash -= notional + transaction_cost(notional, bps);
        self.shares = target;
        self.delta = target;
    }

    /// Mark shares and cash at the terminal spot, net of the option payoff.
    #[inline]
    pub fn settle(&self, terminal_spot: f64, payoff: f64) -> f64 {
        self.shares * terminal_spot + self.cash - payoff
    }
}

/// Result of hedging one path.
#[derive(Debug, Clone)]
pub struct HedgeOutcome {
    pub pnl: f64,
    /// Premium charged at t=0 (assumed vol, initial spot, full maturity).
    pub option_price0: f64,
    pub trace: HedgeTrace,
}

/// One row of the ledger, emitted after each time point is processed.
#[derive(Debug, Clone, Copy)]
struct LedgerStep {
    t: f64,
    spot: f64,
    state: HedgeLedgerState,
}

/// Hedge one path and keep the full per-step trace.
pub fn run_hedge(pricer: &BlackScholes, path: &[f64], params: &HedgeParams) -> LabResult<HedgeOutcome> {
    let mut trace = HedgeTrace::with_capacity(path.len());
    let (pnl, option_price0) = replay(pricer, path, params, |step| {
        trace.t.push(step.t);
        trace.spot.push(step.spot);
        trace.delta.push(step.state.delta);
        trace.shares.push(step.state.shares);
        trace.cash.push(step.state.cash);
    })?;

    Ok(HedgeOutcome { pnl, option_price0, trace })
}

/// Hedge one path, returning only the realized PnL. No per-step allocation.
pub fn hedge_pnl(pricer: &BlackScholes, path: &[f64], params: &HedgeParams) -> LabResult<f64> {
    replay(pricer, path, params, |_| {}).map(|(pnl, _)| pnl)
}

/// Walk the path forward, re-pricing at each strictly shrinking tau.
///
/// t=0: collect/pay premium, trade 0 -> delta0.
/// k=1..n-1: accrue, re-price at tau = T - k*dt, trade to new delta.
/// k=n: accrue only; the previous delta is carried into the record, no
/// trade goes through at expiry.
fn replay<F>(pricer: &BlackScholes, path: &[f64], params: &HedgeParams, mut record: F) -> LabResult<(f64, f64)>
where
    F: FnMut(LedgerStep),
{
    params.validate()?;
    if path.len() < 2 {
        return Err(LabError::invalid("S_path must be 1D array of length >= 2"));
    }

    let option = params.option;
    let n_steps = path.len() - 1;
    let dt = option.maturity / n_steps as f64;
    let growth = (params.rate * dt).exp();
    let bps = params.transaction_cost_bps;

    let price_at = |spot: f64, tau: f64| {
        pricer.price_and_greeks(&PricingInputs {
            spot,
            strike: option.strike,
            rate: params.rate,
            sigma: params.assumed_sigma,
            tau,
            kind: option.kind,
        })
    };

    let s0 = path[0];
    let g0 = price_at(s0, option.maturity)?;
    let mut state = HedgeLedgerState::open(g0.price, params.short_option);
    state.rehedge(g0.delta, s0, bps);
    record(LedgerStep { t: 0.0, spot: s0, state });

    for (step, &spot) in path.iter().enumerate().skip(1) {
        state.accrue(growth);

        if step < n_steps {
            let tau = option.maturity - step as f64 * dt;
            let target = price_at(spot, tau)?.delta;
            state.rehedge(target, spot, bps);
        }

        record(LedgerStep {
            t: option.maturity * step as f64 / n_steps as f64,
            spot,
            state,
        });
    }

    let terminal = path[n_steps];
    let payoff = option.kind.payoff(terminal, option.strike);
    Ok((state.settle(terminal, payoff), g0.price))
}
