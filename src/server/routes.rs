use crate::errors::LabError;
use crate::hedging::experiments;
use crate::models::PricingInputs;
use crate::server::schemas::*;
use crate::state::{AppState, CountersSnapshot};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;
use std::time::Instant;

/// `LabError` as an HTTP response: `{"detail": "..."}`.
pub struct ApiError(LabError);

impl From<LabError> for ApiError {
    fn from(e: LabError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LabError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LabError::Config(_) | LabError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "detail": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Count and log a rejected request, then hand the error back.
fn reject(state: &AppState, route: &'static str, e: LabError) -> ApiError {
    if matches!(e, LabError::InvalidInput(_)) {
        state.counters.requests_rejected.fetch_add(1, Relaxed);
        tracing::warn!(route, error = %e, "request rejected");
    } else {
        tracing::error!(route, error = %e, "request failed");
    }
    ApiError(e)
}

/// GET /health -- liveness
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/greeks -- price + Greeks from query parameters
pub async fn get_greeks(
    State(state): State<Arc<AppState>>,
    Query(req): Query<GreeksRequest>,
) -> ApiResult<GreeksResponse> {
    compute_greeks(&state, req)
}

/// POST /api/greeks -- price + Greeks from a JSON body
pub async fn post_greeks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GreeksRequest>,
) -> ApiResult<GreeksResponse> {
    compute_greeks(&state, req)
}

fn compute_greeks(state: &AppState, req: GreeksRequest) -> ApiResult<GreeksResponse> {
    req.validate().map_err(|e| reject(state, "greeks", e))?;
    let g = state
        .pricer
        .price_and_greeks(&PricingInputs {
            spot: req.spot,
            strike: req.strike,
            rate: req.r,
            sigma: req.sigma,
            tau: req.maturity,
            kind: req.option_type,
        })
        .map_err(|e| reject(state, "greeks", e))?;
    Ok(Json(GreeksResponse::new(g, req)))
}

/// POST /api/hedge/simulate -- Monte Carlo hedging PnL distribution (hot path
/// runs on the blocking pool)
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HedgeSimRequest>,
) -> ApiResult<HedgeSimResponse> {
    let params = req.to_params(&state.config).map_err(|e| reject(&state, "simulate", e))?;
    let run_id = uuid::Uuid::new_v4();
    tracing::info!(
        %run_id,
        n_paths = params.n_paths,
        n_steps = req.n_steps,
        true_sigma = params.true_sigma,
        assumed_sigma = params.assumed_sigma,
        cost_bps = params.transaction_cost_bps,
        kind = %params.option.kind,
        seed = ?params.seed,
        "simulate started"
    );

    let started = Instant::now();
    let worker = state.clone();
    let n_steps = req.n_steps;
    let report = tokio::task::spawn_blocking(move || {
        experiments::run_simulation(&worker.pricer, &params, n_steps, worker.config.histogram_bins)
    })
    .await
    .map_err(LabError::from)
    .and_then(|r| r)
    .map_err(|e| reject(&state, "simulate", e))?;

    state.counters.simulations_run.fetch_add(1, Relaxed);
    state.counters.add_paths(params.n_paths as u64);
    tracing::info!(
        %run_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        mean_pnl = report.summary.mean_pnl,
        std_pnl = report.summary.std_pnl,
        var_95 = report.summary.var_95,
        "simulate finished"
    );

    Ok(Json(HedgeSimResponse {
        option_price0: report.option_price0,
        summary: report.summary,
        histogram: report.histogram,
        sample_path: report.sample_path,
    }))
}

/// POST /api/hedge/convergence -- risk statistics per hedging frequency
pub async fn convergence(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConvergenceRequest>,
) -> ApiResult<ConvergenceResponse> {
    let params = req.to_params(&state.config).map_err(|e| reject(&state, "convergence", e))?;
    let run_id = uuid::Uuid::new_v4();
    tracing::info!(
        %run_id,
        n_paths = params.n_paths,
        steps_list = ?req.steps_list,
        true_sigma = params.true_sigma,
        assumed_sigma = params.assumed_sigma,
        "convergence started"
    );

    let started = Instant::now();
    let worker = state.clone();
    let steps_list = req.steps_list;
    let report = tokio::task::spawn_blocking(move || {
        experiments::run_convergence(&worker.pricer, &params, &steps_list)
    })
    .await
    .map_err(LabError::from)
    .and_then(|r| r)
    .map_err(|e| reject(&state, "convergence", e))?;

    state.counters.convergence_runs.fetch_add(1, Relaxed);
    state
        .counters
        .add_paths(params.n_paths as u64 * report.points.len() as u64);
    tracing::info!(
        %run_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        points = report.points.len(),
        "convergence finished"
    );

    Ok(Json(ConvergenceResponse {
        option_price0: report.option_price0,
        points: report.points,
    }))
}

/// GET /api/counters -- service counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CountersSnapshot> {
    Json(state.counters.snapshot())
}
