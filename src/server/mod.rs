pub mod routes;
pub mod schemas;

use crate::errors::{LabError, LabResult};
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the HTTP router with CORS applied.
pub fn router(state: Arc<AppState>) -> LabResult<Router> {
    let cors = cors_layer(&state.config.cors_allow_origin)?;

    Ok(Router::new()
        .route("/health", get(routes::health))
        .route("/api/greeks", get(routes::get_greeks).post(routes::post_greeks))
        .route("/api/hedge/simulate", post(routes::simulate))
        .route("/api/hedge/convergence", post(routes::convergence))
        .route("/api/counters", get(routes::get_counters))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(origin: &str) -> LabResult<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let value = HeaderValue::from_str(origin)
        .map_err(|e| LabError::Config(format!("CORS_ALLOW_ORIGIN: {e}")))?;
    Ok(layer.allow_origin(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let config = AppConfig {
            parallel_hedging: false,
            ..AppConfig::default()
        };
        router(AppState::new(config)).unwrap()
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn sim_body() -> serde_json::Value {
        serde_json::json!({
            "S0": 100.0, "K": 100.0, "r": 0.0, "T": 1.0, "option_type": "call",
            "true_sigma": 0.2, "assumed_sigma": 0.2,
            "n_paths": 200, "n_steps": 52, "seed": 42
        })
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(test_router(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_greeks() {
        let req = Request::builder()
            .uri("/api/greeks?S0=100&K=100&r=0&sigma=0.2&T=1&option_type=call")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(test_router(), req).await;
        assert_eq!(status, StatusCode::OK);
        let price = json["price"].as_f64().unwrap();
        assert!((price - 7.9656).abs() < 5e-5, "price={price}");
        assert!(json["greeks"]["delta"].as_f64().unwrap() > 0.5);
        assert_eq!(json["inputs"]["option_type"], "call");
    }

    #[tokio::test]
    async fn test_post_greeks_put() {
        let body = serde_json::json!({
            "S0": 100.0, "K": 110.0, "r": 0.05, "sigma": 0.3, "T": 0.5, "option_type": "put"
        });
        let (status, json) = send(test_router(), post_json("/api/greeks", body)).await;
        assert_eq!(status, StatusCode::OK);
        let delta = json["greeks"]["delta"].as_f64().unwrap();
        assert!(delta < 0.0 && delta > -1.0);
    }

    #[tokio::test]
    async fn test_greeks_rejects_non_positive_spot() {
        let body = serde_json::json!({
            "S0": -1.0, "K": 100.0, "r": 0.0, "sigma": 0.2, "T": 1.0, "option_type": "call"
        });
        let (status, json) = send(test_router(), post_json("/api/greeks", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].as_str().unwrap().contains("S0"));
    }

    #[tokio::test]
    async fn test_simulate_response_shape() {
        let (status, json) = send(test_router(), post_json("/api/hedge/simulate", sim_body())).await;
        assert_eq!(status, StatusCode::OK);

        let counts = json["histogram"]["counts"].as_array().unwrap();
        assert_eq!(counts.len(), 40);
        assert_eq!(json["histogram"]["bin_edges"].as_array().unwrap().len(), 41);
        assert_eq!(counts.iter().map(|c| c.as_u64().unwrap()).sum::<u64>(), 200);

        for key in ["t", "S", "delta", "shares", "cash"] {
            assert_eq!(json["sample_path"][key].as_array().unwrap().len(), 53, "key={key}");
        }
        for key in ["mean_pnl", "std_pnl", "var_95", "cvar_95", "prob_loss"] {
            assert!(json["summary"][key].is_number(), "key={key}");
        }
        assert!(json["option_price0"].is_number());
    }

    #[tokio::test]
    async fn test_simulate_seeded_is_reproducible() {
        let (_, a) = send(test_router(), post_json("/api/hedge/simulate", sim_body())).await;
        let (_, b) = send(test_router(), post_json("/api/hedge/simulate", sim_body())).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_simulate_rejects_out_of_range() {
        let mut body = sim_body();
        body["n_paths"] = serde_json::json!(60_000);
        let (status, json) = send(test_router(), post_json("/api/hedge/simulate", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].as_str().unwrap().contains("n_paths"));
    }

    #[tokio::test]
    async fn test_convergence_sorted_points() {
        let mut body = sim_body();
        body["steps_list"] = serde_json::json!([52, 4, 12]);
        body["n_paths"] = serde_json::json!(50);
        let (status, json) = send(test_router(), post_json("/api/hedge/convergence", body)).await;
        assert_eq!(status, StatusCode::OK);

        let steps: Vec<u64> = json["points"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["n_steps"].as_u64().unwrap())
            .collect();
        assert_eq!(steps, vec![4, 12, 52]);
        assert!(json["points"][0]["mean_pnl"].is_number());
    }

    #[tokio::test]
    async fn test_convergence_rejects_empty_steps() {
        let mut body = sim_body();
        body["steps_list"] = serde_json::json!([]);
        let (status, _) = send(test_router(), post_json("/api/hedge/convergence", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_counters_track_runs_and_rejections() {
        let state = AppState::new(AppConfig::default());
        let app = router(state.clone()).unwrap();

        let (status, _) = send(app.clone(), post_json("/api/hedge/simulate", sim_body())).await;
        assert_eq!(status, StatusCode::OK);
        let mut bad = sim_body();
        bad["assumed_sigma"] = serde_json::json!(0.0);
        let (status, _) = send(app.clone(), post_json("/api/hedge/simulate", bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = Request::builder().uri("/api/counters").body(Body::empty()).unwrap();
        let (_, json) = send(app, req).await;
        assert_eq!(json["simulations_run"], 1);
        assert_eq!(json["paths_hedged"], 200);
        assert_eq!(json["requests_rejected"], 1);
    }

    #[test]
    fn test_cors_origin_parsing() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
