mod config;
mod errors;
mod hedging;
mod models;
mod risk;
mod server;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("hedging_lab starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = cfg.server_port,
        cors_origin = %cfg.cors_allow_origin,
        max_paths = cfg.max_paths,
        max_steps = cfg.max_steps,
        parallel_hedging = cfg.parallel_hedging,
        "config loaded"
    );

    let port = cfg.server_port;
    let app_state = AppState::new(cfg);

    let app = match server::router(app_state) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("router error: {e}");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
