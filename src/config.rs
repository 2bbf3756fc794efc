use crate::errors::{LabError, LabResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// Allowed CORS origin; "*" allows any.
    pub cors_allow_origin: String,
    pub histogram_bins: usize,
    pub max_paths: usize,
    pub max_steps: usize,
    pub max_transaction_cost_bps: f64,
    pub parallel_hedging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8000,
            cors_allow_origin: "http://localhost:3000".to_string(),
            histogram_bins: 40,
            max_paths: 50_000,
            max_steps: 5_000,
            max_transaction_cost_bps: 100.0,
            parallel_hedging: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> LabResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| LabError::Config(format!("SERVER_PORT: {e}")))?;

        let histogram_bins = env_var_or("HISTOGRAM_BINS", "40")
            .parse::<usize>()
            .map_err(|e| LabError::Config(format!("HISTOGRAM_BINS: {e}")))?;
        if histogram_bins < 2 {
            return Err(LabError::Config("HISTOGRAM_BINS must be > 1".into()));
        }

        let max_paths = env_var_or("MAX_PATHS", "50000")
            .parse::<usize>()
            .map_err(|e| LabError::Config(format!("MAX_PATHS: {e}")))?;

        let max_steps = env_var_or("MAX_STEPS", "5000")
            .parse::<usize>()
            .map_err(|e| LabError::Config(format!("MAX_STEPS: {e}")))?;

        let max_transaction_cost_bps = env_var_or("MAX_TRANSACTION_COST_BPS", "100")
            .parse::<f64>()
            .map_err(|e| LabError::Config(format!("MAX_TRANSACTION_COST_BPS: {e}")))?;

        let parallel_hedging = env_var_or("PARALLEL_HEDGING", "true")
            .parse::<bool>()
            .map_err(|e| LabError::Config(format!("PARALLEL_HEDGING: {e}")))?;

        Ok(Self {
            server_port,
            cors_allow_origin: env_var_or("CORS_ALLOW_ORIGIN", "http://localhost:3000"),
            histogram_bins,
            max_paths,
            max_steps,
            max_transaction_cost_bps,
            parallel_hedging,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
