use crate::config::AppConfig;
use crate::models::black_scholes::BlackScholes;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

// ── Service Counters (lock-free) ──

pub struct ServiceCounters {
    pub simulations_run: AtomicU64,
    pub convergence_runs: AtomicU64,
    pub paths_hedged: AtomicU64,
    pub requests_rejected: AtomicU64,
}

impl ServiceCounters {
    pub fn new() -> Self {
        Self {
            simulations_run: AtomicU64::new(0),
            convergence_runs: AtomicU64::new(0),
            paths_hedged: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn add_paths(&self, n: u64) {
        self.paths_hedged.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            simulations_run: self.simulations_run.load(Ordering::Relaxed),
            convergence_runs: self.convergence_runs.load(Ordering::Relaxed),
            paths_hedged: self.paths_hedged.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CountersSnapshot {
    pub simulations_run: u64,
    pub convergence_runs: u64,
    pub paths_hedged: u64,
    pub requests_rejected: u64,
}

// ── Application shared state (read-only apart from counters) ──

pub struct AppState {
    pub config: AppConfig,
    /// Pricer shared by every request (stateless, Send + Sync)
    pub pricer: BlackScholes,
    pub counters: ServiceCounters,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            pricer: BlackScholes::new(),
            counters: ServiceCounters::new(),
            started_at: Instant::now(),
        })
    }
}
