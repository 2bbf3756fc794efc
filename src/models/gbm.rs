use crate::errors::{LabError, LabResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// A batch of price trajectories, row-major `[n_paths][n_steps + 1]`.
/// Every row starts at the initial spot and has at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct PathBatch {
    n_paths: usize,
    n_points: usize,
    data: Vec<f64>,
}

impl PathBatch {
    /// Build a batch from externally supplied trajectories.
    /// Ragged rows or rows shorter than two points are rejected.
    #[allow(dead_code)]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> LabResult<Self> {
        let n_points = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || n_points < 2 {
            return Err(LabError::invalid(
                "paths must be 2D (n_paths, n_steps+1) with n_steps+1 >= 2",
            ));
        }
        if rows.iter().any(|r| r.len() != n_points) {
            return Err(LabError::invalid("all paths must have the same number of points"));
        }

        let n_paths = rows.len();
        let data = rows.into_iter().flatten().collect();
        Ok(Self { n_paths, n_points, data })
    }

    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_points - 1
    }

    #[inline]
    pub fn path(&self, index: usize) -> &[f64] {
        let start = index * self.n_points;
        &self.data[start..start + self.n_points]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_points)
    }
}

/// Exact GBM under the risk-neutral measure:
///
/// ln S_{k+1} = ln S_k + (r - sigma^2/2)*dt + sigma*sqrt(dt)*Z_k
///
/// Log increments are accumulated then exponentiated, so each one-step
/// transition is exactly lognormal (no Euler error). All normals are drawn
/// up front from one sequential generator, path by path, so a fixed seed
/// always yields the same batch. `None` seeds from OS entropy.
pub fn simulate_paths(
    s0: f64,
    r: f64,
    sigma: f64,
    t: f64,
    n_steps: usize,
    n_paths: usize,
    seed: Option<u64>,
) -> LabResult<PathBatch> {
    if !(s0 > 0.0) || !s0.is_finite() {
        return Err(LabError::invalid("S0 must be > 0"));
    }
    if !(sigma > 0.0) || !sigma.is_finite() {
        return Err(LabError::invalid("sigma must be > 0"));
    }
    if !(t > 0.0) || !t.is_finite() {
        return Err(LabError::invalid("T must be > 0"));
    }
    if !r.is_finite() {
        return Err(LabError::invalid("r must be finite"));
    }
    if n_steps == 0 {
        return Err(LabError::invalid("n_steps must be > 0"));
    }
    if n_paths == 0 {
        return Err(LabError::invalid("n_paths must be > 0"));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let dt = t / n_steps as f64;
    let drift = (r - 0.5 * sigma * sigma) * dt;
    let vol = sigma * dt.sqrt();
    let ln_s0 = s0.ln();

    let n_points = n_steps + 1;
    let mut data = Vec::with_capacity(n_paths * n_points);
    for _ in 0..n_paths {
        data.push(s0);
        let mut log_s = ln_s0;
        for _ in 0..n_steps {
            let z: f64 = StandardNormal.sample(&mut rng);
            log_s += drift + vol * z;
            data.push(log_s.exp());
        }
    }

    tracing::debug!(n_paths, n_steps, seeded = seed.is_some(), "simulated GBM batch");

    Ok(PathBatch { n_paths, n_points, data })
}

/// Single-trajectory convenience over `simulate_paths`.
#[allow(dead_code)]
pub fn simulate_path(
    s0: f64,
    r: f64,
    sigma: f64,
    t: f64,
    n_steps: usize,
    seed: Option<u64>,
) -> LabResult<Vec<f64>> {
    let batch = simulate_paths(s0, r, sigma, t, n_steps, 1, seed)?;
    Ok(batch.path(0).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_and_initial_spot() {
        let batch = simulate_paths(100.0, 0.05, 0.2, 1.0, 12, 7, Some(1)).unwrap();
        assert_eq!(batch.n_paths(), 7);
        assert_eq!(batch.n_steps(), 12);
        for path in batch.iter() {
            assert_eq!(path.len(), 13);
            assert_eq!(path[0], 100.0);
            assert!(path.iter().all(|s| *s > 0.0 && s.is_finite()));
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = simulate_paths(100.0, 0.0, 0.2, 1.0, 50, 20, Some(42)).unwrap();
        let b = simulate_paths(100.0, 0.0, 0.2, 1.0, 50, 20, Some(42)).unwrap();
        let c = simulate_paths(100.0, 0.0, 0.2, 1.0, 50, 20, Some(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_single_path_matches_batch_head() {
        let batch = simulate_paths(100.0, 0.01, 0.3, 0.5, 25, 3, Some(9)).unwrap();
        let single = simulate_path(100.0, 0.01, 0.3, 0.5, 25, Some(9)).unwrap();
        assert_eq!(single.as_slice(), batch.path(0));
    }

    #[test]
    fn test_terminal_mean_is_forward() {
        // E[S_T] = S0 * exp(rT) under the risk-neutral measure
        let (s0, r, t) = (100.0, 0.05, 1.0);
        let batch = simulate_paths(s0, r, 0.2, t, 4, 40_000, Some(7)).unwrap();
        let mean_st = batch.iter().map(|p| p[4]).sum::<f64>() / batch.n_paths() as f64;
        assert_relative_eq!(mean_st, s0 * (r * t).exp(), max_relative = 0.01);
    }

    #[test]
    fn test_log_increment_variance() {
        let (sigma, t, n_steps) = (0.25, 2.0, 10);
        let batch = simulate_paths(50.0, 0.0, sigma, t, n_steps, 5_000, Some(3)).unwrap();
        let incs: Vec<f64> = batch
            .iter()
            .flat_map(|p| p.windows(2).map(|w| (w[1] / w[0]).ln()).collect::<Vec<_>>())
            .collect();
        let n = incs.len() as f64;
        let mean = incs.iter().sum::<f64>() / n;
        let var = incs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let dt = t / n_steps as f64;
        assert_relative_eq!(var, sigma * sigma * dt, max_relative = 0.03);
        assert_relative_eq!(mean, -0.5 * sigma * sigma * dt, epsilon = 0.003);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(simulate_paths(0.0, 0.0, 0.2, 1.0, 10, 10, None).is_err());
        assert!(simulate_paths(100.0, 0.0, 0.0, 1.0, 10, 10, None).is_err());
        assert!(simulate_paths(100.0, 0.0, 0.2, -1.0, 10, 10, None).is_err());
        assert!(simulate_paths(100.0, 0.0, 0.2, 1.0, 0, 10, None).is_err());
        assert!(simulate_paths(100.0, 0.0, 0.2, 1.0, 10, 0, None).is_err());
    }

    #[test]
    fn test_from_rows_validates_shape() {
        assert!(PathBatch::from_rows(vec![]).is_err());
        assert!(PathBatch::from_rows(vec![vec![100.0]]).is_err());
        assert!(PathBatch::from_rows(vec![vec![100.0, 101.0], vec![100.0]]).is_err());

        let batch = PathBatch::from_rows(vec![vec![100.0, 101.0, 99.0], vec![100.0, 98.0, 97.0]]).unwrap();
        assert_eq!(batch.n_paths(), 2);
        assert_eq!(batch.n_steps(), 2);
        assert_eq!(batch.path(1), &[100.0, 98.0, 97.0]);
    }
}
