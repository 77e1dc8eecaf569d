//! Numerical primitives behind the analysis transforms
//!
//! Scaling, dimensionality reduction and percentiles are capability traits so
//! a transform can be driven by any implementation. The defaults are a
//! z-score scaler, an eigen-decomposition PCA (nalgebra) and the linear
//! interpolation percentile.

use crate::dataset::error::{DashboardError, Result};
use nalgebra::{DMatrix, SymmetricEigen};

/// Column-wise feature scaling
pub trait Standardizer {
    /// Scale each column of `matrix` (rows = observations)
    fn standardize(&self, matrix: &DMatrix<f64>) -> DMatrix<f64>;
}

/// Output of a dimensionality reduction
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Observations projected onto the retained components (n × k)
    pub projection: DMatrix<f64>,
    /// Coefficient of each feature on each component (features × k)
    pub loadings: DMatrix<f64>,
    /// Fraction of total variance captured by each component
    pub variance_ratios: Vec<f64>,
}

/// Reduce a feature matrix to `k` derived axes
pub trait DimensionReducer {
    fn reduce(&self, matrix: &DMatrix<f64>, k: usize) -> Result<Reduction>;
}

/// Zero mean, unit population variance per column
///
/// Constant columns are only centered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreScaler;

impl Standardizer for ZScoreScaler {
    fn standardize(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        let n = matrix.nrows();
        let mut scaled = matrix.clone();
        if n == 0 {
            return scaled;
        }

        for j in 0..matrix.ncols() {
            let column = matrix.column(j);
            let mean = column.sum() / n as f64;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let std = variance.sqrt();
            let scale = if std > f64::EPSILON { std } else { 1.0 };

            for i in 0..n {
                scaled[(i, j)] = (matrix[(i, j)] - mean) / scale;
            }
        }
        scaled
    }
}

/// Principal component analysis via the symmetric eigen-decomposition of the
/// sample covariance matrix
///
/// Components are ordered by descending eigenvalue. Each component is
/// oriented so that its largest-magnitude loading is positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct EigenPca;

impl DimensionReducer for EigenPca {
    fn reduce(&self, matrix: &DMatrix<f64>, k: usize) -> Result<Reduction> {
        let (n, p) = matrix.shape();
        if n < k.max(2) {
            return Err(DashboardError::InsufficientSensors {
                found: n,
                required: k.max(2),
            });
        }
        if k > p {
            return Err(DashboardError::Other(format!(
                "Cannot retain {} components from {} features",
                k, p
            )));
        }

        // Center columns (no-op for standardized input)
        let means: Vec<f64> = (0..p).map(|j| matrix.column(j).mean()).collect();
        let centered = DMatrix::from_fn(n, p, |i, j| matrix[(i, j)] - means[j]);

        let covariance = (centered.transpose() * &centered) / (n as f64 - 1.0);
        let eigen = SymmetricEigen::new(covariance);

        let eigenvalues: Vec<f64> = eigen.eigenvalues.iter().map(|v| v.max(0.0)).collect();
        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let total: f64 = eigenvalues.iter().sum();
        let mut loadings = DMatrix::zeros(p, k);
        let mut variance_ratios = Vec::with_capacity(k);

        for (c, &idx) in order.iter().take(k).enumerate() {
            let vector = eigen.eigenvectors.column(idx);
            let pivot = vector
                .iter()
                .copied()
                .max_by(|a, b| a.abs().total_cmp(&b.abs()))
                .unwrap_or(1.0);
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for f in 0..p {
                loadings[(f, c)] = vector[f] * sign;
            }
            variance_ratios.push(if total > 0.0 {
                eigenvalues[idx] / total
            } else {
                0.0
            });
        }

        let projection = &centered * &loadings;

        Ok(Reduction {
            projection,
            loadings,
            variance_ratios,
        })
    }
}

/// Percentile with linear interpolation between closest ranks
///
/// `p` is in [0, 100]; the rank is `p / 100 * (n - 1)` over the sorted
/// values. Returns `None` for an empty sequence or a `p` outside [0, 100].
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}
