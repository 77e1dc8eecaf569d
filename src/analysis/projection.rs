//! Sensor-level dimensionality reduction
//!
//! Collapses the hourly readings to one mean feature vector per sensor,
//! standardizes the six features and projects the sensors onto the top two
//! principal components.

use super::numeric::{DimensionReducer, EigenPca, Reduction, Standardizer, ZScoreScaler};
use crate::dataset::error::{DashboardError, Result};
use crate::dataset::reading::{Metric, ReadingSet, Zone, SENSOR_ID, ZONE};
use nalgebra::DMatrix;
use polars::prelude::*;
use tracing::debug;

/// Number of retained components
pub const N_COMPONENTS: usize = 2;

/// One sensor projected onto the two components
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRecord {
    pub sensor_id: String,
    pub zone: Zone,
    pub pc1: f64,
    pub pc2: f64,
}

/// Contribution of one original feature to each component
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingVector {
    pub metric: Metric,
    pub pc1: f64,
    pub pc2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    pub records: Vec<ProjectionRecord>,
    pub loadings: Vec<LoadingVector>,
    /// Explained variance ratio of PC1 and PC2
    pub variance_ratios: [f64; N_COMPONENTS],
}

/// Per-sensor mean of each metric, in first-appearance order
#[derive(Debug, Clone)]
pub struct SensorFeatures {
    pub sensor_ids: Vec<String>,
    pub zones: Vec<Zone>,
    /// sensors × metrics, columns in `Metric::ALL` order
    pub matrix: DMatrix<f64>,
}

/// Group readings by (sensor, zone) and average the six metrics
pub fn sensor_features(readings: &ReadingSet) -> Result<SensorFeatures> {
    let aggregations: Vec<Expr> = Metric::ALL
        .iter()
        .map(|m| col(m.column()).cast(DataType::Float64).mean())
        .collect();

    let grouped = readings
        .frame()
        .clone()
        .lazy()
        .group_by_stable([col(SENSOR_ID), col(ZONE)])
        .agg(aggregations)
        .collect()?;

    let sensor_ids: Vec<String> = grouped
        .column(SENSOR_ID)?
        .str()?
        .into_iter()
        .map(|s| s.unwrap_or_default().to_string())
        .collect();
    let zones = grouped
        .column(ZONE)?
        .str()?
        .into_iter()
        .map(|z| z.unwrap_or_default().parse::<Zone>())
        .collect::<Result<Vec<_>>>()?;

    let n = grouped.height();
    let mut matrix = DMatrix::zeros(n, Metric::ALL.len());
    for (j, metric) in Metric::ALL.iter().enumerate() {
        let means = grouped.column(metric.column())?.f64()?;
        for (i, value) in means.into_iter().enumerate() {
            matrix[(i, j)] = value.unwrap_or(f64::NAN);
        }
    }

    Ok(SensorFeatures {
        sensor_ids,
        zones,
        matrix,
    })
}

/// Run the projection with the default scaler and reducer
pub fn project_sensors(readings: &ReadingSet) -> Result<ProjectionResult> {
    project_sensors_with(readings, &ZScoreScaler, &EigenPca)
}

/// Run the projection with caller-supplied numerical primitives
pub fn project_sensors_with<S, R>(
    readings: &ReadingSet,
    scaler: &S,
    reducer: &R,
) -> Result<ProjectionResult>
where
    S: Standardizer + ?Sized,
    R: DimensionReducer + ?Sized,
{
    let features = sensor_features(readings)?;
    if features.sensor_ids.len() < N_COMPONENTS {
        return Err(DashboardError::InsufficientSensors {
            found: features.sensor_ids.len(),
            required: N_COMPONENTS,
        });
    }

    let standardized = scaler.standardize(&features.matrix);
    let reduction = reducer.reduce(&standardized, N_COMPONENTS)?;
    check_reduction_shape(&reduction, features.sensor_ids.len(), Metric::ALL.len())?;

    debug!(
        "Projected {} sensors, explained variance {:?}",
        features.sensor_ids.len(),
        reduction.variance_ratios
    );

    let records = features
        .sensor_ids
        .into_iter()
        .zip(features.zones)
        .enumerate()
        .map(|(i, (sensor_id, zone))| ProjectionRecord {
            sensor_id,
            zone,
            pc1: reduction.projection[(i, 0)],
            pc2: reduction.projection[(i, 1)],
        })
        .collect();

    let loadings = Metric::ALL
        .iter()
        .enumerate()
        .map(|(f, metric)| LoadingVector {
            metric: *metric,
            pc1: reduction.loadings[(f, 0)],
            pc2: reduction.loadings[(f, 1)],
        })
        .collect();

    Ok(ProjectionResult {
        records,
        loadings,
        variance_ratios: [reduction.variance_ratios[0], reduction.variance_ratios[1]],
    })
}

/// Reject a reduction that does not cover every sensor, feature and component
fn check_reduction_shape(reduction: &Reduction, n_sensors: usize, n_features: usize) -> Result<()> {
    let expected = [
        ("projection", reduction.projection.shape(), (n_sensors, N_COMPONENTS)),
        ("loadings", reduction.loadings.shape(), (n_features, N_COMPONENTS)),
    ];
    for (name, found, required) in expected {
        if found.0 != required.0 || found.1 < required.1 {
            return Err(DashboardError::Other(format!(
                "Reducer returned {} of shape {:?}, expected {:?}",
                name, found, required
            )));
        }
    }
    if reduction.variance_ratios.len() < N_COMPONENTS {
        return Err(DashboardError::Other(format!(
            "Reducer returned {} variance ratios, expected {}",
            reduction.variance_ratios.len(),
            N_COMPONENTS
        )));
    }
    Ok(())
}
