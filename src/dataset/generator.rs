//! Synthetic reading generator
//!
//! Builds the full sensor × hour cross product for one calendar year and fills
//! the six metrics from fixed distributions. Industrial sensors are scaled up
//! on the pollutant metrics, and a small random subset of rows receives an
//! extreme fine-particulate spike for tail analysis.
//!
//! All draws come from one `StdRng` seeded from the config, column by column,
//! so the same config always yields the same set.

use super::error::{DashboardError, Result};
use super::reading::{Metric, ReadingSet, Zone, SENSOR_ID, TIMESTAMP, TIMESTAMP_UNIT, ZONE};
use chrono::NaiveDate;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma, LogNormal, Normal};
use std::f64::consts::PI;
use tracing::{debug, info};

const HOUR_MICROS: i64 = 3_600_000_000;

/// Pollutant multipliers applied to Industrial rows
pub const INDUSTRIAL_PM25_FACTOR: f64 = 2.5;
pub const INDUSTRIAL_PM10_FACTOR: f64 = 2.0;
pub const INDUSTRIAL_NO2_FACTOR: f64 = 3.0;

/// Generator parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Number of sensors; the first half are Industrial
    pub n_sensors: usize,
    /// Calendar year covered hourly (8760 hours, 8784 in leap years)
    pub year: i32,
    /// Fraction of all rows that receive an extreme spike
    pub extreme_fraction: f64,
    /// Amount added to pm25 on spiked rows
    pub extreme_magnitude: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_sensors: 100,
            year: 2025,
            extreme_fraction: 0.001,
            extreme_magnitude: 200.0,
        }
    }
}

/// Identifier of the sensor at `index`
pub fn sensor_id(index: usize) -> String {
    format!("Sensor_{:03}", index)
}

/// Zone of the sensor at `index` among `n_sensors`
pub fn zone_for_index(index: usize, n_sensors: usize) -> Zone {
    if index < n_sensors / 2 {
        Zone::Industrial
    } else {
        Zone::Residential
    }
}

/// Produces a deterministic ReadingSet
#[derive(Debug, Clone, Default)]
pub struct SyntheticGenerator {
    config: GeneratorConfig,
}

impl SyntheticGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Hourly timestamps (µs since epoch) covering the configured year
    pub fn hourly_timestamps(&self) -> Result<Vec<i64>> {
        let start = year_start_micros(self.config.year)?;
        let end = year_start_micros(self.config.year + 1)?;
        Ok((start..end).step_by(HOUR_MICROS as usize).collect())
    }

    /// Number of rows that receive the extreme spike for a set of `n_rows`
    pub fn extreme_count(&self, n_rows: usize) -> usize {
        (n_rows as f64 * self.config.extreme_fraction).floor() as usize
    }

    pub fn generate(&self) -> Result<ReadingSet> {
        let cfg = &self.config;
        if !(0.0..=1.0).contains(&cfg.extreme_fraction) {
            return Err(DashboardError::Distribution(format!(
                "Extreme-event fraction {} outside [0, 1]",
                cfg.extreme_fraction
            )));
        }
        let timestamps = self.hourly_timestamps()?;
        let n_hours = timestamps.len();
        let n_rows = cfg.n_sensors * n_hours;

        info!(
            "Generating synthetic readings: {} sensors × {} hours = {} rows (seed {})",
            cfg.n_sensors, n_hours, n_rows, cfg.seed
        );

        let mut rng = StdRng::seed_from_u64(cfg.seed);

        let gamma = Gamma::new(2.0, 10.0).map_err(distribution_error)?;
        let pm10_noise = Normal::new(0.0, 5.0).map_err(distribution_error)?;
        let lognormal = LogNormal::new(2.0, 0.5).map_err(distribution_error)?;
        let ozone_dist = Normal::new(40.0, 10.0).map_err(distribution_error)?;
        let temp_noise = Normal::new(0.0, 2.0).map_err(distribution_error)?;
        let humidity_noise = Normal::new(0.0, 5.0).map_err(distribution_error)?;

        let mut pm25: Vec<f64> = (0..n_rows).map(|_| gamma.sample(&mut rng)).collect();
        let mut pm10: Vec<f64> = pm25
            .iter()
            .map(|v| v * 1.5 + pm10_noise.sample(&mut rng))
            .collect();
        let mut no2: Vec<f64> = (0..n_rows).map(|_| lognormal.sample(&mut rng)).collect();
        let ozone: Vec<f64> = (0..n_rows).map(|_| ozone_dist.sample(&mut rng)).collect();

        // Seasonal curves: one full period over the year, keyed by hour of year
        let phase = |row: usize| 2.0 * PI * (row % n_hours) as f64 / n_hours as f64;
        let temperature: Vec<f64> = (0..n_rows)
            .map(|row| 20.0 + 10.0 * phase(row).sin() + temp_noise.sample(&mut rng))
            .collect();
        let humidity: Vec<f64> = (0..n_rows)
            .map(|row| 50.0 + 10.0 * phase(row).cos() + humidity_noise.sample(&mut rng))
            .collect();

        let mut sensor_col = Vec::with_capacity(n_rows);
        let mut zone_col = Vec::with_capacity(n_rows);
        let mut time_col = Vec::with_capacity(n_rows);

        for sensor in 0..cfg.n_sensors {
            let id = sensor_id(sensor);
            let zone = zone_for_index(sensor, cfg.n_sensors);
            let start = sensor * n_hours;

            if zone == Zone::Industrial {
                for row in start..start + n_hours {
                    pm25[row] *= INDUSTRIAL_PM25_FACTOR;
                    pm10[row] *= INDUSTRIAL_PM10_FACTOR;
                    no2[row] *= INDUSTRIAL_NO2_FACTOR;
                }
            }

            for ts in &timestamps {
                sensor_col.push(id.clone());
                zone_col.push(zone.as_str());
                time_col.push(*ts);
            }
        }

        let n_extreme = self.extreme_count(n_rows);
        if n_extreme > 0 {
            let spiked = rand::seq::index::sample(&mut rng, n_rows, n_extreme);
            for row in spiked.iter() {
                pm25[row] += cfg.extreme_magnitude;
            }
        }
        debug!("Injected {} extreme events", n_extreme);

        let mut columns = vec![
            Series::new(SENSOR_ID.into(), sensor_col).into_column(),
            Series::new(TIMESTAMP.into(), time_col)
                .cast(&DataType::Datetime(TIMESTAMP_UNIT, None))?
                .into_column(),
            Series::new(ZONE.into(), zone_col).into_column(),
        ];

        // Downcast every metric to f32 to bound memory
        let metrics = [pm25, pm10, no2, ozone, temperature, humidity];
        for (metric, values) in Metric::ALL.iter().zip(metrics) {
            let values: Vec<f32> = values.into_iter().map(|v| v as f32).collect();
            columns.push(Series::new(metric.column().into(), values).into_column());
        }

        ReadingSet::from_frame(DataFrame::new(columns)?)
    }
}

fn year_start_micros(year: i32) -> Result<i64> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_micros())
        .ok_or_else(|| DashboardError::Config(format!("Invalid year {}", year)))
}

fn distribution_error(e: impl std::fmt::Display) -> DashboardError {
    DashboardError::Distribution(e.to_string())
}
