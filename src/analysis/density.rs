//! Sensor × day density grid
//!
//! Pivots fine particulate into a sensor × timestamp matrix (mean on repeated
//! timestamps) and resamples the time axis to calendar days by averaging the
//! hourly values of each day.

use crate::dataset::error::Result;
use crate::dataset::reading::{Metric, ReadingSet, SENSOR_ID, TIMESTAMP};
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

const DAY: &str = "day";
const SECONDS_PER_DAY: i64 = 86_400;

/// Daily mean fine particulate per sensor
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    /// Row labels, in sensor insertion order
    pub sensor_ids: Vec<String>,
    /// Column labels, chronological calendar days
    pub days: Vec<NaiveDate>,
    /// `values[row][col]`; NaN where a sensor has no reading that day
    pub values: Vec<Vec<f64>>,
}

impl DensityGrid {
    pub fn n_rows(&self) -> usize {
        self.sensor_ids.len()
    }

    pub fn n_cols(&self) -> usize {
        self.days.len()
    }

    /// Smallest and largest finite cell value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn epoch_day_to_date(day: i32) -> NaiveDate {
    DateTime::from_timestamp(day as i64 * SECONDS_PER_DAY, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Build the daily density grid of fine particulate
pub fn daily_density(readings: &ReadingSet) -> Result<DensityGrid> {
    let pm25 = Metric::Pm25.column();

    // Mean per (sensor, timestamp), then mean of those per (sensor, day)
    let daily = readings
        .frame()
        .clone()
        .lazy()
        .group_by_stable([col(SENSOR_ID), col(TIMESTAMP)])
        .agg([col(pm25).cast(DataType::Float64).mean()])
        .with_column(col(TIMESTAMP).dt().date().alias(DAY))
        .group_by_stable([col(SENSOR_ID), col(DAY)])
        .agg([col(pm25).mean()])
        .with_column(col(DAY).cast(DataType::Int32))
        .collect()?;

    let sensor_ids = readings.distinct_sensors()?;
    let day_numbers = daily.column(DAY)?.i32()?;
    let (first_day, last_day) = match (day_numbers.min(), day_numbers.max()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Ok(DensityGrid {
                sensor_ids,
                days: Vec::new(),
                values: Vec::new(),
            })
        }
    };

    // Every calendar day between the first and the last reading gets a column
    let days: Vec<NaiveDate> = (first_day..=last_day).map(epoch_day_to_date).collect();
    let mut values = vec![vec![f64::NAN; days.len()]; sensor_ids.len()];

    let row_of: HashMap<&str, usize> = sensor_ids
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();
    let sensors = daily.column(SENSOR_ID)?.str()?;
    let means = daily.column(pm25)?.f64()?;
    for ((sensor, day), mean) in sensors.into_iter().zip(day_numbers).zip(means) {
        let (Some(sensor), Some(day), Some(mean)) = (sensor, day, mean) else {
            continue;
        };
        if let Some(&row) = row_of.get(sensor) {
            values[row][(day - first_day) as usize] = mean;
        }
    }

    debug!(
        "Density grid: {} sensors × {} days",
        sensor_ids.len(),
        days.len()
    );

    Ok(DensityGrid {
        sensor_ids,
        days,
        values,
    })
}
