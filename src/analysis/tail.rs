//! Tail statistics of fine particulate for one zone

use super::numeric::percentile;
use crate::dataset::error::{DashboardError, Result};
use crate::dataset::reading::{Metric, ReadingSet, Zone, ZONE};
use polars::prelude::*;

/// Default percentile marked on the tail view
pub const DEFAULT_PERCENTILE: f64 = 99.0;

/// Fine-particulate readings of one zone with their tail percentile
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSample {
    pub zone: Zone,
    /// Unaggregated pm25 values in row order
    pub values: Vec<f64>,
    /// Requested percentile (0-100)
    pub percentile: f64,
    /// Value at `percentile`
    pub percentile_value: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ZoneSample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Percentile of pm25 over the readings of `zone`
///
/// A zone without readings is `NoReadings`, never a NaN percentile.
pub fn zone_tail(readings: &ReadingSet, zone: Zone, p: f64) -> Result<ZoneSample> {
    if !(0.0..=100.0).contains(&p) {
        return Err(DashboardError::Config(format!(
            "Percentile {} out of range [0, 100]",
            p
        )));
    }

    let pm25 = Metric::Pm25.column();
    let filtered = readings
        .frame()
        .clone()
        .lazy()
        .filter(col(ZONE).eq(lit(zone.as_str())))
        .select([col(pm25).cast(DataType::Float64)])
        .collect()?;

    let values: Vec<f64> = filtered
        .column(pm25)?
        .f64()?
        .into_iter()
        .flatten()
        .collect();

    let percentile_value = percentile(&values, p).ok_or_else(|| DashboardError::NoReadings {
        zone: zone.to_string(),
    })?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Ok(ZoneSample {
        zone,
        values,
        percentile: p,
        percentile_value,
        min,
        max,
        mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generator::{GeneratorConfig, SyntheticGenerator};
    use crate::dataset::reading::test_support::readings_from_rows;

    #[test]
    fn test_percentile_of_one_to_hundred() {
        let rows: Vec<(&str, i64, Zone, f32)> = (1..=100)
            .map(|v| ("Sensor_000", v as i64, Zone::Industrial, v as f32))
            .chain([("Sensor_001", 0, Zone::Residential, 1000.0)])
            .collect();
        let set = readings_from_rows(&rows);

        let sample = zone_tail(&set, Zone::Industrial, 99.0).unwrap();
        assert_eq!(sample.len(), 100);
        assert!((sample.percentile_value - 99.01).abs() < 1e-9);
        assert_eq!(sample.min, 1.0);
        assert_eq!(sample.max, 100.0);
        assert!((sample.mean - 50.5).abs() < 1e-9);
        assert!(!sample.values.contains(&1000.0));
    }

    #[test]
    fn test_empty_zone_is_explicit() {
        let set = readings_from_rows(&[("Sensor_000", 0, Zone::Industrial, 5.0)]);
        let err = zone_tail(&set, Zone::Residential, 99.0).unwrap_err();
        match err {
            DashboardError::NoReadings { zone } => assert_eq!(zone, "Residential"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_rejects_out_of_range_percentile() {
        let set = readings_from_rows(&[("Sensor_000", 0, Zone::Industrial, 5.0)]);
        assert!(zone_tail(&set, Zone::Industrial, 120.0).is_err());
    }

    #[test]
    fn test_generated_tail_bounds() {
        let set = SyntheticGenerator::new(GeneratorConfig {
            n_sensors: 4,
            ..Default::default()
        })
        .generate()
        .unwrap();
        let sample = zone_tail(&set, Zone::Industrial, DEFAULT_PERCENTILE).unwrap();
        assert_eq!(sample.len(), 2 * 8760);

        let p98 = percentile(&sample.values, 98.0).unwrap();
        assert!(sample.percentile_value >= p98);
        assert!(sample.percentile_value <= sample.max);

        let residential = zone_tail(&set, Zone::Residential, DEFAULT_PERCENTILE).unwrap();
        assert!(sample.percentile_value > residential.percentile_value);
    }
}
