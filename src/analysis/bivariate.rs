//! Per-sensor bivariate summary for the small-multiples view
//!
//! Mean fine particulate and temperature per sensor, plus a synthetic
//! population density. The density is a presentation stand-in, not a
//! measured covariate; it is drawn from a seeded RNG so repeated renders
//! match.

use crate::dataset::error::{DashboardError, Result};
use crate::dataset::reading::{Metric, ReadingSet, Zone, SENSOR_ID, ZONE};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Range of the synthetic population density, `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityRange {
    pub min: u32,
    pub max: u32,
}

impl Default for DensityRange {
    fn default() -> Self {
        Self {
            min: 1_000,
            max: 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BivariateRecord {
    pub zone: Zone,
    pub sensor_id: String,
    pub mean_pm25: f64,
    pub mean_temperature: f64,
    pub population_density: u32,
}

/// One record per sensor ordered by zone, then sensor id
pub fn bivariate_mapping(
    readings: &ReadingSet,
    seed: u64,
    range: DensityRange,
) -> Result<Vec<BivariateRecord>> {
    if range.min >= range.max {
        return Err(DashboardError::Config(format!(
            "Empty population density range [{}, {})",
            range.min, range.max
        )));
    }

    let pm25 = Metric::Pm25.column();
    let temperature = Metric::Temperature.column();

    let grouped = readings
        .frame()
        .clone()
        .lazy()
        .group_by([col(ZONE), col(SENSOR_ID)])
        .agg([
            col(pm25).cast(DataType::Float64).mean(),
            col(temperature).cast(DataType::Float64).mean(),
        ])
        .collect()?;

    let zones = grouped.column(ZONE)?.str()?;
    let sensors = grouped.column(SENSOR_ID)?.str()?;
    let pm25_means = grouped.column(pm25)?.f64()?;
    let temp_means = grouped.column(temperature)?.f64()?;

    let mut records = Vec::with_capacity(grouped.height());
    for (((zone, sensor), pm), temp) in zones
        .into_iter()
        .zip(sensors.into_iter())
        .zip(pm25_means.into_iter())
        .zip(temp_means.into_iter())
    {
        records.push(BivariateRecord {
            zone: zone.unwrap_or_default().parse()?,
            sensor_id: sensor.unwrap_or_default().to_string(),
            mean_pm25: pm.unwrap_or(f64::NAN),
            mean_temperature: temp.unwrap_or(f64::NAN),
            population_density: 0,
        });
    }

    records.sort_by(|a, b| (a.zone, &a.sensor_id).cmp(&(b.zone, &b.sensor_id)));

    let mut rng = StdRng::seed_from_u64(seed);
    for record in &mut records {
        record.population_density = rng.gen_range(range.min..range.max);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::reading::test_support::readings_from_rows;

    fn sample_set() -> ReadingSet {
        readings_from_rows(&[
            ("Sensor_003", 0, Zone::Residential, 8.0),
            ("Sensor_000", 0, Zone::Industrial, 30.0),
            ("Sensor_000", 1, Zone::Industrial, 50.0),
            ("Sensor_002", 0, Zone::Residential, 12.0),
            ("Sensor_001", 0, Zone::Industrial, 44.0),
        ])
    }

    #[test]
    fn test_one_record_per_sensor_sorted() {
        let records = bivariate_mapping(&sample_set(), 7, DensityRange::default()).unwrap();
        let keys: Vec<(Zone, &str)> = records
            .iter()
            .map(|r| (r.zone, r.sensor_id.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Zone::Industrial, "Sensor_000"),
                (Zone::Industrial, "Sensor_001"),
                (Zone::Residential, "Sensor_002"),
                (Zone::Residential, "Sensor_003"),
            ]
        );
        assert!((records[0].mean_pm25 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_is_seeded_and_in_range() {
        let a = bivariate_mapping(&sample_set(), 7, DensityRange::default()).unwrap();
        let b = bivariate_mapping(&sample_set(), 7, DensityRange::default()).unwrap();
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|r| (1_000..50_000).contains(&r.population_density)));

        let c = bivariate_mapping(&sample_set(), 8, DensityRange::default()).unwrap();
        let densities = |rs: &[BivariateRecord]| {
            rs.iter().map(|r| r.population_density).collect::<Vec<_>>()
        };
        assert_ne!(densities(&a), densities(&c));
    }

    #[test]
    fn test_rejects_empty_range() {
        let err = bivariate_mapping(&sample_set(), 7, DensityRange { min: 5, max: 5 });
        assert!(err.is_err());
    }
}
