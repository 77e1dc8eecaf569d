//! Reading data model
//!
//! A `ReadingSet` is a polars DataFrame with one row per (sensor, hour) and a
//! fixed column layout:
//!
//! `sensor_id | timestamp | zone | pm25 | pm10 | no2 | ozone | temperature | humidity`
//!
//! The wrapper validates that layout once (after generation or load) so the
//! analysis code can use the typed accessors without re-checking.

use super::error::{DashboardError, Result};
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

pub const SENSOR_ID: &str = "sensor_id";
pub const TIMESTAMP: &str = "timestamp";
pub const ZONE: &str = "zone";

/// Timestamps are stored at microsecond resolution without a timezone
pub const TIMESTAMP_UNIT: TimeUnit = TimeUnit::Microseconds;

/// Land-use zone of a sensor, fixed for the sensor's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    Industrial,
    Residential,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::Industrial, Zone::Residential];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Industrial => "Industrial",
            Zone::Residential => "Residential",
        }
    }

    /// Position in `Zone::ALL`, used as the categorical palette level
    pub fn level(&self) -> usize {
        match self {
            Zone::Industrial => 0,
            Zone::Residential => 1,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "industrial" => Ok(Zone::Industrial),
            "residential" => Ok(Zone::Residential),
            other => Err(DashboardError::Config(format!(
                "Unknown zone '{}', expected Industrial or Residential",
                other
            ))),
        }
    }
}

/// The six measured quantities, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Pm25,
    Pm10,
    No2,
    Ozone,
    Temperature,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::No2,
        Metric::Ozone,
        Metric::Temperature,
        Metric::Humidity,
    ];

    /// Column name in the frame and the Parquet file
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::No2 => "no2",
            Metric::Ozone => "ozone",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }

    /// Human-readable label for chart axes
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::No2 => "NO2",
            Metric::Ozone => "Ozone",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }
}

/// Validated set of sensor readings, held read-only after load
#[derive(Debug, Clone)]
pub struct ReadingSet {
    frame: DataFrame,
}

impl ReadingSet {
    /// Wrap a DataFrame after checking column names, order, types and nulls
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let expected = expected_schema();
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let expected_names: Vec<&str> = expected.iter().map(|(name, _)| *name).collect();

        if names != expected_names {
            return Err(DashboardError::Schema(format!(
                "expected columns {:?}, found {:?}",
                expected_names, names
            )));
        }

        for (name, dtype) in &expected {
            let column = frame.column(name)?;
            if column.dtype() != dtype {
                return Err(DashboardError::Schema(format!(
                    "column '{}' has type {:?}, expected {:?}",
                    name,
                    column.dtype(),
                    dtype
                )));
            }
            if column.null_count() > 0 {
                return Err(DashboardError::Schema(format!(
                    "column '{}' contains {} null values",
                    name,
                    column.null_count()
                )));
            }
        }

        let zones = frame.column(ZONE)?.str()?;
        for zone in zones.into_iter().flatten() {
            zone.parse::<Zone>()
                .map_err(|_| DashboardError::Schema(format!("invalid zone label '{}'", zone)))?;
        }

        Ok(Self { frame })
    }

    /// Underlying polars frame
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn sensor_ids(&self) -> Result<&StringChunked> {
        Ok(self.frame.column(SENSOR_ID)?.str()?)
    }

    pub fn zone_labels(&self) -> Result<&StringChunked> {
        Ok(self.frame.column(ZONE)?.str()?)
    }

    pub fn metric(&self, metric: Metric) -> Result<&Float32Chunked> {
        Ok(self.frame.column(metric.column())?.f32()?)
    }

    /// Timestamps as microseconds since the Unix epoch
    pub fn timestamps_micros(&self) -> Result<Vec<i64>> {
        let physical = self.frame.column(TIMESTAMP)?.cast(&DataType::Int64)?;
        Ok(physical
            .i64()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    /// Sensor ids in order of first appearance
    pub fn distinct_sensors(&self) -> Result<Vec<String>> {
        let mut seen = std::collections::HashSet::new();
        let mut sensors = Vec::new();
        for id in self.sensor_ids()?.into_iter().flatten() {
            if seen.insert(id) {
                sensors.push(id.to_string());
            }
        }
        Ok(sensors)
    }

    pub fn summary(&self) -> Result<ReadingSummary> {
        let timestamps = self.timestamps_micros()?;
        let pm25 = self.metric(Metric::Pm25)?;
        Ok(ReadingSummary {
            total_rows: self.len(),
            n_sensors: self.distinct_sensors()?.len(),
            first_timestamp: timestamps.iter().copied().min(),
            last_timestamp: timestamps.iter().copied().max(),
            pm25_min: pm25.min().unwrap_or(f32::NAN),
            pm25_max: pm25.max().unwrap_or(f32::NAN),
            estimated_bytes: self.frame.estimated_size(),
        })
    }
}

/// Column names and types of a reading frame, in order
pub fn expected_schema() -> Vec<(&'static str, DataType)> {
    let mut schema = vec![
        (SENSOR_ID, DataType::String),
        (TIMESTAMP, DataType::Datetime(TIMESTAMP_UNIT, None)),
        (ZONE, DataType::String),
    ];
    schema.extend(Metric::ALL.iter().map(|m| (m.column(), DataType::Float32)));
    schema
}

/// Summary statistics for a reading set
#[derive(Debug, Clone)]
pub struct ReadingSummary {
    pub total_rows: usize,
    pub n_sensors: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub pm25_min: f32,
    pub pm25_max: f32,
    pub estimated_bytes: usize,
}

impl fmt::Display for ReadingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = |micros: Option<i64>| {
            micros
                .and_then(chrono::DateTime::from_timestamp_micros)
                .map(|dt| dt.naive_utc().to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        write!(
            f,
            "ReadingSummary {{ rows: {}, sensors: {}, span: [{} .. {}], pm25: [{:.2}, {:.2}], ~{:.1} MB }}",
            self.total_rows,
            self.n_sensors,
            span(self.first_timestamp),
            span(self.last_timestamp),
            self.pm25_min,
            self.pm25_max,
            self.estimated_bytes as f64 / (1024.0 * 1024.0)
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a ReadingSet from explicit rows: (sensor, hour offset, zone, pm25)
    ///
    /// `pm25` is taken verbatim; the other metrics are derived from it with a
    /// per-column scale and offset so that every feature varies across rows.
    pub fn readings_from_rows(rows: &[(&str, i64, Zone, f32)]) -> ReadingSet {
        const BASE_MICROS: i64 = 1_735_689_600_000_000; // 2025-01-01T00:00:00
        const HOUR_MICROS: i64 = 3_600_000_000;

        let sensors: Vec<&str> = rows.iter().map(|r| r.0).collect();
        let timestamps: Vec<i64> = rows.iter().map(|r| BASE_MICROS + r.1 * HOUR_MICROS).collect();
        let zones: Vec<&str> = rows.iter().map(|r| r.2.as_str()).collect();

        let mut columns = vec![
            Series::new(SENSOR_ID.into(), sensors).into_column(),
            Series::new(TIMESTAMP.into(), timestamps)
                .cast(&DataType::Datetime(TIMESTAMP_UNIT, None))
                .unwrap()
                .into_column(),
            Series::new(ZONE.into(), zones).into_column(),
        ];
        for (k, metric) in Metric::ALL.iter().enumerate() {
            let values: Vec<f32> = rows
                .iter()
                .enumerate()
                .map(|(i, r)| match k {
                    0 => r.3,
                    _ => r.3 * (k as f32 + 1.0) + ((i * (k + 3)) % 7) as f32,
                })
                .collect();
            columns.push(Series::new(metric.column().into(), values).into_column());
        }

        ReadingSet::from_frame(DataFrame::new(columns).unwrap()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::readings_from_rows;
    use super::*;

    #[test]
    fn test_zone_parse() {
        assert_eq!("Industrial".parse::<Zone>().unwrap(), Zone::Industrial);
        assert_eq!(" residential ".parse::<Zone>().unwrap(), Zone::Residential);
        assert!("Commercial".parse::<Zone>().is_err());
    }

    #[test]
    fn test_metric_columns_in_order() {
        let names: Vec<&str> = Metric::ALL.iter().map(|m| m.column()).collect();
        assert_eq!(
            names,
            vec!["pm25", "pm10", "no2", "ozone", "temperature", "humidity"]
        );
    }

    #[test]
    fn test_expected_schema_order() {
        let schema = expected_schema();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema[0].0, SENSOR_ID);
        assert_eq!(schema[1].0, TIMESTAMP);
        assert_eq!(schema[2].0, ZONE);
        assert_eq!(schema[3].1, DataType::Float32);
    }

    #[test]
    fn test_from_frame_rejects_missing_column() {
        let df = df! {
            "sensor_id" => ["Sensor_000"],
            "zone" => ["Industrial"]
        }
        .unwrap();
        let err = ReadingSet::from_frame(df).unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn test_from_frame_rejects_wrong_metric_type() {
        let set = readings_from_rows(&[("Sensor_000", 0, Zone::Industrial, 1.0)]);
        let mut df = set.into_frame();
        df.with_column(Series::new("pm25".into(), [1.0f64])).unwrap();
        let err = ReadingSet::from_frame(df).unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn test_distinct_sensors_preserve_first_appearance() {
        let set = readings_from_rows(&[
            ("Sensor_002", 0, Zone::Residential, 1.0),
            ("Sensor_000", 0, Zone::Industrial, 2.0),
            ("Sensor_002", 1, Zone::Residential, 3.0),
        ]);
        assert_eq!(set.distinct_sensors().unwrap(), vec!["Sensor_002", "Sensor_000"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_summary() {
        let set = readings_from_rows(&[
            ("Sensor_000", 0, Zone::Industrial, 4.0),
            ("Sensor_000", 5, Zone::Industrial, 9.0),
        ]);
        let summary = set.summary().unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.n_sensors, 1);
        assert_eq!(summary.pm25_min, 4.0);
        assert_eq!(summary.pm25_max, 9.0);
        assert_eq!(
            summary.last_timestamp.unwrap() - summary.first_timestamp.unwrap(),
            5 * 3_600_000_000
        );
        assert!(summary.to_string().contains("2025-01-01 00:00:00"));
    }
}
