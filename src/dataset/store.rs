//! Reading set persistence
//!
//! The dataset cache is an injected dependency: anything implementing
//! `ReadingStore` can back `load_or_generate`. `ParquetStore` is the on-disk
//! cache used by the binaries; `MemoryStore` keeps the set in process for
//! tests.

use super::error::Result;
use super::generator::SyntheticGenerator;
use super::reading::ReadingSet;
use polars::prelude::*;
use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the cached dataset
pub const DEFAULT_DATA_PATH: &str = "data/sensor_data.parquet";

/// Storage backend for the reading set
pub trait ReadingStore {
    /// Load the stored set, `None` if nothing has been stored yet
    fn load(&self) -> Result<Option<ReadingSet>>;

    /// Persist the set, replacing any previous one
    fn save(&self, readings: &ReadingSet) -> Result<()>;

    /// Description of where the set lives (for logs)
    fn location(&self) -> String;
}

/// Return the stored set, or generate, persist and return a fresh one
///
/// A failed write fails the whole load.
pub fn load_or_generate<S: ReadingStore + ?Sized>(
    store: &S,
    generator: &SyntheticGenerator,
) -> Result<ReadingSet> {
    if let Some(readings) = store.load()? {
        info!(
            "Loaded {} readings from {}",
            readings.len(),
            store.location()
        );
        return Ok(readings);
    }

    info!("No cached dataset at {}, generating", store.location());
    let readings = generator.generate()?;
    store.save(&readings)?;
    info!("Saved {} readings to {}", readings.len(), store.location());
    Ok(readings)
}

/// Single Parquet file on disk
#[derive(Debug, Clone)]
pub struct ParquetStore {
    path: PathBuf,
}

impl ParquetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

impl ReadingStore for ParquetStore {
    fn load(&self) -> Result<Option<ReadingSet>> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let frame = ParquetReader::new(file).finish()?;
        debug!(
            "Read {} rows × {} columns from {}",
            frame.height(),
            frame.width(),
            self.path.display()
        );

        ReadingSet::from_frame(frame).map(Some)
    }

    fn save(&self, readings: &ReadingSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut frame = readings.frame().clone();
        let file = File::create(&self.path)?;
        let bytes = ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut frame)?;
        debug!("Wrote {} bytes to {}", bytes, self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store, empty until the first save
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RefCell<Option<ReadingSet>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `readings`
    pub fn with_readings(readings: ReadingSet) -> Self {
        Self {
            readings: RefCell::new(Some(readings)),
            saves: RefCell::new(0),
        }
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl ReadingStore for MemoryStore {
    fn load(&self) -> Result<Option<ReadingSet>> {
        Ok(self.readings.borrow().clone())
    }

    fn save(&self, readings: &ReadingSet) -> Result<()> {
        *self.readings.borrow_mut() = Some(readings.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::error::DashboardError;
    use crate::dataset::generator::GeneratorConfig;
    use crate::dataset::reading::{Metric, TIMESTAMP};

    fn small_generator() -> SyntheticGenerator {
        SyntheticGenerator::new(GeneratorConfig {
            n_sensors: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_memory_store_generates_once() {
        let store = MemoryStore::new();
        let generator = small_generator();

        let first = load_or_generate(&store, &generator).unwrap();
        assert_eq!(store.save_count(), 1);

        let second = load_or_generate(&store, &generator).unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(first.frame().equals(second.frame()));
    }

    #[test]
    fn test_memory_store_returns_existing_readings() {
        let readings = small_generator().generate().unwrap();
        let store = MemoryStore::with_readings(readings.clone());
        let other = SyntheticGenerator::new(GeneratorConfig {
            seed: 1,
            n_sensors: 2,
            ..Default::default()
        });
        let loaded = load_or_generate(&store, &other).unwrap();
        assert!(loaded.frame().equals(readings.frame()));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParquetStore::new(dir.path().join("nested").join("sensor_data.parquet"));
        assert!(store.load().unwrap().is_none());

        let generated = load_or_generate(&store, &small_generator()).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), generated.len());
        assert_eq!(
            loaded.frame().get_column_names(),
            generated.frame().get_column_names()
        );
        assert_eq!(
            loaded.frame().column(TIMESTAMP).unwrap().dtype(),
            generated.frame().column(TIMESTAMP).unwrap().dtype()
        );
        for metric in Metric::ALL {
            assert!(loaded
                .metric(metric)
                .unwrap()
                .equal(generated.metric(metric).unwrap())
                .all());
        }
        assert!(loaded.frame().equals(generated.frame()));
    }

    #[test]
    fn test_parquet_store_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.parquet");
        let mut df = df! { "a" => [1i32, 2, 3] }.unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let err = ParquetStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
    }

    #[test]
    fn test_parquet_store_write_failure_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let store = ParquetStore::new(blocker.join("sensor_data.parquet"));

        let err = load_or_generate(&store, &small_generator()).unwrap_err();
        assert!(matches!(err, DashboardError::Io(_)));
    }
}
