//! Sensor dataset module
//!
//! Structure:
//! - `reading.rs`: Reading data model (`ReadingSet`, `Zone`, `Metric`)
//! - `generator.rs`: Deterministic synthetic data generator
//! - `store.rs`: `ReadingStore` trait, Parquet and in-memory stores
//! - `error.rs`: Error types

pub mod error;
pub mod generator;
pub mod reading;
pub mod store;

pub use error::{DashboardError, Result};
pub use generator::{GeneratorConfig, SyntheticGenerator};
pub use reading::{Metric, ReadingSet, ReadingSummary, Zone};
pub use store::{load_or_generate, MemoryStore, ParquetStore, ReadingStore};
