use thiserror::Error;

/// Errors raised while building, caching, analysing or rendering sensor data
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Columnar frame or Parquet error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Filesystem error (cache file, report output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart or configuration JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A loaded dataset does not have the reading columns and types
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error (malformed config file, unknown zone label, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid parameters for a random distribution
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// Dimensionality reduction needs at least as many sensors as components
    #[error("Insufficient sensors: found {found}, need at least {required}")]
    InsufficientSensors { found: usize, required: usize },

    /// A zone filter matched no readings
    #[error("No readings for zone '{zone}'")]
    NoReadings { zone: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
