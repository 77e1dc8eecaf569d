//! Analysis transforms over a loaded `ReadingSet`
//!
//! Each transform is a pure function of the readings (plus explicit seeds and
//! parameters); results are recomputed on every render.
//!
//! - `projection`: per-sensor PCA (two components, loadings, variance ratios)
//! - `density`: sensor × day mean fine particulate
//! - `tail`: per-zone fine-particulate percentile
//! - `bivariate`: per-sensor means with a seeded synthetic population density
//! - `numeric`: scaling, PCA and percentile primitives

pub mod bivariate;
pub mod density;
pub mod numeric;
pub mod projection;
pub mod tail;

pub use bivariate::{bivariate_mapping, BivariateRecord, DensityRange};
pub use density::{daily_density, DensityGrid};
pub use numeric::{percentile, DimensionReducer, EigenPca, Reduction, Standardizer, ZScoreScaler};
pub use projection::{
    project_sensors, project_sensors_with, LoadingVector, ProjectionRecord, ProjectionResult,
};
pub use tail::{zone_tail, ZoneSample, DEFAULT_PERCENTILE};
