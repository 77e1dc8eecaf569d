//! Urban environmental dashboard library
//!
//! Module organization:
//! - `dataset`: reading model, synthetic generator, Parquet cache
//! - `analysis`: PCA, density grid, tail statistics, bivariate mapping
//! - `render`: Plotly figures, palettes, HTML report
//! - `config` / `properties`: dashboard.json property defaults and user overrides
//! - `pipeline`: load → analyse → render, shared by the binaries

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod memprof;
pub mod pipeline;
pub mod properties;
pub mod render;

pub use config::DashboardConfig;
pub use dataset::{DashboardError, Result};

/// Install the stderr log subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
