//! Urban environmental dashboard - main entry point
//!
//! Loads (or generates and caches) the sensor dataset, runs the analyses and
//! writes the interactive HTML report. Settings come from
//! `dashboard_config.json` in the working directory when present.

use anyhow::Context;
use tracing::info;
use urban_env_dashboard::dataset::ParquetStore;
use urban_env_dashboard::{init_tracing, pipeline, DashboardConfig};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Urban Environmental Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let store = ParquetStore::new(config.data_path.clone());

    let report = pipeline::build_report(&store, &config).with_context(|| {
        format!(
            "Failed to build dashboard from {}",
            config.data_path.display()
        )
    })?;

    report
        .write_html(&config.report_path)
        .with_context(|| format!("Failed to write {}", config.report_path.display()))?;

    info!("Dashboard ready: {}", config.report_path.display());
    Ok(())
}
