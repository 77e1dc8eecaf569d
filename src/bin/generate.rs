//! generate - Builds the cached sensor dataset without rendering a report.
//!
//! Uses the configured path and seed unless overridden. An existing cache is
//! kept as-is unless `--force` is given.
//!
//! Usage:
//! ```bash
//! cargo run --bin generate
//! cargo run --bin generate -- --force --path data/sensor_data.parquet --seed 7
//! ```

use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing::info;
use urban_env_dashboard::dataset::{load_or_generate, ParquetStore, ReadingStore, SyntheticGenerator};
use urban_env_dashboard::{init_tracing, DashboardConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let mut path = config.data_path.clone();
    let mut generator_config = config.generator.clone();
    let mut force = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--force" | "-f" => {
                force = true;
                i += 1;
            }
            "--path" | "-p" if i + 1 < args.len() => {
                path = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "--seed" | "-s" if i + 1 < args.len() => {
                generator_config.seed = args[i + 1]
                    .parse()
                    .with_context(|| format!("Invalid seed '{}'", args[i + 1]))?;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: generate [--force] [--path FILE] [--seed N]");
                return Ok(());
            }
            other => bail!("Unknown argument '{}'", other),
        }
    }

    let store = ParquetStore::new(path);
    let generator = SyntheticGenerator::new(generator_config);

    let readings = if force {
        info!("Regenerating {} (--force)", store.location());
        let readings = generator.generate().context("Failed to generate readings")?;
        store
            .save(&readings)
            .with_context(|| format!("Failed to write {}", store.location()))?;
        readings
    } else {
        load_or_generate(&store, &generator)
            .with_context(|| format!("Failed to load or generate {}", store.location()))?
    };

    let summary = readings.summary().context("Failed to summarise readings")?;
    info!("{}", summary);
    println!("{}", summary);
    Ok(())
}
