//! Dashboard pipeline shared by the binaries
//!
//! The pipeline:
//! 1. Loads the cached dataset, or generates and caches it
//! 2. Runs the four analyses
//! 3. Maps the results to figures
//! 4. Returns the assembled `Report` for the caller to write

use crate::analysis::{
    bivariate_mapping, daily_density, project_sensors, zone_tail, ProjectionResult,
};
use crate::config::DashboardConfig;
use crate::dataset::error::Result;
use crate::dataset::{load_or_generate, ReadingSet, ReadingStore, SyntheticGenerator};
use crate::memprof;
use crate::render::{
    bivariate_facets, distribution_views, pca_biplot, temporal_heatmap, Report,
};
use std::time::Instant;
use tracing::info;

/// Load (or generate) the readings and build the report
pub fn build_report<S: ReadingStore + ?Sized>(
    store: &S,
    config: &DashboardConfig,
) -> Result<Report> {
    let m0 = memprof::checkpoint("build_report START");
    let t0 = Instant::now();

    info!("[1/3] Loading readings from {}", store.location());
    let generator = SyntheticGenerator::new(config.generator.clone());
    let readings = load_or_generate(store, &generator)?;
    let m1 = memprof::delta("After load", m0);
    let t1 = memprof::time_delta("After load", t0, t0);

    let report = render_report(&readings, config)?;
    memprof::delta("After render", m1);
    memprof::time_delta("After render", t0, t1);

    Ok(report)
}

/// Run the analyses and charts over already-loaded readings
pub fn render_report(readings: &ReadingSet, config: &DashboardConfig) -> Result<Report> {
    info!("[2/3] Analysing {} readings", readings.len());

    let projection: ProjectionResult = project_sensors(readings)?;
    info!(
        "  PCA: {} sensors, explained variance {:.2}% + {:.2}%",
        projection.records.len(),
        projection.variance_ratios[0] * 100.0,
        projection.variance_ratios[1] * 100.0
    );

    let grid = daily_density(readings)?;
    info!("  Density grid: {} × {}", grid.n_rows(), grid.n_cols());

    let sample = zone_tail(readings, config.tail_zone, config.tail_percentile)?;
    info!(
        "  Tail: {} zone, p{} = {:.2} over {} readings",
        sample.zone,
        sample.percentile,
        sample.percentile_value,
        sample.len()
    );

    let bivariate = bivariate_mapping(readings, config.density_seed, config.density_range)?;
    info!("  Bivariate: {} sensors", bivariate.len());

    info!("[3/3] Rendering charts");
    let style = &config.style;
    Ok(Report {
        title: config.report_title.clone(),
        subtitle: format!("Year: {} Data Analysis", config.generator.year),
        row_count: readings.len(),
        n_sensors: grid.n_rows(),
        pca: pca_biplot(&projection, style),
        variance_ratios: projection.variance_ratios,
        heatmap: temporal_heatmap(&grid, style),
        tail_zone: sample.zone,
        percentile: sample.percentile,
        percentile_value: sample.percentile_value,
        distributions: distribution_views(&sample, style),
        bivariate: bivariate_facets(&bivariate, style),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GeneratorConfig, MemoryStore, Zone};
    use crate::render::figure::Trace;

    fn small_config() -> DashboardConfig {
        DashboardConfig {
            generator: GeneratorConfig {
                n_sensors: 6,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_build_report_generates_once() {
        let store = MemoryStore::new();
        let config = small_config();

        let first = build_report(&store, &config).unwrap();
        assert_eq!(first.row_count, 6 * 8760);
        assert_eq!(first.n_sensors, 6);
        assert_eq!(store.save_count(), 1);

        let second = build_report(&store, &config).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(first.percentile_value, second.percentile_value);
        assert_eq!(first.pca, second.pca);
        assert_eq!(first.bivariate, second.bivariate);
    }

    #[test]
    fn test_report_follows_config() {
        let config = DashboardConfig {
            tail_zone: Zone::Residential,
            tail_percentile: 90.0,
            ..small_config()
        };
        let readings = SyntheticGenerator::new(config.generator.clone())
            .generate()
            .unwrap();
        let report = render_report(&readings, &config).unwrap();

        assert_eq!(report.tail_zone, Zone::Residential);
        assert_eq!(report.percentile, 90.0);
        assert_eq!(report.subtitle, "Year: 2025 Data Analysis");
        let Trace::Heatmap(h) = &report.heatmap.data[0] else {
            panic!("expected heatmap");
        };
        assert_eq!(h.x.len(), 365);
        assert_eq!(h.y.len(), 6);
    }

    #[test]
    fn test_single_sensor_fails_explicitly() {
        let config = DashboardConfig {
            generator: GeneratorConfig {
                n_sensors: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(build_report(&MemoryStore::new(), &config).is_err());
    }
}
