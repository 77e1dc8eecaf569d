//! Dashboard configuration from properties
//!
//! All default values come from dashboard.json; this module only resolves
//! them into typed settings. User overrides live in `dashboard_config.json`
//! in the working directory.

use crate::analysis::bivariate::DensityRange;
use crate::dataset::error::Result;
use crate::dataset::generator::GeneratorConfig;
use crate::dataset::reading::Zone;
use crate::properties::PropertyReader;
use crate::render::charts::ChartStyle;
use crate::render::figure::Template;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// User configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "dashboard_config.json";

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Cached Parquet dataset
    pub data_path: PathBuf,

    pub generator: GeneratorConfig,

    /// Output HTML report
    pub report_path: PathBuf,

    pub report_title: String,

    /// Zone analysed by the tail view
    pub tail_zone: Zone,

    /// Percentile marked on the tail view (0-100)
    pub tail_percentile: f64,

    /// Seed of the synthetic population density
    pub density_seed: u64,

    pub density_range: DensityRange,

    /// Template, palettes, loading scale and bin count of the charts
    pub style: ChartStyle,
}

impl DashboardConfig {
    pub fn from_properties(props: &PropertyReader) -> Self {
        let generator = GeneratorConfig {
            seed: props.get_u64("data.seed"),
            n_sensors: props.get_usize("data.sensors"),
            year: props.get_i32("data.year"),
            ..Default::default()
        };

        // Enumerations are validated by the reader; parse failures cannot occur
        let tail_zone = props
            .get_enum("tail.zone")
            .parse::<Zone>()
            .unwrap_or(Zone::Industrial);
        let template = props
            .get_enum("report.template")
            .parse::<Template>()
            .unwrap_or_default();

        let tail_percentile = props.get_f64_in_range("tail.percentile", 0.0, 100.0);

        let mut density_range = DensityRange {
            min: props.get_u32("density.min"),
            max: props.get_u32("density.max"),
        };
        if density_range.min >= density_range.max {
            warn!(
                "Empty density range [{}, {}). Using default",
                density_range.min, density_range.max
            );
            density_range = DensityRange::default();
        }

        let mut histogram_bins = props.get_usize("histogram.bins");
        if histogram_bins == 0 {
            warn!("histogram.bins must be positive. Using 50");
            histogram_bins = 50;
        }

        let style = ChartStyle {
            template,
            zone_palette: props.get_string("zone.palette"),
            heatmap_palette: props.get_string("heatmap.palette"),
            bivariate_palette: props.get_string("bivariate.palette"),
            loadings_scale: props.get_f64("loadings.scale"),
            histogram_bins,
        };

        Self {
            data_path: PathBuf::from(props.get_string("data.path")),
            generator,
            report_path: PathBuf::from(props.get_string("report.path")),
            report_title: props.get_string("report.title"),
            tail_zone,
            tail_percentile,
            density_seed: props.get_u64("density.seed"),
            density_range,
            style,
        }
    }

    /// Configuration from `path`, or defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let props = PropertyReader::from_file_or_default(path)?;
        let config = Self::from_properties(&props);
        info!(
            "Config: data={}, report={}, seed={}, sensors={}, tail={} p{}, template={}",
            config.data_path.display(),
            config.report_path.display(),
            config.generator.seed,
            config.generator.n_sensors,
            config.tail_zone,
            config.tail_percentile,
            config.style.template
        );
        Ok(config)
    }

    /// Configuration from `dashboard_config.json` in the working directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::default())
    }
}
