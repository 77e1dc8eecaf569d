//! Rendering layer
//!
//! - `figure`: Plotly figure model (serde types, templates)
//! - `palettes`: palette registry from palettes.json
//! - `charts`: analysis results → figures
//! - `report`: HTML report assembly

pub mod charts;
pub mod figure;
pub mod palettes;
pub mod report;

pub use charts::{
    bivariate_facets, distribution_views, pca_biplot, temporal_heatmap, ChartStyle,
    DistributionFigures,
};
pub use figure::{Figure, Template};
pub use report::Report;
