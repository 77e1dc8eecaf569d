//! Chart builders: analysis results → Plotly figures
//!
//! Each builder is a pure function of its input and a `ChartStyle`; the same
//! derived data always yields the same figure.

use super::figure::{
    Annotation, Axis, BarTrace, ColorBar, ColorSpec, Figure, HeatmapTrace, Layout, Line, Marker,
    ScatterTrace, Shape, SizeSpec, Template, Title,
};
use super::palettes::{self, PaletteType};
use crate::analysis::{BivariateRecord, DensityGrid, ProjectionResult, ZoneSample};
use crate::dataset::reading::{Metric, Zone};

/// Largest marker diameter (px) in the faceted scatter
const MAX_MARKER_SIZE: f64 = 20.0;

/// Presentation settings shared by every chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub template: Template,
    pub zone_palette: String,
    pub heatmap_palette: String,
    pub bivariate_palette: String,
    /// Loading vectors are drawn at `loading × loadings_scale`
    pub loadings_scale: f64,
    pub histogram_bins: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            template: Template::SimpleWhite,
            zone_palette: palettes::DEFAULT_CATEGORICAL_PALETTE.to_string(),
            heatmap_palette: palettes::DEFAULT_DIVERGING_PALETTE.to_string(),
            bivariate_palette: palettes::DEFAULT_SEQUENTIAL_PALETTE.to_string(),
            loadings_scale: 5.0,
            histogram_bins: 50,
        }
    }
}

impl ChartStyle {
    fn finish(&self, mut figure: Figure) -> Figure {
        self.template.apply(&mut figure.layout);
        figure
    }
}

/// PCA scatter with loading vectors drawn from the origin
pub fn pca_biplot(result: &ProjectionResult, style: &ChartStyle) -> Figure {
    let [ratio1, ratio2] = result.variance_ratios;
    let mut figure = Figure::new(Layout {
        xaxis: Some(Axis::titled(format!("PC1 ({:.2}%)", ratio1 * 100.0))),
        yaxis: Some(Axis::titled(format!("PC2 ({:.2}%)", ratio2 * 100.0))),
        showlegend: Some(true),
        ..Layout::titled("Dimensionality Reduction: Industrial vs Residential Clusters")
    });

    for zone in Zone::ALL {
        let records: Vec<_> = result.records.iter().filter(|r| r.zone == zone).collect();
        if records.is_empty() {
            continue;
        }
        figure.push(ScatterTrace {
            name: zone.to_string(),
            x: records.iter().map(|r| r.pc1).collect(),
            y: records.iter().map(|r| r.pc2).collect(),
            mode: "markers".to_string(),
            text: Some(records.iter().map(|r| r.sensor_id.clone()).collect()),
            hovertemplate: Some(format!(
                "zone={}<br>sensor_id=%{{text}}<br>PC1=%{{x:.3f}}<br>PC2=%{{y:.3f}}<extra></extra>",
                zone
            )),
            marker: Some(Marker {
                color: Some(ColorSpec::Fixed(palettes::zone_color(
                    &style.zone_palette,
                    zone,
                ))),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    for loading in &result.loadings {
        let x = loading.pc1 * style.loadings_scale;
        let y = loading.pc2 * style.loadings_scale;
        figure
            .layout
            .shapes
            .push(Shape::segment(0.0, 0.0, x, y, Line::solid("black", 1.0)));
        figure
            .layout
            .annotations
            .push(Annotation::label(x, y, loading.metric.column()));
    }

    style.finish(figure)
}

/// Sensor × day heatmap, reversed diverging palette (red = high)
pub fn temporal_heatmap(grid: &DensityGrid, style: &ChartStyle) -> Figure {
    let year = grid
        .days
        .first()
        .map(|d| d.format("%Y").to_string())
        .unwrap_or_default();
    let (zmin, zmax) = grid.value_range().unzip();

    let mut figure = Figure::new(Layout {
        xaxis: Some(Axis::titled(format!("Time ({})", year))),
        yaxis: Some(Axis {
            autorange: Some("reversed".to_string()),
            ..Axis::titled("Sensors (Sorted by ID)")
        }),
        ..Layout::titled("High-Density Temporal Analysis (PM2.5 Heatmap)")
    });

    figure.push(HeatmapTrace {
        x: grid
            .days
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        y: grid.sensor_ids.clone(),
        z: grid.values.clone(),
        colorscale: palettes::colorscale(&style.heatmap_palette, PaletteType::Diverging, true),
        colorbar: Some(ColorBar {
            title: Some(Title::new("PM2.5 Level")),
        }),
        zmin,
        zmax,
        hovertemplate: Some(
            "Date=%{x}<br>Sensor ID=%{y}<br>PM2.5 Level=%{z:.2f}<extra></extra>".to_string(),
        ),
    });

    style.finish(figure)
}

/// Equal-width histogram over `[min, max]`
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Bin finite values into `bins` equal-width bins; the last bin is closed
///
/// A constant sample gets a unit-wide range centered on its value.
pub fn equal_width_bins(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0u64; bins];
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Peak (linear counts) and tail (log counts) views of one zone sample
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionFigures {
    pub peak: Figure,
    pub tail: Figure,
}

/// `99` → `99th`, `2` → `2nd`, `97.5` → `97.5th`
pub fn ordinal(p: f64) -> String {
    if p.fract() != 0.0 {
        return format!("{}th", p);
    }
    let n = p as i64;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

pub fn distribution_views(sample: &ZoneSample, style: &ChartStyle) -> DistributionFigures {
    let histogram = equal_width_bins(&sample.values, style.histogram_bins);
    let bars = |color: &str| BarTrace {
        name: Metric::Pm25.column().to_string(),
        x: histogram.as_ref().map(Histogram::centers).unwrap_or_default(),
        y: histogram
            .as_ref()
            .map(|h| h.counts.iter().map(|c| *c as f64).collect::<Vec<f64>>())
            .unwrap_or_default(),
        width: histogram.as_ref().map(Histogram::widths),
        marker: Some(Marker {
            color: Some(ColorSpec::Fixed(color.to_string())),
            ..Default::default()
        }),
        showlegend: Some(false),
    };
    let axes = |log: bool| Layout {
        xaxis: Some(Axis::titled(Metric::Pm25.column())),
        yaxis: Some(Axis {
            axis_type: log.then(|| "log".to_string()),
            ..Axis::titled("count")
        }),
        bargap: Some(0.0),
        ..Default::default()
    };

    let mut peak = Figure::new(Layout {
        title: Some(Title::new("Distribution View 1: Histogram (Focus on Peaks)")),
        ..axes(false)
    });
    peak.push(bars("#1F77B4"));

    let mut tail = Figure::new(Layout {
        title: Some(Title::new(
            "Distribution View 2: Log-Scale (Focus on Tails/Extremes)",
        )),
        ..axes(true)
    });
    tail.push(bars("#D62728"));
    tail.layout.shapes.push(Shape::vline(
        sample.percentile_value,
        Line::dashed("black", 2.0),
    ));
    tail.layout.annotations.push(Annotation {
        xref: "x".to_string(),
        yref: "paper".to_string(),
        xanchor: Some("left".to_string()),
        yanchor: Some("top".to_string()),
        ..Annotation::label(
            sample.percentile_value,
            1.0,
            format!(
                "{} Percentile: {:.2}",
                ordinal(sample.percentile),
                sample.percentile_value
            ),
        )
    });

    DistributionFigures {
        peak: style.finish(peak),
        tail: style.finish(tail),
    }
}

/// Small multiples: one panel per zone, density vs mean pm25
pub fn bivariate_facets(records: &[BivariateRecord], style: &ChartStyle) -> Figure {
    let (cmin, cmax) = records
        .iter()
        .map(|r| r.mean_pm25)
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unzip();
    // Area sizing with the largest mean at MAX_MARKER_SIZE
    let sizeref = cmax
        .filter(|m| *m > 0.0)
        .map(|m| 2.0 * m / (MAX_MARKER_SIZE * MAX_MARKER_SIZE));
    let colorscale = palettes::colorscale(&style.bivariate_palette, PaletteType::Sequential, false);

    let mut layout = Layout {
        xaxis: Some(Axis {
            domain: Some([0.0, 0.49]),
            anchor: Some("y".to_string()),
            ..Axis::titled("pop_density")
        }),
        yaxis: Some(Axis {
            anchor: Some("x".to_string()),
            ..Axis::titled("pm25")
        }),
        xaxis2: Some(Axis {
            domain: Some([0.51, 1.0]),
            anchor: Some("y2".to_string()),
            matches: Some("x".to_string()),
            ..Axis::titled("pop_density")
        }),
        yaxis2: Some(Axis {
            anchor: Some("x2".to_string()),
            matches: Some("y".to_string()),
            showticklabels: Some(false),
            ..Default::default()
        }),
        showlegend: Some(false),
        ..Layout::titled("Visual Integrity: Bivariate Analysis (Pollution vs Density by Zone)")
    };

    let mut traces = Vec::with_capacity(Zone::ALL.len());
    for (panel, zone) in Zone::ALL.into_iter().enumerate() {
        let (xref, yref) = if panel == 0 {
            ("x", "y")
        } else {
            ("x2", "y2")
        };
        let center = if panel == 0 { 0.245 } else { 0.755 };
        layout.annotations.push(Annotation {
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            xanchor: Some("center".to_string()),
            yanchor: Some("bottom".to_string()),
            ..Annotation::label(center, 1.0, format!("zone={}", zone))
        });

        let panel_records: Vec<_> = records.iter().filter(|r| r.zone == zone).collect();
        let pm25: Vec<f64> = panel_records.iter().map(|r| r.mean_pm25).collect();
        traces.push(ScatterTrace {
            name: zone.to_string(),
            x: panel_records
                .iter()
                .map(|r| r.population_density as f64)
                .collect(),
            y: pm25.clone(),
            mode: "markers".to_string(),
            text: Some(panel_records.iter().map(|r| r.sensor_id.clone()).collect()),
            hovertemplate: Some(format!(
                "zone={}<br>sensor_id=%{{text}}<br>pop_density=%{{x}}<br>pm25=%{{y:.2f}}<extra></extra>",
                zone
            )),
            marker: Some(Marker {
                color: Some(ColorSpec::PerPoint(pm25.clone())),
                size: Some(SizeSpec::PerPoint(pm25)),
                sizemode: Some("area".to_string()),
                sizeref,
                colorscale: Some(colorscale.clone()),
                cmin,
                cmax,
                showscale: Some(panel == 0),
                colorbar: (panel == 0).then(|| ColorBar {
                    title: Some(Title::new("pm25")),
                }),
                ..Default::default()
            }),
            xaxis: Some(xref.to_string()),
            yaxis: Some(yref.to_string()),
            ..Default::default()
        });
    }

    let mut figure = Figure::new(layout);
    for trace in traces {
        figure.push(trace);
    }
    style.finish(figure)
}
