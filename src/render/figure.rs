//! Plotly-compatible figure model
//!
//! Serialized as `{"data": [...], "layout": {...}}` and handed to
//! `Plotly.newPlot` by the report. Optional fields are skipped when unset so
//! plotly.js applies its own defaults.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::dataset::error::DashboardError;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn push(&mut self, trace: impl Into<Trace>) {
        self.data.push(trace.into());
    }

    pub fn to_json(&self) -> crate::dataset::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Heatmap(HeatmapTrace),
    Bar(BarTrace),
}

impl From<ScatterTrace> for Trace {
    fn from(t: ScatterTrace) -> Self {
        Trace::Scatter(t)
    }
}

impl From<HeatmapTrace> for Trace {
    fn from(t: HeatmapTrace) -> Self {
        Trace::Heatmap(t)
    }
}

impl From<BarTrace> for Trace {
    fn from(t: BarTrace) -> Self {
        Trace::Bar(t)
    }
}

/// Single color or one value per point (mapped through a colorscale)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ColorSpec {
    Fixed(String),
    PerPoint(Vec<f64>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SizeSpec {
    Fixed(f64),
    PerPoint(Vec<f64>),
}

pub type Colorscale = Vec<(f64, String)>;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ColorBar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Colorscale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Line {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: Some(color.to_string()),
            width: Some(width),
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f64) -> Self {
        Self {
            dash: Some("dash".to_string()),
            ..Self::solid(color, width)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HeatmapTrace {
    pub x: Vec<String>,
    pub y: Vec<String>,
    /// Row-major; NaN cells serialize as `null` (drawn as gaps)
    pub z: Vec<Vec<f64>>,
    pub colorscale: Colorscale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

/// Pre-binned histogram drawn as bars
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BarTrace {
    pub name: String,
    /// Bin centers
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<String>,
    /// `"reversed"` puts the first category at the top
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<String>,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(text)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub xref: String,
    pub yref: String,
    pub line: Line,
}

impl Shape {
    /// Line segment in data coordinates
    pub fn segment(x0: f64, y0: f64, x1: f64, y1: f64, line: Line) -> Self {
        Self {
            shape_type: "line".to_string(),
            x0,
            y0,
            x1,
            y1,
            xref: "x".to_string(),
            yref: "y".to_string(),
            line,
        }
    }

    /// Vertical line at `x` spanning the full plot height
    pub fn vline(x: f64, line: Line) -> Self {
        Self {
            yref: "paper".to_string(),
            ..Self::segment(x, 0.0, x, 1.0, line)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub showarrow: bool,
    pub xref: String,
    pub yref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
}

impl Annotation {
    /// Text label at data coordinates
    pub fn label(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            showarrow: false,
            xref: "x".to_string(),
            yref: "y".to_string(),
            xanchor: None,
            yanchor: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Layout {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(text)),
            ..Default::default()
        }
    }

    fn axes_mut(&mut self) -> impl Iterator<Item = &mut Axis> {
        [
            &mut self.xaxis,
            &mut self.yaxis,
            &mut self.xaxis2,
            &mut self.yaxis2,
        ]
        .into_iter()
        .flatten()
    }
}

/// Layout style applied to every chart
///
/// plotly.js has no named templates, so each variant sets the background
/// and axis styling of the plotly.py template of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    SimpleWhite,
    PlotlyWhite,
    Plotly,
    Ggplot2,
    None,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::SimpleWhite => "simple_white",
            Template::PlotlyWhite => "plotly_white",
            Template::Plotly => "plotly",
            Template::Ggplot2 => "ggplot2",
            Template::None => "none",
        }
    }

    /// Fill in background and axis styling left unset on `layout`
    pub fn apply(&self, layout: &mut Layout) {
        let (paper, plot, grid, line) = match self {
            Template::SimpleWhite => ("white", "white", None, Some("black")),
            Template::PlotlyWhite => ("white", "white", Some("#EBF0F8"), None),
            Template::Plotly => ("white", "#E5ECF6", Some("white"), None),
            Template::Ggplot2 => ("white", "#EBEBEB", Some("white"), None),
            Template::None => return,
        };

        layout.paper_bgcolor.get_or_insert_with(|| paper.to_string());
        layout.plot_bgcolor.get_or_insert_with(|| plot.to_string());

        for axis in layout.axes_mut() {
            match grid {
                Some(color) => {
                    axis.showgrid.get_or_insert(true);
                    axis.gridcolor.get_or_insert_with(|| color.to_string());
                }
                None => {
                    axis.showgrid.get_or_insert(false);
                }
            }
            if let Some(color) = line {
                axis.showline.get_or_insert(true);
                axis.linecolor.get_or_insert_with(|| color.to_string());
                axis.ticks.get_or_insert_with(|| "outside".to_string());
                axis.zeroline.get_or_insert(false);
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple_white" => Ok(Template::SimpleWhite),
            "plotly_white" => Ok(Template::PlotlyWhite),
            "plotly" => Ok(Template::Plotly),
            "ggplot2" => Ok(Template::Ggplot2),
            "none" => Ok(Template::None),
            other => Err(DashboardError::Config(format!(
                "Unknown template '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_is_tagged_by_type() {
        let mut fig = Figure::new(Layout::titled("t"));
        fig.push(ScatterTrace {
            name: "a".to_string(),
            x: vec![1.0],
            y: vec![2.0],
            mode: "markers".to_string(),
            ..Default::default()
        });
        let value = serde_json::to_value(&fig).unwrap();
        assert_eq!(value["data"][0]["type"], "scatter");
        assert_eq!(value["data"][0]["x"], json!([1.0]));
        assert!(value["data"][0].get("marker").is_none());
        assert_eq!(value["layout"]["title"]["text"], "t");
        assert!(value["layout"].get("shapes").is_none());
    }

    #[test]
    fn test_nan_cells_serialize_as_null() {
        let heatmap = HeatmapTrace {
            x: vec!["2025-01-01".to_string()],
            y: vec!["Sensor_000".to_string(), "Sensor_001".to_string()],
            z: vec![vec![1.5], vec![f64::NAN]],
            ..Default::default()
        };
        let value = serde_json::to_value(Trace::from(heatmap)).unwrap();
        assert_eq!(value["type"], "heatmap");
        assert_eq!(value["z"], json!([[1.5], [null]]));
    }

    #[test]
    fn test_untagged_color_spec() {
        let marker = Marker {
            color: Some(ColorSpec::Fixed("#EF553B".to_string())),
            size: Some(SizeSpec::PerPoint(vec![1.0, 2.0])),
            ..Default::default()
        };
        let value = serde_json::to_value(&marker).unwrap();
        assert_eq!(value["color"], "#EF553B");
        assert_eq!(value["size"], json!([1.0, 2.0]));
    }

    #[test]
    fn test_vline_spans_paper_height() {
        let shape = Shape::vline(3.5, Line::dashed("black", 2.0));
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(value["yref"], "paper");
        assert_eq!(value["x0"], 3.5);
        assert_eq!(value["line"]["dash"], "dash");
    }

    #[test]
    fn test_template_parse_and_apply() {
        assert_eq!("simple_white".parse::<Template>().unwrap(), Template::SimpleWhite);
        assert_eq!("GGPLOT2".parse::<Template>().unwrap(), Template::Ggplot2);
        assert!("seaborn".parse::<Template>().is_err());

        let mut layout = Layout {
            xaxis: Some(Axis::titled("x")),
            yaxis: Some(Axis {
                showline: Some(false),
                ..Axis::titled("y")
            }),
            ..Default::default()
        };
        Template::SimpleWhite.apply(&mut layout);
        assert_eq!(layout.plot_bgcolor.as_deref(), Some("white"));
        let xaxis = layout.xaxis.as_ref().unwrap();
        assert_eq!(xaxis.showline, Some(true));
        assert_eq!(xaxis.showgrid, Some(false));
        // Explicit settings survive
        assert_eq!(layout.yaxis.as_ref().unwrap().showline, Some(false));

        let mut bare = Layout::default();
        Template::None.apply(&mut bare);
        assert_eq!(bare, Layout::default());
    }
}
