//! Self-contained HTML report
//!
//! One page with the four analysis sections. Each chart is a `div` with a
//! fresh UUID id and a `Plotly.newPlot` call carrying the serialized figure;
//! plotly.js itself is loaded from its CDN.

use super::charts::DistributionFigures;
use super::figure::Figure;
use crate::dataset::error::Result;
use crate::dataset::reading::Zone;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Everything the report shows, already computed
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    pub row_count: usize,
    pub n_sensors: usize,
    pub pca: Figure,
    pub variance_ratios: [f64; 2],
    pub heatmap: Figure,
    pub tail_zone: Zone,
    pub percentile: f64,
    pub percentile_value: f64,
    pub distributions: DistributionFigures,
    pub bivariate: Figure,
}

impl Report {
    pub fn to_html(&self) -> Result<String> {
        let mut body = String::new();

        body.push_str(&format!(
            "<h1>{}</h1>\n<p class=\"subtitle\">{}</p>\n<div class=\"banner success\">Data Loaded: {} rows processed.</div>\n",
            escape_html(&self.title),
            escape_html(&self.subtitle),
            thousands(self.row_count)
        ));

        // Dimensionality
        body.push_str(&format!(
            "<section>\n<h2>The Dimensionality Challenge</h2>\n<div class=\"row\">\n<div class=\"main\">{}</div>\n<aside>\n<h3>Analysis</h3>\n<p><strong>Explained Variance:</strong> PC1 ({:.2}%) + PC2 ({:.2}%)</p>\n<p><strong>Interpretation:</strong></p>\n<ul>\n<li><strong>PC1 (X-axis):</strong> Correlates strongly with PM2.5, PM10, and NO2. It represents <strong>Pollution Intensity</strong>.</li>\n<li><strong>PC2 (Y-axis):</strong> Correlates with Temp/Humidity. It represents <strong>Meteorological Conditions</strong>.</li>\n<li><strong>Clustering:</strong> Industrial zones (Red) score higher on PC1, confirming they are the main drivers of pollution.</li>\n</ul>\n</aside>\n</div>\n</section>\n",
            chart_block(&self.pca)?,
            self.variance_ratios[0] * 100.0,
            self.variance_ratios[1] * 100.0
        ));

        // Temporal density
        body.push_str(&format!(
            "<section>\n<h2>High-Density Temporal Analysis</h2>\n<p>Visualizing {} sensors simultaneously to detect periodic signatures.</p>\n{}\n<p><strong>Observation:</strong></p>\n<ul>\n<li><strong>Horizontal Bands:</strong> Indicate sensors with consistently poor air quality.</li>\n<li><strong>Vertical Stripes:</strong> Indicate city-wide pollution events (likely weather-driven).</li>\n</ul>\n</section>\n",
            self.n_sensors,
            chart_block(&self.heatmap)?
        ));

        // Distribution and tail
        let tabs = tab_group(&[
            ("Peak View (Histogram)", chart_block(&self.distributions.peak)?),
            (
                "Tail View (Log-Scale)",
                format!(
                    "{}\n<p><strong>Technical Justification:</strong> The Log-Scale plot reveals 'Extreme Hazard' events (&gt;200 µg/m³) that standard histograms hide.</p>",
                    chart_block(&self.distributions.tail)?
                ),
            ),
        ]);
        body.push_str(&format!(
            "<section>\n<h2>Distribution Modeling &amp; Tail Integrity</h2>\n<p>Analyzing {} Zone. <strong>{} Percentile PM2.5:</strong> {:.2} µg/m³</p>\n{}\n</section>\n",
            escape_html(self.tail_zone.as_str()),
            escape_html(&super::charts::ordinal(self.percentile)),
            self.percentile_value,
            tabs
        ));

        // Visual integrity
        body.push_str(&format!(
            "<section>\n<h2>The Visual Integrity Audit</h2>\n<div class=\"banner error\">Proposal Rejected: 3D Bar Chart</div>\n<div class=\"banner success\">Accepted Solution: Small Multiples / Bivariate Mapping</div>\n{}\n</section>\n",
            chart_block(&self.bivariate)?
        ));

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<script src=\"{}\"></script>\n<style>{}</style>\n</head>\n<body>\n{}<script>{}</script>\n</body>\n</html>\n",
            escape_html(&self.title),
            PLOTLY_CDN,
            STYLE,
            body,
            TAB_SCRIPT
        ))
    }

    /// Render and write the report, creating parent directories
    pub fn write_html(&self, path: &Path) -> Result<()> {
        let html = self.to_html()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &html)?;
        info!("Wrote report to {} ({} bytes)", path.display(), html.len());
        Ok(())
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:1400px;color:#262730}\
.subtitle{color:#555}\
.banner{padding:.75rem 1rem;border-radius:.4rem;margin:.5rem 0}\
.success{background:#e8f6ec;color:#1e6b34}\
.error{background:#fdecea;color:#8a1c14}\
.row{display:flex;gap:1.5rem}.main{flex:3;min-width:0}aside{flex:1}\
.chart{width:100%;height:520px}\
.tabs button{border:none;background:none;padding:.5rem 1rem;cursor:pointer;border-bottom:2px solid transparent}\
.tabs button.active{border-bottom-color:#ff4b4b;color:#ff4b4b}\
.tab-panel{display:none}.tab-panel.active{display:block}";

const TAB_SCRIPT: &str = "document.querySelectorAll('.tab-group').forEach(function(group){\
var buttons=group.querySelectorAll('.tabs button');var panels=group.querySelectorAll('.tab-panel');\
buttons.forEach(function(button,i){button.addEventListener('click',function(){\
buttons.forEach(function(b){b.classList.remove('active');});panels.forEach(function(p){p.classList.remove('active');});\
button.classList.add('active');panels[i].classList.add('active');\
panels[i].querySelectorAll('.chart').forEach(function(c){Plotly.Plots.resize(c);});});});});";

/// Chart container plus the script that draws `figure` into it
fn chart_block(figure: &Figure) -> Result<String> {
    let id = format!("chart-{}", Uuid::new_v4());
    // "</" inside JSON would end the script element
    let json = figure.to_json()?.replace("</", "<\\/");
    Ok(format!(
        "<div id=\"{id}\" class=\"chart\"></div>\n<script>(function(){{var fig={json};Plotly.newPlot(\"{id}\",fig.data,fig.layout,{{responsive:true}});}})();</script>"
    ))
}

fn tab_group(tabs: &[(&str, String)]) -> String {
    let mut html = String::from("<div class=\"tab-group\">\n<div class=\"tabs\">");
    for (i, (label, _)) in tabs.iter().enumerate() {
        html.push_str(&format!(
            "<button{}>{}</button>",
            if i == 0 { " class=\"active\"" } else { "" },
            escape_html(label)
        ));
    }
    html.push_str("</div>\n");
    for (i, (_, content)) in tabs.iter().enumerate() {
        html.push_str(&format!(
            "<div class=\"tab-panel{}\">\n{}\n</div>\n",
            if i == 0 { " active" } else { "" },
            content
        ));
    }
    html.push_str("</div>");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `876000` → `876,000`
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::figure::{Layout, Title};

    fn figure(title: &str) -> Figure {
        Figure::new(Layout {
            title: Some(Title::new(title)),
            ..Default::default()
        })
    }

    fn report() -> Report {
        Report {
            title: "Air <Quality> & Co".to_string(),
            subtitle: "Year: 2025 Data Analysis".to_string(),
            row_count: 876_000,
            n_sensors: 100,
            pca: figure("pca"),
            variance_ratios: [0.5, 0.25],
            heatmap: figure("heatmap"),
            tail_zone: Zone::Industrial,
            percentile: 99.0,
            percentile_value: 123.456,
            distributions: DistributionFigures {
                peak: figure("peak"),
                tail: figure("tail </script>"),
            },
            bivariate: figure("bivariate"),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(876_000), "876,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_tab_group_activates_first_tab() {
        let html = tab_group(&[("One <1>", "first".to_string()), ("Two", "second".to_string())]);
        assert_eq!(
            html,
            "<div class=\"tab-group\">\n<div class=\"tabs\"><button class=\"active\">One &lt;1&gt;</button><button>Two</button></div>\n\
             <div class=\"tab-panel active\">\nfirst\n</div>\n<div class=\"tab-panel\">\nsecond\n</div>\n</div>"
        );
    }

    #[test]
    fn test_report_sections() {
        let html = report().to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<h1>Air &lt;Quality&gt; &amp; Co</h1>"));
        assert!(html.contains("Data Loaded: 876,000 rows processed."));
        assert!(html.contains("PC1 (50.00%) + PC2 (25.00%)"));
        assert!(html.contains("Visualizing 100 sensors"));
        assert!(html.contains("Analyzing Industrial Zone. <strong>99th Percentile PM2.5:</strong> 123.46"));
        assert!(html.contains("Proposal Rejected: 3D Bar Chart"));
        assert!(html.contains("Peak View (Histogram)"));
        assert_eq!(html.matches("Plotly.newPlot(").count(), 5);
    }

    #[test]
    fn test_chart_ids_are_unique_and_json_is_script_safe() {
        let html = report().to_html().unwrap();
        let mut ids: Vec<&str> = html
            .match_indices("<div id=\"chart-")
            .map(|(i, _)| &html[i + 9..i + 9 + 6 + 36])
            .collect();
        assert_eq!(ids.len(), 5);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert!(!html.contains("tail </script>"));
        assert!(html.contains("tail <\\/script>"));
    }

    #[test]
    fn test_write_html_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("dashboard.html");
        report().write_html(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("The Visual Integrity Audit"));
    }
}
