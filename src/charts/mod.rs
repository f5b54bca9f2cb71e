pub mod seasonal_bar;
pub mod seasonal_pie;
pub mod station_bar;
pub mod trend_line;

pub use seasonal_bar::seasonal_bar_chart;
pub use seasonal_pie::seasonal_pie_chart;
pub use station_bar::{station_ranking_chart, tier_color};
pub use trend_line::trend_chart;

use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A Plotly figure: trace objects plus a layout, serialized verbatim into
/// the HTML document.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn new(layout: Value) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn add_trace(&mut self, trace: Value) {
        self.data.push(trace);
    }

    pub fn title(&self) -> &str {
        self.layout
            .get("title")
            .and_then(|t| t.get("text").or(Some(t)))
            .and_then(Value::as_str)
            .unwrap_or("Chart")
    }

    /// Render a standalone page. Plotly itself is fetched from the CDN.
    pub fn to_html(&self) -> Result<String> {
        let data = script_safe(&serde_json::to_string(&self.data)?);
        let layout = script_safe(&serde_json::to_string(&self.layout)?);
        let config = json!({ "responsive": true });

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
</head>
<body>
<div id="chart" style="width:100%;height:100vh;"></div>
<script type="text/javascript">
Plotly.newPlot("chart", {data}, {layout}, {config});
</script>
</body>
</html>
"#,
            title = escape_html(self.title()),
            cdn = PLOTLY_CDN,
            data = data,
            layout = layout,
            config = config,
        ))
    }

    pub fn write_html(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_html()?)?;
        info!(path = %path.display(), traces = self.data.len(), "Chart written");
        Ok(())
    }
}

/// Write the figure and, if requested, hand it to the system browser.
/// A browser that fails to launch is logged, not fatal.
pub fn publish(figure: &Figure, path: &Path, auto_open: bool) -> Result<()> {
    figure.write_html(path)?;
    if auto_open {
        if let Err(e) = open_in_browser(path) {
            warn!(path = %path.display(), error = %e, "Could not open chart in browser");
        }
    }
    Ok(())
}

pub fn open_in_browser(path: &Path) -> std::io::Result<()> {
    let target = path.canonicalize()?;
    debug!(path = %target.display(), "Opening chart");

    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.arg("/C").arg("start").arg("");
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    command.arg(&target).spawn()?;
    Ok(())
}

/// Plotly `updatemenus` entry whose buttons switch between precomputed traces.
pub(crate) fn dropdown(active: usize, buttons: Vec<Value>) -> Value {
    json!([{
        "active": active,
        "buttons": buttons,
        "x": 1.1,
        "y": 1.1,
        "showactive": true,
    }])
}

/// Index of `preferred` in `options`, or the first option.
pub(crate) fn default_index(options: &[String], preferred: &str) -> usize {
    options.iter().position(|o| o == preferred).unwrap_or(0)
}

// Keeps a closing tag inside a JSON string from ending the script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
