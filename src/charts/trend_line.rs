use super::Figure;
use crate::models::TrendSeries;
use crate::utils::constants::CONCENTRATION_UNIT;
use serde_json::json;

const LINE_COLORS: [&str; 3] = ["red", "blue", "green"];

/// Annual means as one line per pollutant; hovering a point shows the
/// change from the previous year.
pub fn trend_chart(series: &[TrendSeries]) -> Figure {
    let years: Vec<i32> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.year))
        .collect();
    let title = match (years.iter().min(), years.iter().max()) {
        (Some(first), Some(last)) => format!("Pollution Spike and Drop Line Chart ({}-{})", first, last),
        _ => "Pollution Spike and Drop Line Chart".to_string(),
    };

    let mut figure = Figure::new(json!({
        "title": { "text": title, "font": { "size": 20 } },
        "xaxis": {
            "title": { "text": "Year", "font": { "size": 16 } },
            "tickmode": "linear",
            "dtick": 1,
            "showgrid": true,
            "gridcolor": "lightgray",
        },
        "yaxis": {
            "title": { "text": format!("Average Pollution ({})", CONCENTRATION_UNIT), "font": { "size": 16 } },
            "showgrid": true,
            "gridcolor": "lightgray",
        },
        "legend": { "title": { "text": "Pollutant" } },
        "template": "plotly_white",
        "font": { "size": 14 },
    }));

    for (i, s) in series.iter().enumerate() {
        figure.add_trace(json!({
            "type": "scatter",
            "mode": "lines+markers",
            "name": s.pollutant,
            "x": s.points.iter().map(|p| p.year).collect::<Vec<_>>(),
            "y": s.points.iter().map(|p| p.mean).collect::<Vec<_>>(),
            "customdata": s.points.iter().map(|p| p.delta).collect::<Vec<_>>(),
            "line": { "color": LINE_COLORS[i % LINE_COLORS.len()] },
            "hovertemplate": format!(
                "<b>{}</b><br>Year: %{{x}}<br>Avg: %{{y:.2f}} {}<br>Change: %{{customdata:+.2f}}<extra></extra>",
                s.pollutant, CONCENTRATION_UNIT
            ),
        }));
    }

    figure
}
