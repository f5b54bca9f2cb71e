use super::Figure;
use crate::models::SeasonalShares;
use crate::utils::constants::CONCENTRATION_UNIT;
use serde_json::json;

const SEASON_COLORS: [&str; 4] = ["#1f77b4", "#d62728", "#2ca02c", "#9467bd"];

/// Share of each season in the all-time seasonal total, slices in
/// canonical season order.
pub fn seasonal_pie_chart(shares: &SeasonalShares) -> Figure {
    let labels: Vec<&str> = shares.seasons.iter().map(|s| s.season.name()).collect();
    let values: Vec<Option<f64>> = shares.seasons.iter().map(|s| s.share).collect();
    let means: Vec<Option<f64>> = shares.seasons.iter().map(|s| s.mean).collect();

    let mut figure = Figure::new(json!({
        "title": { "text": format!("Overall Seasonal Pollution Average ({})", shares.pollutant) },
        "legend": { "traceorder": "normal" },
    }));

    figure.add_trace(json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "customdata": means,
        "sort": false,
        "marker": { "colors": SEASON_COLORS },
        "textinfo": "label+percent",
        "textposition": "outside",
        "outsidetextfont": { "size": 18 },
        "hovertemplate": format!(
            "%{{label}}<br>{}: %{{value:.1%}}<br>Avg: %{{customdata:.1f}} {}<extra></extra>",
            shares.pollutant, CONCENTRATION_UNIT
        ),
    }));

    figure
}
