use super::{default_index, dropdown, Figure};
use crate::models::{Season, SeasonalAverage};
use crate::processors::pollutants_of;
use crate::utils::constants::CONCENTRATION_UNIT;
use serde_json::{json, Value};

/// Grouped bars of the seasonal means per year, one group of four season
/// traces per pollutant. Bar labels carry the season's rank within its year.
pub fn seasonal_bar_chart(averages: &[SeasonalAverage], default_pollutant: &str) -> Figure {
    let pollutants = pollutants_of(averages);
    let active = default_index(&pollutants, default_pollutant);
    let shown = pollutants.get(active).cloned().unwrap_or_default();

    let mut figure = Figure::new(json!({
        "title": { "text": format!("Yearly Seasonal Pollution Levels: {}", shown) },
        "barmode": "group",
        "xaxis": { "title": { "text": "Year" } },
        "yaxis": { "title": { "text": format!("Avg Concentration ({})", CONCENTRATION_UNIT) } },
        "legend": { "title": { "text": "Season" } },
    }));

    for (p, pollutant) in pollutants.iter().enumerate() {
        for season in Season::ALL {
            let rows: Vec<&SeasonalAverage> = averages
                .iter()
                .filter(|a| &a.pollutant == pollutant && a.season == season)
                .collect();

            figure.add_trace(json!({
                "type": "bar",
                "name": season.name(),
                "x": rows.iter().map(|a| a.year.to_string()).collect::<Vec<_>>(),
                "y": rows.iter().map(|a| a.mean).collect::<Vec<_>>(),
                "text": rows.iter().map(|a| a.rank).collect::<Vec<_>>(),
                "customdata": rows.iter().map(|a| [a.rank]).collect::<Vec<_>>(),
                "textposition": "outside",
                "visible": p == active,
                "hovertemplate": format!(
                    "Year: %{{x}}<br>Season: {}<br>Avg: %{{y:.1f}} {}<br>Rank: %{{customdata[0]:.0f}}<extra></extra>",
                    season.name(),
                    CONCENTRATION_UNIT
                ),
            }));
        }
    }

    let buttons: Vec<Value> = pollutants
        .iter()
        .enumerate()
        .map(|(p, pollutant)| {
            let visible: Vec<bool> = (0..pollutants.len())
                .flat_map(|j| std::iter::repeat(j == p).take(Season::ALL.len()))
                .collect();
            json!({
                "label": pollutant,
                "method": "update",
                "args": [
                    { "visible": visible },
                    { "title": { "text": format!("Seasonal Pollution Levels by Year: {}", pollutant) } },
                ],
            })
        })
        .collect();

    if !buttons.is_empty() {
        figure.layout["updatemenus"] = dropdown(active, buttons);
    }
    figure
}
