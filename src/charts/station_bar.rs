use super::{default_index, dropdown, Figure};
use crate::models::StationRanking;
use crate::utils::constants::{CONCENTRATION_UNIT, LOW_POLLUTION_LIMIT, MEDIUM_POLLUTION_LIMIT};
use serde_json::{json, Value};

const TIERS: [(&str, &str); 3] = [
    ("High pollution", "red"),
    ("Medium pollution", "orange"),
    ("Low pollution", "blue"),
];

/// Bar colour for a station mean.
pub fn tier_color(value: f64) -> &'static str {
    if value < LOW_POLLUTION_LIMIT {
        "blue"
    } else if value < MEDIUM_POLLUTION_LIMIT {
        "orange"
    } else {
        "red"
    }
}

/// Horizontal bars of the per-station means, one trace per pollutant plus
/// three legend-only traces naming the colour tiers.
pub fn station_ranking_chart(rankings: &[StationRanking], year: i32, default_pollutant: &str) -> Figure {
    let pollutants: Vec<String> = rankings.iter().map(|r| r.pollutant.clone()).collect();
    let active = default_index(&pollutants, default_pollutant);
    let shown = pollutants.get(active).cloned().unwrap_or_default();

    let mut figure = Figure::new(json!({
        "title": { "text": station_title(&shown, year) },
        "xaxis": { "title": { "text": axis_title(&shown) } },
        "yaxis": { "title": { "text": "Station" }, "autorange": "reversed" },
        "legend": { "title": { "text": "Pollution Level Tier" } },
        "height": 700,
    }));

    for (p, ranking) in rankings.iter().enumerate() {
        let names: Vec<&str> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        let means: Vec<f64> = ranking.entries.iter().map(|e| e.mean).collect();

        figure.add_trace(json!({
            "type": "bar",
            "orientation": "h",
            "x": means,
            "y": names,
            "marker": { "color": means.iter().map(|&m| tier_color(m)).collect::<Vec<_>>() },
            "text": ranking
                .entries
                .iter()
                .map(|e| format!("{}<br>{}: {:.1} {}", e.name, ranking.pollutant, e.mean, CONCENTRATION_UNIT))
                .collect::<Vec<_>>(),
            "hoverinfo": "text",
            "showlegend": false,
            "visible": p == active,
        }));
    }

    for (name, color) in TIERS {
        figure.add_trace(json!({
            "type": "bar",
            "x": [null],
            "y": [null],
            "name": name,
            "marker": { "color": color },
        }));
    }

    let buttons: Vec<Value> = pollutants
        .iter()
        .enumerate()
        .map(|(p, pollutant)| {
            let mut visible = vec![false; pollutants.len()];
            visible[p] = true;
            visible.extend([true; TIERS.len()]);
            json!({
                "label": pollutant,
                "method": "update",
                "args": [
                    { "visible": visible },
                    {
                        "title": { "text": station_title(pollutant, year) },
                        "xaxis": { "title": { "text": axis_title(pollutant) } },
                        "yaxis": { "title": { "text": "Station" }, "autorange": "reversed" },
                    },
                ],
            })
        })
        .collect();

    if !buttons.is_empty() {
        figure.layout["updatemenus"] = dropdown(active, buttons);
    }
    figure
}

fn station_title(pollutant: &str, year: i32) -> String {
    format!("Average {} Pollution by Station ({})", pollutant, year)
}

fn axis_title(pollutant: &str) -> String {
    format!("Average {} Concentration ({})", pollutant, CONCENTRATION_UNIT)
}
