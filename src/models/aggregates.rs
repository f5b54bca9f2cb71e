use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Season;

/// Running arithmetic mean over non-missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn push_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// One row of the annual summary: mean concentration per pollutant for a year.
/// Pollutants absent from that year's file are absent from `means`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAverage {
    pub year: i32,
    pub means: BTreeMap<String, f64>,
}

impl AnnualAverage {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            means: BTreeMap::new(),
        }
    }

    pub fn get(&self, pollutant: &str) -> Option<f64> {
        self.means.get(pollutant).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAverage {
    pub year: i32,
    pub season: Season,
    pub pollutant: String,
    pub mean: f64,
    /// Dense rank among the seasons of the same (year, pollutant); 1 is the highest mean.
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalShare {
    pub season: Season,
    /// All-time mean for the season; `None` when no observation fell in it.
    pub mean: Option<f64>,
    /// Fraction of the four-season total, in `[0, 1]` for non-negative data.
    pub share: Option<f64>,
}

/// Seasonal breakdown of one pollutant, always in canonical season order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalShares {
    pub pollutant: String,
    pub files_used: usize,
    pub files_skipped: usize,
    pub seasons: Vec<SeasonalShare>,
}

impl SeasonalShares {
    pub fn total_share(&self) -> f64 {
        self.seasons.iter().filter_map(|s| s.share).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMean {
    pub station_id: String,
    pub name: String,
    pub mean: f64,
}

/// Stations ordered by descending mean for a single pollutant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRanking {
    pub pollutant: String,
    pub entries: Vec<StationMean>,
}

impl StationRanking {
    pub fn contains(&self, station_id: &str) -> bool {
        self.entries.iter().any(|e| e.station_id == station_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub mean: Option<f64>,
    /// Change from the previous summary row; `None` on the first row or when either mean is missing.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub pollutant: String,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// The year with the largest absolute year-over-year change.
    pub fn largest_change(&self) -> Option<&TrendPoint> {
        self.points
            .iter()
            .filter(|p| p.delta.is_some())
            .max_by(|a, b| {
                let da = a.delta.unwrap_or_default().abs();
                let db = b.delta.unwrap_or_default().abs();
                da.total_cmp(&db)
            })
    }
}
