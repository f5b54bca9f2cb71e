use crate::config::PipelineConfig;
use crate::models::{AnnualAverage, TrendPoint, TrendSeries};

/// Year-over-year change of the annual means, used to spot spikes and drops.
pub struct TrendAnalyzer {
    pollutants: Vec<String>,
}

impl TrendAnalyzer {
    pub fn new(pollutants: Vec<String>) -> Self {
        Self { pollutants }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.trend_pollutants.clone())
    }

    /// One series per configured pollutant. The delta of a row is taken
    /// against the previous summary row, whatever year that is.
    pub fn analyze(&self, summary: &[AnnualAverage]) -> Vec<TrendSeries> {
        let mut rows: Vec<&AnnualAverage> = summary.iter().collect();
        rows.sort_by_key(|r| r.year);

        self.pollutants
            .iter()
            .map(|pollutant| {
                let mut previous: Option<f64> = None;
                let points = rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let mean = row.get(pollutant);
                        let delta = match (i, previous, mean) {
                            (0, _, _) => None,
                            (_, Some(prev), Some(curr)) => Some(curr - prev),
                            _ => None,
                        };
                        previous = mean;
                        TrendPoint {
                            year: row.year,
                            mean,
                            delta,
                        }
                    })
                    .collect();

                TrendSeries {
                    pollutant: pollutant.clone(),
                    points,
                }
            })
            .collect()
    }
}
