use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{MeanAccumulator, MeasurementTable, Season, SeasonalShare, SeasonalShares};
use crate::readers::MeasurementReader;
use crate::utils::filename::discover_yearly_files;
use crate::utils::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::{info, warn};

/// All-time seasonal mean of one pollutant and each season's share of the total.
pub struct SeasonalShareAggregator {
    pollutant: String,
    data_dir: PathBuf,
    file_prefix: String,
    file_extension: String,
    reader: MeasurementReader,
    show_progress: bool,
}

impl SeasonalShareAggregator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            pollutant: config.share_pollutant.clone(),
            data_dir: config.data_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
            reader: MeasurementReader::from_config(config),
            show_progress: config.show_progress,
        }
    }

    pub fn with_pollutant(mut self, pollutant: impl Into<String>) -> Self {
        self.pollutant = pollutant.into();
        self
    }

    pub fn pollutant(&self) -> &str {
        &self.pollutant
    }

    /// Pool this table's dated values of the pollutant into the season buckets.
    /// Returns `false` when the table lacks the pollutant column.
    fn accumulate(&self, table: &MeasurementTable, seasons: &mut [MeanAccumulator; 4]) -> bool {
        let Some(idx) = table.pollutant_index(&self.pollutant) else {
            warn!(
                path = %table.source.display(),
                pollutant = %self.pollutant,
                "Pollutant not found. Skipping..."
            );
            return false;
        };

        for obs in &table.observations {
            if let Some(season) = obs.season() {
                seasons[season.index()].push_opt(obs.values.get(idx).copied().flatten());
            }
        }
        true
    }

    fn finalize(&self, seasons: [MeanAccumulator; 4], used: usize, skipped: usize) -> Result<SeasonalShares> {
        if used == 0 {
            return Err(ProcessingError::NoPollutantData {
                pollutant: self.pollutant.clone(),
            });
        }

        // A zero or non-finite total leaves nothing to normalize against
        let shares = compute_shares(&self.pollutant, &seasons);
        let total: f64 = shares.seasons.iter().filter_map(|s| s.mean).sum();
        if shares.seasons.iter().all(|s| s.mean.is_none()) || total == 0.0 || !total.is_finite() {
            return Err(ProcessingError::NoPollutantData {
                pollutant: self.pollutant.clone(),
            });
        }

        Ok(SeasonalShares {
            files_used: used,
            files_skipped: skipped,
            ..shares
        })
    }

    pub fn aggregate_tables<'a>(
        &self,
        tables: impl IntoIterator<Item = &'a MeasurementTable>,
    ) -> Result<SeasonalShares> {
        let mut seasons = [MeanAccumulator::default(); 4];
        let (mut used, mut skipped) = (0, 0);
        for table in tables {
            if self.accumulate(table, &mut seasons) {
                used += 1;
            } else {
                skipped += 1;
            }
        }
        self.finalize(seasons, used, skipped)
    }

    pub fn run(&self) -> Result<SeasonalShares> {
        let files = discover_yearly_files(&self.data_dir, &self.file_prefix, &self.file_extension)?;
        let progress = ProgressReporter::for_files(files.len(), "Seasonal shares", !self.show_progress);

        let mut seasons = [MeanAccumulator::default(); 4];
        let (mut used, mut skipped) = (0, 0);
        for file in &files {
            let accepted = match self.reader.read_optional(&file.path, file.year)? {
                Some(table) => self.accumulate(&table, &mut seasons),
                None => false,
            };
            if accepted {
                used += 1;
            } else {
                skipped += 1;
            }
            progress.file_done(&file.path);
        }
        progress.finish_with_message("Seasonal shares computed");

        let shares = self.finalize(seasons, used, skipped)?;
        info!(
            pollutant = %self.pollutant,
            files_used = used,
            files_skipped = skipped,
            "Seasonal shares computed"
        );
        Ok(shares)
    }
}

/// Turn per-season accumulators into means and shares in canonical season order.
/// Seasons without data keep `None` and are left out of the total.
pub fn compute_shares(pollutant: &str, seasons: &[MeanAccumulator; 4]) -> SeasonalShares {
    let means: Vec<Option<f64>> = Season::ALL.iter().map(|s| seasons[s.index()].mean()).collect();
    let total: f64 = means.iter().flatten().sum();

    let seasons = Season::ALL
        .iter()
        .zip(means)
        .map(|(&season, mean)| SeasonalShare {
            season,
            mean,
            share: mean.filter(|_| total != 0.0).map(|m| m / total),
        })
        .collect();

    SeasonalShares {
        pollutant: pollutant.to_string(),
        files_used: 0,
        files_skipped: 0,
        seasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::utils::constants::SHARE_TOLERANCE;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(y: i32, m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn table(year: i32, pollutants: &[&str], rows: Vec<(u32, Vec<Option<f64>>)>) -> MeasurementTable {
        MeasurementTable::new(
            format!("madrid_{}.csv", year),
            Some(year),
            pollutants.iter().map(|p| p.to_string()).collect(),
        )
        .with_observations(
            rows.into_iter()
                .map(|(month, values)| Observation {
                    timestamp: ts(year, month),
                    station: None,
                    values,
                })
                .collect(),
        )
    }

    fn aggregator() -> SeasonalShareAggregator {
        SeasonalShareAggregator::from_config(&PipelineConfig::default().with_show_progress(false))
    }

    #[test]
    fn test_shares_sum_to_one() -> Result<()> {
        let tables = vec![
            table(2001, &["NO_2"], vec![(1, vec![Some(70.0)]), (4, vec![Some(45.0)]), (7, vec![Some(33.3)]), (10, vec![Some(51.7)])]),
            table(2002, &["NO_2"], vec![(2, vec![Some(64.1)]), (8, vec![Some(29.9)]), (11, vec![None])]),
        ];

        let shares = aggregator().aggregate_tables(&tables)?;
        let order: Vec<Season> = shares.seasons.iter().map(|s| s.season).collect();

        assert_eq!(order, Season::ALL.to_vec());
        assert!((shares.total_share() - 1.0).abs() < SHARE_TOLERANCE);
        assert_eq!(shares.seasons[0].mean, Some((70.0 + 64.1) / 2.0));
        Ok(())
    }

    #[test]
    fn test_files_without_pollutant_are_ignored() -> Result<()> {
        let mut tables = Vec::new();
        for year in 2001..=2010 {
            tables.push(table(year, &["NO_2", "PM10"], vec![(1, vec![Some(40.0), Some(10.0)]), (7, vec![Some(20.0), Some(30.0)])]));
        }
        for year in 2011..=2018 {
            tables.push(table(year, &["NO_2"], vec![(1, vec![Some(500.0)]), (7, vec![Some(500.0)])]));
        }

        let shares = aggregator().with_pollutant("PM10").aggregate_tables(&tables)?;

        assert_eq!(shares.files_used, 10);
        assert_eq!(shares.files_skipped, 8);
        assert_eq!(shares.seasons[0].mean, Some(10.0));
        assert_eq!(shares.seasons[1].mean, None);
        assert_eq!(shares.seasons[2].mean, Some(30.0));
        assert_eq!(shares.seasons[0].share, Some(0.25));
        assert_eq!(shares.seasons[2].share, Some(0.75));
        Ok(())
    }

    #[test]
    fn test_no_file_with_pollutant_fails() {
        let tables = vec![table(2001, &["NO_2"], vec![(1, vec![Some(40.0)])])];

        let err = aggregator().with_pollutant("SO_2").aggregate_tables(&tables).unwrap_err();
        assert!(matches!(err, ProcessingError::NoPollutantData { ref pollutant } if pollutant == "SO_2"));
    }

    #[test]
    fn test_all_zero_concentrations_fail() {
        let tables = vec![table(2001, &["NO_2"], vec![(1, vec![Some(0.0)])])];

        let err = aggregator().aggregate_tables(&tables).unwrap_err();
        assert!(matches!(err, ProcessingError::NoPollutantData { .. }));
    }

    #[test]
    fn test_column_without_values_fails() {
        let tables = vec![table(2001, &["NO_2"], vec![(1, vec![None])])];
        assert!(aggregator().aggregate_tables(&tables).is_err());
    }
}
