use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{MeanAccumulator, MeasurementTable, Season, SeasonalAverage};
use crate::readers::MeasurementReader;
use crate::utils::filename::{discover_yearly_files, yearly_file_pattern};
use crate::utils::progress::ProgressReporter;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::info;

type GroupKey = (i32, Season, String);

/// Dense ranking of `values` in descending order: the largest value gets 1,
/// equal values share a rank and the next distinct value follows without a gap.
pub fn dense_rank_descending(values: &[f64]) -> Vec<u32> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    values
        .iter()
        .map(|v| {
            let position = distinct
                .iter()
                .position(|d| d == v)
                .unwrap_or(distinct.len());
            position as u32 + 1
        })
        .collect()
}

/// Seasonal mean per (year, season, pollutant) with each season ranked
/// against the other seasons of the same year and pollutant.
///
/// The year comes from each observation's own timestamp, not from the file name.
pub struct SeasonalAggregator {
    data_dir: PathBuf,
    file_prefix: String,
    file_extension: String,
    reader: MeasurementReader,
    show_progress: bool,
}

impl SeasonalAggregator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
            reader: MeasurementReader::from_config(config),
            show_progress: config.show_progress,
        }
    }

    fn accumulate(table: &MeasurementTable, groups: &mut BTreeMap<GroupKey, MeanAccumulator>) {
        for record in table.melt() {
            groups
                .entry((record.year, record.season, record.pollutant.to_string()))
                .or_default()
                .push(record.value);
        }
    }

    fn finalize(groups: BTreeMap<GroupKey, MeanAccumulator>) -> Vec<SeasonalAverage> {
        let mut averages: Vec<SeasonalAverage> = groups
            .into_iter()
            .filter_map(|((year, season, pollutant), acc)| {
                acc.mean().map(|mean| SeasonalAverage {
                    year,
                    season,
                    pollutant,
                    mean,
                    rank: 0,
                })
            })
            .collect();

        let mut members: HashMap<(i32, String), Vec<usize>> = HashMap::new();
        for (i, avg) in averages.iter().enumerate() {
            members
                .entry((avg.year, avg.pollutant.clone()))
                .or_default()
                .push(i);
        }

        for indices in members.values() {
            let means: Vec<f64> = indices.iter().map(|&i| averages[i].mean).collect();
            for (&i, rank) in indices.iter().zip(dense_rank_descending(&means)) {
                averages[i].rank = rank;
            }
        }

        averages
    }

    /// Aggregate already loaded tables. Output is ordered by year, season, pollutant.
    pub fn aggregate_tables<'a>(
        &self,
        tables: impl IntoIterator<Item = &'a MeasurementTable>,
    ) -> Vec<SeasonalAverage> {
        let mut groups = BTreeMap::new();
        for table in tables {
            Self::accumulate(table, &mut groups);
        }
        Self::finalize(groups)
    }

    /// Read every yearly file and aggregate. Fails when no file matches the
    /// pattern or when every matching file had to be skipped.
    pub fn run(&self) -> Result<Vec<SeasonalAverage>> {
        let files = discover_yearly_files(&self.data_dir, &self.file_prefix, &self.file_extension)?;
        let progress = ProgressReporter::for_files(files.len(), "Seasonal averages", !self.show_progress);

        let mut groups = BTreeMap::new();
        let mut used = 0usize;
        for file in &files {
            if let Some(table) = self.reader.read_optional(&file.path, file.year)? {
                Self::accumulate(&table, &mut groups);
                used += 1;
            }
            progress.file_done(&file.path);
        }
        progress.finish_with_message("Seasonal averages computed");

        if used == 0 {
            return Err(ProcessingError::NoUsableFiles {
                pattern: yearly_file_pattern(&self.data_dir, &self.file_prefix, &self.file_extension),
            });
        }

        let averages = Self::finalize(groups);
        info!(files = used, groups = averages.len(), "Seasonal averages computed");
        Ok(averages)
    }
}

/// Pollutants present in a seasonal table, sorted by name.
pub fn pollutants_of(averages: &[SeasonalAverage]) -> Vec<String> {
    let mut pollutants: Vec<String> = averages.iter().map(|a| a.pollutant.clone()).collect();
    pollutants.sort();
    pollutants.dedup();
    pollutants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn ts(y: i32, m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, 15).and_then(|d| d.and_hms_opt(12, 0, 0))
    }

    fn obs(timestamp: Option<NaiveDateTime>, values: Vec<Option<f64>>) -> Observation {
        Observation {
            timestamp,
            station: Some("1".into()),
            values,
        }
    }

    fn aggregator() -> SeasonalAggregator {
        SeasonalAggregator::from_config(&PipelineConfig::default().with_show_progress(false))
    }

    #[test]
    fn test_dense_rank_descending() {
        assert_eq!(dense_rank_descending(&[10.0, 30.0, 20.0, 5.0]), vec![3, 1, 2, 4]);
        assert_eq!(dense_rank_descending(&[10.0, 30.0, 30.0, 5.0]), vec![2, 1, 1, 3]);
        assert_eq!(dense_rank_descending(&[7.0, 7.0, 7.0, 7.0]), vec![1, 1, 1, 1]);
        assert_eq!(dense_rank_descending(&[]), Vec::<u32>::new());
    }

    #[test]
    fn test_seasonal_means_and_ranks() {
        let table = MeasurementTable::new("madrid_2015.csv", Some(2015), vec!["NO_2".into(), "O_3".into()])
            .with_observations(vec![
                obs(ts(2015, 1), vec![Some(60.0), Some(20.0)]),
                obs(ts(2015, 12), vec![Some(40.0), None]),
                obs(ts(2015, 4), vec![Some(30.0), Some(50.0)]),
                obs(ts(2015, 7), vec![Some(20.0), Some(80.0)]),
                obs(ts(2015, 10), vec![Some(50.0), Some(20.0)]),
                obs(None, vec![Some(1000.0), Some(1000.0)]),
            ]);

        let averages = aggregator().aggregate_tables([&table]);
        assert_eq!(averages.len(), 8);

        let no2: Vec<(Season, f64, u32)> = averages
            .iter()
            .filter(|a| a.pollutant == "NO_2")
            .map(|a| (a.season, a.mean, a.rank))
            .collect();
        assert_eq!(
            no2,
            vec![
                (Season::Winter, 50.0, 1),
                (Season::Spring, 30.0, 2),
                (Season::Summer, 20.0, 3),
                (Season::Fall, 50.0, 1),
            ]
        );

        let o3_ranks: Vec<u32> = averages
            .iter()
            .filter(|a| a.pollutant == "O_3")
            .map(|a| a.rank)
            .collect();
        assert_eq!(o3_ranks, vec![3, 2, 1, 3]);
    }

    #[test]
    fn test_year_comes_from_timestamp() {
        let table = MeasurementTable::new("madrid_2010.csv", Some(2010), vec!["NO_2".into()])
            .with_observations(vec![obs(ts(2011, 2), vec![Some(10.0)])]);

        let averages = aggregator().aggregate_tables([&table]);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].year, 2011);
        assert_eq!(averages[0].rank, 1);
    }

    #[test]
    fn test_ranks_are_dense_within_each_group() {
        let tables: Vec<MeasurementTable> = (2001..=2003)
            .map(|year| {
                MeasurementTable::new(format!("madrid_{}.csv", year), Some(year), vec!["PM10".into()])
                    .with_observations(
                        (1..=12)
                            .map(|m| obs(ts(year, m), vec![Some(((m * year as u32) % 7) as f64)]))
                            .collect(),
                    )
            })
            .collect();

        let averages = aggregator().aggregate_tables(&tables);
        for year in 2001..=2003 {
            let group: Vec<&SeasonalAverage> = averages.iter().filter(|a| a.year == year).collect();
            let mut ranks: Vec<u32> = group.iter().map(|a| a.rank).collect();
            ranks.sort();
            ranks.dedup();
            assert_eq!(ranks, (1..=ranks.len() as u32).collect::<Vec<_>>());

            let top = group.iter().filter(|a| a.rank == 1).map(|a| a.mean).next().unwrap();
            assert!(group.iter().all(|a| a.mean <= top));
        }
    }

    #[test]
    fn test_pollutants_of() {
        let averages = vec![
            SeasonalAverage { year: 2001, season: Season::Winter, pollutant: "O_3".into(), mean: 1.0, rank: 1 },
            SeasonalAverage { year: 2001, season: Season::Winter, pollutant: "NO_2".into(), mean: 1.0, rank: 1 },
            SeasonalAverage { year: 2002, season: Season::Winter, pollutant: "O_3".into(), mean: 1.0, rank: 1 },
        ];
        assert_eq!(pollutants_of(&averages), vec!["NO_2", "O_3"]);
    }

    fn write_undated_files(dir: &std::path::Path) {
        for year in [2001, 2002] {
            std::fs::write(
                dir.join(format!("madrid_{}.csv", year)),
                "fecha,station,NO_2\n2001-01-01 01:00:00,28079004,40.0\n",
            )
            .unwrap();
        }
    }

    #[test]
    fn test_every_file_skipped_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        write_undated_files(dir.path());
        let config = PipelineConfig::default()
            .with_data_dir(dir.path())
            .with_show_progress(false);

        let err = SeasonalAggregator::from_config(&config).run().unwrap_err();
        assert!(matches!(err, ProcessingError::NoUsableFiles { .. }));
    }
}
