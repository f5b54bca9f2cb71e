use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{AnnualAverage, MeanAccumulator, MeasurementTable};
use crate::readers::MeasurementReader;
use crate::utils::filename::{discover_yearly_files, yearly_file_pattern};
use crate::utils::progress::ProgressReporter;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Per-year mean concentration of the tracked pollutants.
pub struct AnnualAggregator {
    pollutants: Vec<String>,
    data_dir: PathBuf,
    file_prefix: String,
    file_extension: String,
    reader: MeasurementReader,
    show_progress: bool,
}

impl AnnualAggregator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            pollutants: config.annual_pollutants.clone(),
            data_dir: config.data_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
            reader: MeasurementReader::from_config(config),
            show_progress: config.show_progress,
        }
    }

    /// Average one year's table. Only rows dated within the declared year count.
    ///
    /// Returns `None` when the table has no year tag, none of the tracked
    /// pollutants, no row inside the declared year, or no values at all.
    pub fn annual_average(&self, table: &MeasurementTable) -> Option<AnnualAverage> {
        let year = table.year_tag?;

        let tracked: Vec<(&str, usize)> = self
            .pollutants
            .iter()
            .filter_map(|p| table.pollutant_index(p).map(|idx| (p.as_str(), idx)))
            .collect();
        if tracked.is_empty() {
            debug!(year, path = %table.source.display(), "No tracked pollutants present, skipping year");
            return None;
        }

        let mut accumulators = vec![MeanAccumulator::default(); tracked.len()];
        let mut rows = 0usize;
        for obs in table.observations_in_declared_year() {
            rows += 1;
            for (acc, (_, idx)) in accumulators.iter_mut().zip(&tracked) {
                acc.push_opt(obs.values.get(*idx).copied().flatten());
            }
        }

        if rows == 0 {
            debug!(year, path = %table.source.display(), "No rows dated within declared year, skipping year");
            return None;
        }

        let mut average = AnnualAverage::new(year);
        for (acc, (pollutant, _)) in accumulators.iter().zip(&tracked) {
            if let Some(mean) = acc.mean() {
                average.means.insert(pollutant.to_string(), mean);
            }
        }

        if average.means.is_empty() {
            debug!(year, "Tracked pollutants carry no values, skipping year");
            return None;
        }

        Some(average)
    }

    /// Average every table, one row per year sorted ascending. A second table
    /// declaring an already seen year is ignored.
    pub fn aggregate_tables<'a>(
        &self,
        tables: impl IntoIterator<Item = &'a MeasurementTable>,
    ) -> Vec<AnnualAverage> {
        let mut by_year: BTreeMap<i32, AnnualAverage> = BTreeMap::new();
        for table in tables {
            if let Some(average) = self.annual_average(table) {
                insert_year(&mut by_year, average, table);
            }
        }
        by_year.into_values().collect()
    }

    /// Discover, read and average every yearly file in the data directory.
    pub fn run(&self) -> Result<Vec<AnnualAverage>> {
        let files = discover_yearly_files(&self.data_dir, &self.file_prefix, &self.file_extension)?;
        let progress = ProgressReporter::for_files(files.len(), "Annual averages", !self.show_progress);

        let mut by_year: BTreeMap<i32, AnnualAverage> = BTreeMap::new();
        let mut used = 0usize;
        for file in &files {
            let Some(year) = file.year else {
                debug!(path = %file.path.display(), "No year in file name, skipping");
                progress.file_done(&file.path);
                continue;
            };

            if let Some(table) = self.reader.read_optional(&file.path, Some(year))? {
                used += 1;
                if let Some(average) = self.annual_average(&table) {
                    insert_year(&mut by_year, average, &table);
                }
            }
            progress.file_done(&file.path);
        }

        progress.finish_with_message("Annual averages computed");

        if used == 0 {
            return Err(ProcessingError::NoUsableFiles {
                pattern: yearly_file_pattern(&self.data_dir, &self.file_prefix, &self.file_extension),
            });
        }

        info!(years = by_year.len(), files = files.len(), "Annual summary computed");
        Ok(by_year.into_values().collect())
    }
}

fn insert_year(
    by_year: &mut BTreeMap<i32, AnnualAverage>,
    average: AnnualAverage,
    table: &MeasurementTable,
) {
    if by_year.contains_key(&average.year) {
        warn!(
            year = average.year,
            path = %table.source.display(),
            "Year already summarized by another file, ignoring"
        );
        return;
    }
    by_year.insert(average.year, average);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn ts(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn obs(timestamp: Option<NaiveDateTime>, values: Vec<Option<f64>>) -> Observation {
        Observation {
            timestamp,
            station: None,
            values,
        }
    }

    fn aggregator() -> AnnualAggregator {
        AnnualAggregator::from_config(&PipelineConfig::default().with_show_progress(false))
    }

    #[test]
    fn test_absent_pollutant_is_omitted() {
        let table = MeasurementTable::new("madrid_2005.csv", Some(2005), vec!["NO_2".into(), "PM10".into(), "BEN".into()])
            .with_observations(vec![
                obs(ts(2005, 1, 1), vec![Some(40.0), Some(20.0), Some(1.0)]),
                obs(ts(2005, 6, 1), vec![Some(60.0), None, Some(1.0)]),
            ]);

        let average = aggregator().annual_average(&table).unwrap();

        assert_eq!(average.year, 2005);
        assert_eq!(average.get("NO_2"), Some(50.0));
        assert_eq!(average.get("PM10"), Some(20.0));
        assert_eq!(average.get("O_3"), None);
        assert_eq!(average.get("BEN"), None);
        assert_eq!(average.means.len(), 2);
    }

    #[test]
    fn test_mislabeled_year_is_skipped() {
        let table = MeasurementTable::new("madrid_2010.csv", Some(2010), vec!["NO_2".into()])
            .with_observations(vec![
                obs(ts(2011, 1, 1), vec![Some(40.0)]),
                obs(ts(2011, 2, 1), vec![Some(42.0)]),
            ]);

        assert!(aggregator().annual_average(&table).is_none());
    }

    #[test]
    fn test_rows_outside_declared_year_are_excluded() {
        let table = MeasurementTable::new("madrid_2010.csv", Some(2010), vec!["NO_2".into()])
            .with_observations(vec![
                obs(ts(2010, 12, 31), vec![Some(10.0)]),
                obs(ts(2011, 1, 1), vec![Some(1000.0)]),
                obs(None, vec![Some(1000.0)]),
            ]);

        let average = aggregator().annual_average(&table).unwrap();
        assert_eq!(average.get("NO_2"), Some(10.0));
    }

    #[test]
    fn test_no_tracked_pollutants_skips_year() {
        let table = MeasurementTable::new("madrid_2003.csv", Some(2003), vec!["BEN".into()])
            .with_observations(vec![obs(ts(2003, 1, 1), vec![Some(1.0)])]);

        assert!(aggregator().annual_average(&table).is_none());
    }

    #[test]
    fn test_output_sorted_and_unique() {
        let make = |year: i32, value: f64| {
            MeasurementTable::new(format!("madrid_{}.csv", year), Some(year), vec!["NO_2".into()])
                .with_observations(vec![obs(ts(year, 3, 1), vec![Some(value)])])
        };
        let tables = vec![make(2003, 3.0), make(2001, 1.0), make(2002, 2.0), make(2001, 99.0)];

        let rows = aggregator().aggregate_tables(&tables);
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();

        assert_eq!(years, vec![2001, 2002, 2003]);
        assert_eq!(rows[0].get("NO_2"), Some(1.0));
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

        let err = AnnualAggregator::from_config(&config).run().unwrap_err();
        assert!(matches!(err, ProcessingError::NoUsableFiles { .. }));
    }

    #[test]
    fn test_empty_year_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("madrid_2010.csv"),
            "date,station,NO_2\n2011-03-01,1,99.0\n",
        )
        .unwrap();
        let config = PipelineConfig::default()
            .with_data_dir(dir.path())
            .with_show_progress(false);

        let rows = AnnualAggregator::from_config(&config).run().unwrap();
        assert!(rows.is_empty());
    }
}
