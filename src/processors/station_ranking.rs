use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{MeanAccumulator, MeasurementTable, StationMean, StationMetadata, StationRanking};
use crate::readers::{MeasurementReader, StationReader};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{info, warn};

/// Per-station mean concentration for a fixed set of pollutants, one
/// descending list per pollutant.
pub struct StationRankingAggregator {
    pollutants: Vec<String>,
    measurements_path: PathBuf,
    stations_path: PathBuf,
    validate_stations: bool,
    reader: MeasurementReader,
}

impl StationRankingAggregator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            pollutants: config.ranking_pollutants.clone(),
            measurements_path: config.ranking_file_path(),
            stations_path: config.stations_path(),
            validate_stations: config.validate_stations,
            reader: MeasurementReader::from_config(config),
        }
    }

    pub fn pollutants(&self) -> &[String] {
        &self.pollutants
    }

    /// Rank the stations of one table. Stations without metadata are labelled
    /// with their raw identifier; a station with no value for a pollutant is
    /// left out of that pollutant's list only.
    pub fn rank(
        &self,
        table: &MeasurementTable,
        stations: &HashMap<String, StationMetadata>,
    ) -> Vec<StationRanking> {
        let columns: Vec<Option<usize>> = self
            .pollutants
            .iter()
            .map(|p| {
                let idx = table.pollutant_index(p);
                if idx.is_none() {
                    warn!(pollutant = %p, path = %table.source.display(), "Pollutant column missing, ranking will be empty");
                }
                idx
            })
            .collect();

        let mut per_station: BTreeMap<&str, Vec<MeanAccumulator>> = BTreeMap::new();
        for obs in &table.observations {
            let Some(station) = obs.station.as_deref() else {
                continue;
            };
            let accs = per_station
                .entry(station)
                .or_insert_with(|| vec![MeanAccumulator::default(); columns.len()]);
            for (acc, column) in accs.iter_mut().zip(&columns) {
                if let Some(idx) = column {
                    acc.push_opt(obs.values.get(*idx).copied().flatten());
                }
            }
        }

        self.pollutants
            .iter()
            .enumerate()
            .map(|(p, pollutant)| {
                let mut entries: Vec<StationMean> = per_station
                    .iter()
                    .filter_map(|(&station_id, accs)| {
                        accs[p].mean().map(|mean| StationMean {
                            station_id: station_id.to_string(),
                            name: display_name(station_id, stations),
                            mean,
                        })
                    })
                    .collect();

                entries.sort_by(|a, b| {
                    b.mean
                        .total_cmp(&a.mean)
                        .then_with(|| a.name.cmp(&b.name))
                        .then_with(|| a.station_id.cmp(&b.station_id))
                });

                StationRanking {
                    pollutant: pollutant.clone(),
                    entries,
                }
            })
            .collect()
    }

    /// Read the ranking year's measurements and the station metadata, then rank.
    /// A missing metadata file only costs the display names. Fails when the
    /// measurement file has no date column, since `read_table` requires one.
    pub fn run(&self) -> Result<Vec<StationRanking>> {
        let table = self.reader.read_table(&self.measurements_path, None)?;

        let stations = if self.stations_path.exists() {
            StationReader::with_validation(self.validate_stations).read_stations_map(&self.stations_path)?
        } else {
            warn!(path = %self.stations_path.display(), "Station metadata not found, using station identifiers as names");
            HashMap::new()
        };

        let rankings = self.rank(&table, &stations);
        for ranking in &rankings {
            info!(pollutant = %ranking.pollutant, stations = ranking.entries.len(), "Station ranking computed");
        }
        Ok(rankings)
    }
}

fn display_name(station_id: &str, stations: &HashMap<String, StationMetadata>) -> String {
    stations
        .get(station_id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| station_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use pretty_assertions::assert_eq;

    fn obs(station: &str, values: Vec<Option<f64>>) -> Observation {
        Observation {
            timestamp: None,
            station: Some(station.to_string()),
            values,
        }
    }

    fn aggregator() -> StationRankingAggregator {
        StationRankingAggregator::from_config(&PipelineConfig::default())
    }

    #[test]
    fn test_missing_values_drop_station_per_pollutant() {
        let table = MeasurementTable::new("madrid_2018.csv", Some(2018), vec!["NO".into(), "NO_2".into(), "NOx".into()])
            .with_observations(vec![
                obs("A", vec![Some(5.0), Some(20.0), Some(50.0)]),
                obs("A", vec![Some(7.0), Some(40.0), Some(70.0)]),
                obs("B", vec![Some(9.0), Some(10.0), None]),
            ]);
        let mut stations = HashMap::new();
        stations.insert("A".to_string(), StationMetadata::new("A", "Plaza A"));

        let rankings = aggregator().rank(&table, &stations);
        assert_eq!(rankings.len(), 3);

        let no2 = &rankings[1];
        assert_eq!(no2.pollutant, "NO_2");
        let names: Vec<&str> = no2.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Plaza A", "B"]);
        assert_eq!(no2.entries[0].mean, 30.0);

        let nox = &rankings[2];
        assert_eq!(nox.entries.len(), 1);
        assert!(nox.contains("A"));
        assert!(!nox.contains("B"));

        let no = &rankings[0];
        assert_eq!(no.entries[0].station_id, "B");
    }

    #[test]
    fn test_missing_column_gives_empty_ranking() {
        let table = MeasurementTable::new("madrid_2018.csv", Some(2018), vec!["NO_2".into()])
            .with_observations(vec![obs("A", vec![Some(20.0)]), Observation { timestamp: None, station: None, values: vec![Some(99.0)] }]);

        let rankings = aggregator().rank(&table, &HashMap::new());
        assert!(rankings[0].entries.is_empty());
        assert_eq!(rankings[1].entries.len(), 1);
        assert_eq!(rankings[1].entries[0].name, "A");
        assert!(rankings[2].entries.is_empty());
    }
}
