use chrono::{Datelike, NaiveDateTime};
use std::path::PathBuf;

use crate::models::Season;

/// A single timestamped row of a measurement file.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `None` when the date cell could not be parsed.
    pub timestamp: Option<NaiveDateTime>,
    pub station: Option<String>,
    /// Concentrations aligned with [`MeasurementTable::pollutants`].
    pub values: Vec<Option<f64>>,
}

impl Observation {
    pub fn year(&self) -> Option<i32> {
        self.timestamp.map(|ts| ts.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.month())
    }

    pub fn season(&self) -> Option<Season> {
        self.month().and_then(Season::from_month)
    }
}

/// One measurement file materialized in memory.
///
/// The set of pollutant columns is discovered at read time, so every
/// consumer must handle a pollutant being absent from a given table.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub source: PathBuf,
    /// Year declared by the file name, if the caller supplied one.
    pub year_tag: Option<i32>,
    pub pollutants: Vec<String>,
    pub observations: Vec<Observation>,
    /// Rows whose date cell failed to parse.
    pub unparsed_dates: usize,
}

impl MeasurementTable {
    pub fn new(source: impl Into<PathBuf>, year_tag: Option<i32>, pollutants: Vec<String>) -> Self {
        Self {
            source: source.into(),
            year_tag,
            pollutants,
            observations: Vec::new(),
            unparsed_dates: 0,
        }
    }

    pub fn with_observations(mut self, observations: Vec<Observation>) -> Self {
        self.observations = observations;
        self
    }

    pub fn pollutant_index(&self, pollutant: &str) -> Option<usize> {
        self.pollutants.iter().position(|p| p == pollutant)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations whose parsed date agrees with the declared year.
    /// Without a year tag every dated observation is kept.
    pub fn observations_in_declared_year(&self) -> impl Iterator<Item = &Observation> + '_ {
        let tag = self.year_tag;
        self.observations.iter().filter(move |obs| match (obs.year(), tag) {
            (Some(year), Some(tag)) => year == tag,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }

    /// Wide to long reshape: one `(year, season, pollutant, value)` row per
    /// non-missing cell of a dated observation.
    pub fn melt(&self) -> Vec<LongRecord<'_>> {
        let mut records = Vec::new();
        for obs in &self.observations {
            let (Some(year), Some(season)) = (obs.year(), obs.season()) else {
                continue;
            };
            for (pollutant, value) in self.pollutants.iter().zip(&obs.values) {
                if let Some(value) = value {
                    records.push(LongRecord {
                        year,
                        season,
                        pollutant: pollutant.as_str(),
                        value: *value,
                    });
                }
            }
        }
        records
    }
}

/// Long-form row produced by [`MeasurementTable::melt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongRecord<'a> {
    pub year: i32,
    pub season: Season,
    pub pollutant: &'a str,
    pub value: f64,
}
