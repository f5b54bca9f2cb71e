use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{normalize_station_id, MeasurementTable, Observation};
use crate::utils::constants::{DATE_COLUMN, HOUSEKEEPING_COLUMNS, STATION_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, warn};

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

/// Parse a date cell leniently. Anything unrecognized yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a concentration cell. Empty, `NaN` and non-numeric cells are missing.
pub fn parse_concentration(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Loads one yearly measurement file into a [`MeasurementTable`].
pub struct MeasurementReader {
    date_column: String,
    station_column: String,
    excluded_columns: Vec<String>,
}

impl MeasurementReader {
    pub fn new() -> Self {
        Self {
            date_column: DATE_COLUMN.to_string(),
            station_column: STATION_COLUMN.to_string(),
            excluded_columns: HOUSEKEEPING_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            station_column: config.station_column.clone(),
            ..Self::new()
        }
    }

    fn is_pollutant_column(&self, column: &str) -> bool {
        !column.is_empty()
            && column != self.date_column
            && column != self.station_column
            && !self.excluded_columns.iter().any(|c| c == column)
    }

    /// Read a measurement file, tagging it with the year declared by its name.
    ///
    /// Returns [`ProcessingError::MissingColumn`] when the file has no date column.
    pub fn read_table(&self, path: &Path, year_tag: Option<i32>) -> Result<MeasurementTable> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h == self.date_column)
            .ok_or_else(|| ProcessingError::MissingColumn {
                path: path.to_path_buf(),
                column: self.date_column.clone(),
            })?;
        let station_idx = headers.iter().position(|h| h == self.station_column);

        let (pollutant_idx, pollutants): (Vec<usize>, Vec<String>) = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| self.is_pollutant_column(h))
            .map(|(i, h)| (i, h.to_string()))
            .unzip();

        let mut table = MeasurementTable::new(path, year_tag, pollutants);

        for record in reader.records() {
            let record = record?;

            let timestamp = record.get(date_idx).and_then(parse_timestamp);
            if timestamp.is_none() {
                table.unparsed_dates += 1;
            }

            let station = station_idx
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(normalize_station_id);

            let values = pollutant_idx
                .iter()
                .map(|&i| record.get(i).and_then(parse_concentration))
                .collect();

            table.observations.push(Observation {
                timestamp,
                station,
                values,
            });
        }

        if table.unparsed_dates > 0 {
            debug!(
                path = %path.display(),
                rows = table.unparsed_dates,
                "Rows with unparseable dates excluded from date-based aggregation"
            );
        }
        debug!(
            path = %path.display(),
            rows = table.len(),
            pollutants = table.pollutants.len(),
            "Loaded measurement table"
        );

        Ok(table)
    }

    /// Like [`read_table`](Self::read_table) but treats a missing date column
    /// as a skipped file rather than an error.
    pub fn read_optional(&self, path: &Path, year_tag: Option<i32>) -> Result<Option<MeasurementTable>> {
        match self.read_table(path, year_tag) {
            Ok(table) => Ok(Some(table)),
            Err(e) if e.is_skippable() => {
                warn!(path = %path.display(), "{}. Skipping...", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for MeasurementReader {
    fn default() -> Self {
        Self::new()
    }
}
