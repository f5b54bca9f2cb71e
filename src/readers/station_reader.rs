use crate::error::Result;
use crate::models::StationMetadata;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use validator::Validate;

pub struct StationReader {
    validate: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { validate: true }
    }

    pub fn with_validation(validate: bool) -> Self {
        Self { validate }
    }

    /// Read station metadata from the stations CSV file.
    /// Malformed rows are logged and skipped.
    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationMetadata>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;

        let mut stations = Vec::new();
        for (line, result) in reader.deserialize::<StationMetadata>().enumerate() {
            let station = match result {
                Ok(station) => station,
                Err(e) => {
                    warn!(path = %path.display(), line = line + 2, "Skipping station row: {}", e);
                    continue;
                }
            };

            if self.validate {
                if let Err(e) = station.validate() {
                    warn!(station = %station.id, "Station metadata failed validation: {}", e);
                    continue;
                }
            }

            stations.push(station);
        }

        debug!(path = %path.display(), count = stations.len(), "Read station metadata");
        Ok(stations)
    }

    /// Read station metadata keyed by normalized station identifier.
    pub fn read_stations_map(&self, path: &Path) -> Result<HashMap<String, StationMetadata>> {
        let stations = self.read_stations(path)?;
        let mut map = HashMap::with_capacity(stations.len());

        for station in stations {
            map.insert(station.key(), station);
        }

        Ok(map)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
