use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// One row of the station metadata file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[serde(alias = "station", alias = "station_id")]
    pub id: String,

    #[validate(length(min = 1))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<String>,

    #[serde(default, alias = "lon", deserialize_with = "empty_as_none")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[serde(default, alias = "lat", deserialize_with = "empty_as_none")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub elevation: Option<f64>,
}

impl StationMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            longitude: None,
            latitude: None,
            elevation: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Join key shared with the `station` column of measurement files.
    pub fn key(&self) -> String {
        normalize_station_id(&self.id)
    }
}

/// Normalize a station identifier so that `28079004`, ` 28079004 ` and
/// `28079004.0` all refer to the same station.
pub fn normalize_station_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        _ => trimmed.to_string(),
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<T>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationMetadata::new("28079004", "Pza. de España").with_coordinates(40.4238, -3.7122);
        assert!(station.validate().is_ok());
        assert_eq!(station.key(), "28079004");
    }

    #[test]
    fn test_invalid_coordinates() {
        let station = StationMetadata::new("1", "Invalid Station").with_coordinates(91.0, -3.7);
        assert!(station.validate().is_err());
    }

    #[test]
    fn test_normalize_station_id() {
        assert_eq!(normalize_station_id(" 28079004 "), "28079004");
        assert_eq!(normalize_station_id("28079004.0"), "28079004");
        assert_eq!(normalize_station_id("ES1422A"), "ES1422A");
    }
}
