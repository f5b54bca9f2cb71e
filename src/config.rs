use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::*;
use crate::utils::filename::yearly_file_path;

/// Everything the aggregators need to know about the input layout and the
/// outputs they produce. Passed explicitly to each component.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,

    #[validate(length(min = 1))]
    pub file_prefix: String,

    #[validate(length(min = 1))]
    pub file_extension: String,

    pub stations_file: String,

    #[validate(length(min = 1))]
    pub date_column: String,

    #[validate(length(min = 1))]
    pub station_column: String,

    #[validate(length(min = 1))]
    pub annual_pollutants: Vec<String>,

    #[validate(length(min = 1))]
    pub share_pollutant: String,

    #[validate(range(min = 1900, max = 2100))]
    pub ranking_year: i32,

    #[validate(length(min = 1))]
    pub ranking_pollutants: Vec<String>,

    #[validate(length(min = 1))]
    pub trend_pollutants: Vec<String>,

    /// Pollutant shown first in charts with a pollutant dropdown.
    pub default_chart_pollutant: String,

    pub output_dir: PathBuf,
    pub annual_summary_file: String,
    pub seasonal_bar_chart_file: String,
    pub seasonal_pie_chart_file: String,
    pub station_chart_file: String,
    pub trend_chart_file: String,

    /// Open each chart in the system browser once written.
    pub auto_open: bool,

    /// Also write the annual summary and seasonal averages as Parquet.
    pub export_parquet: bool,

    /// snappy, gzip, lz4, zstd or none.
    #[validate(length(min = 1))]
    pub parquet_compression: String,

    /// Drop station metadata rows with an empty name or out-of-range coordinates.
    pub validate_stations: bool,

    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            stations_file: STATIONS_FILE.to_string(),
            date_column: DATE_COLUMN.to_string(),
            station_column: STATION_COLUMN.to_string(),
            annual_pollutants: to_strings(&ANNUAL_POLLUTANTS),
            share_pollutant: NITROGEN_DIOXIDE.to_string(),
            ranking_year: DEFAULT_RANKING_YEAR,
            ranking_pollutants: to_strings(&RANKING_POLLUTANTS),
            trend_pollutants: to_strings(&TREND_POLLUTANTS),
            default_chart_pollutant: NITROGEN_DIOXIDE.to_string(),
            output_dir: PathBuf::from("."),
            annual_summary_file: ANNUAL_SUMMARY_FILE.to_string(),
            seasonal_bar_chart_file: SEASONAL_BAR_CHART_FILE.to_string(),
            seasonal_pie_chart_file: SEASONAL_PIE_CHART_FILE.to_string(),
            station_chart_file: STATION_CHART_FILE.to_string(),
            trend_chart_file: TREND_CHART_FILE.to_string(),
            auto_open: true,
            export_parquet: false,
            parquet_compression: DEFAULT_PARQUET_COMPRESSION.to_string(),
            validate_stations: true,
            show_progress: true,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PipelineConfig {
    /// Build the configuration from the defaults, optionally overridden by a
    /// settings file (TOML, YAML or JSON, detected from the extension).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&PipelineConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading settings file");
            builder = builder.add_source(config::File::from(path));
        }

        let settings: PipelineConfig = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_auto_open(mut self, auto_open: bool) -> Self {
        self.auto_open = auto_open;
        self
    }

    pub fn with_show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn stations_path(&self) -> PathBuf {
        self.data_dir.join(&self.stations_file)
    }

    pub fn ranking_file_path(&self) -> PathBuf {
        yearly_file_path(
            &self.data_dir,
            &self.file_prefix,
            self.ranking_year,
            &self.file_extension,
        )
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ranking_file_path(), PathBuf::from("VDS2425_Madrid/madrid_2018.csv"));
        assert_eq!(config.stations_path(), PathBuf::from("VDS2425_Madrid/stations.csv"));
    }

    #[test]
    fn test_load_without_file_returns_defaults() -> Result<()> {
        let config = PipelineConfig::load(None)?;
        assert_eq!(config.share_pollutant, "NO_2");
        assert_eq!(config.ranking_pollutants, vec!["NO", "NO_2", "NOx"]);
        assert!(config.auto_open);
        assert_eq!(config.parquet_compression, "snappy");
        assert!(config.validate_stations);
        Ok(())
    }

    #[test]
    fn test_load_overrides_from_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "data_dir = \"input\"\nranking_year = 2010\nauto_open = false\nshare_pollutant = \"PM10\"\n",
        )?;

        let config = PipelineConfig::load(Some(&path))?;
        assert_eq!(config.data_dir, PathBuf::from("input"));
        assert_eq!(config.ranking_year, 2010);
        assert_eq!(config.share_pollutant, "PM10");
        assert!(!config.auto_open);
        assert_eq!(config.file_prefix, "madrid");
        Ok(())
    }

    #[test]
    fn test_export_settings_from_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "export_parquet = true\nparquet_compression = \"zstd\"\nvalidate_stations = false\n",
        )?;

        let config = PipelineConfig::load(Some(&path))?;
        assert!(config.export_parquet);
        assert_eq!(config.parquet_compression, "zstd");
        assert!(!config.validate_stations);
        Ok(())
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "ranking_year = 1500\n").unwrap();

        assert!(PipelineConfig::load(Some(&path)).is_err());
    }
}
