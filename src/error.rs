use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("No input files match {pattern}")]
    MissingInput { pattern: String },

    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("No usable measurement file among {pattern}")]
    NoUsableFiles { pattern: String },

    #[error("No data found for pollutant '{pollutant}'")]
    NoPollutantData { pollutant: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("{} pipeline step(s) failed: {}", steps.len(), steps.join(", "))]
    StepsFailed { steps: Vec<String> },
}

impl ProcessingError {
    /// Soft errors skip a single input file instead of aborting the aggregator.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ProcessingError::MissingColumn { .. })
    }
}
