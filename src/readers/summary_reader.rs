use crate::error::{ProcessingError, Result};
use crate::models::AnnualAverage;
use crate::readers::measurement_reader::parse_concentration;
use std::path::Path;

/// Reads the annual summary table back for trend analysis.
pub struct SummaryReader;

impl SummaryReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse an annual summary CSV. The `year` column is required; every other
    /// column is a pollutant and empty cells are treated as absent.
    pub fn read_annual_summary(&self, path: &Path) -> Result<Vec<AnnualAverage>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let year_idx = headers
            .iter()
            .position(|h| h == "year")
            .ok_or_else(|| ProcessingError::MissingColumn {
                path: path.to_path_buf(),
                column: "year".to_string(),
            })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let raw_year = record.get(year_idx).unwrap_or_default();
            let year = raw_year
                .parse::<f64>()
                .ok()
                .filter(|y| y.fract() == 0.0)
                .map(|y| y as i32)
                .ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!("Invalid year: '{}'", raw_year))
                })?;

            let mut row = AnnualAverage::new(year);
            for (i, header) in headers.iter().enumerate() {
                if i == year_idx {
                    continue;
                }
                if let Some(value) = record.get(i).and_then(parse_concentration) {
                    row.means.insert(header.to_string(), value);
                }
            }
            rows.push(row);
        }

        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }
}

impl Default for SummaryReader {
    fn default() -> Self {
        Self::new()
    }
}
