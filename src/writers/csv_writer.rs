use crate::error::Result;
use crate::models::AnnualAverage;
use std::path::Path;
use tracing::info;

/// Writes the annual summary table consumed by the trend chart.
pub struct SummaryWriter {
    pollutant_order: Vec<String>,
}

impl SummaryWriter {
    /// `pollutant_order` fixes the column order; pollutants that appear in no
    /// row are not written.
    pub fn new(pollutant_order: Vec<String>) -> Self {
        Self { pollutant_order }
    }

    pub fn columns(&self, rows: &[AnnualAverage]) -> Vec<String> {
        let mut columns: Vec<String> = self
            .pollutant_order
            .iter()
            .filter(|p| rows.iter().any(|r| r.means.contains_key(p.as_str())))
            .cloned()
            .collect();

        // Anything outside the configured order goes last, alphabetically
        let mut extra: Vec<String> = rows
            .iter()
            .flat_map(|r| r.means.keys())
            .filter(|p| !self.pollutant_order.contains(*p))
            .cloned()
            .collect();
        extra.sort();
        extra.dedup();
        columns.extend(extra);
        columns
    }

    /// Overwrite `path` with one row per year: `year` followed by the pollutant columns.
    pub fn write_annual(&self, rows: &[AnnualAverage], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let columns = self.columns(rows);
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["year".to_string()];
        header.extend(columns.iter().cloned());
        writer.write_record(&header)?;

        for row in rows {
            let mut record = vec![row.year.to_string()];
            record.extend(
                columns
                    .iter()
                    .map(|p| row.get(p).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        info!(path = %path.display(), years = rows.len(), "Annual summary written");
        Ok(())
    }
}
