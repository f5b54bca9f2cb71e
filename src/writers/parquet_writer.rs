use crate::error::{ProcessingError, Result};
use crate::models::{AnnualAverage, SeasonalAverage};
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Columnar export of the aggregated tables.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    fn write_batch(&self, batch: RecordBatch, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    /// Write the annual summary: a non-null `year` column and one nullable
    /// Float64 column per pollutant in `columns`.
    pub fn write_annual(&self, rows: &[AnnualAverage], columns: &[String], path: &Path) -> Result<()> {
        let mut fields = vec![Field::new("year", DataType::Int32, false)];
        fields.extend(columns.iter().map(|c| Field::new(c, DataType::Float64, true)));
        let schema = Arc::new(Schema::new(fields));

        let mut arrays: Vec<ArrayRef> = vec![Arc::new(Int32Array::from(
            rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        ))];
        for column in columns {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.get(column)).collect();
            arrays.push(Arc::new(Float64Array::from(values)));
        }

        let batch = RecordBatch::try_new(schema, arrays)?;
        self.write_batch(batch, path)?;
        info!(path = %path.display(), rows = rows.len(), "Annual summary exported to Parquet");
        Ok(())
    }

    /// Write the long-form seasonal table including dense ranks.
    pub fn write_seasonal(&self, averages: &[SeasonalAverage], path: &Path) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("season", DataType::Utf8, false),
            Field::new("pollutant", DataType::Utf8, false),
            Field::new("avg_value", DataType::Float64, false),
            Field::new("rank", DataType::UInt32, false),
        ]));

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(averages.iter().map(|a| a.year).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                averages.iter().map(|a| a.season.name()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                averages.iter().map(|a| a.pollutant.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(averages.iter().map(|a| a.mean).collect::<Vec<_>>())),
            Arc::new(UInt32Array::from(averages.iter().map(|a| a.rank).collect::<Vec<_>>())),
        ];

        let batch = RecordBatch::try_new(schema, arrays)?;
        self.write_batch(batch, path)?;
        info!(path = %path.display(), rows = averages.len(), "Seasonal averages exported to Parquet");
        Ok(())
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            columns: metadata.file_metadata().schema_descr().num_columns(),
            row_groups: metadata.num_row_groups(),
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub columns: usize,
    pub row_groups: usize,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Rows: {}, Columns: {}, Row groups: {}, Size: {:.1} KB, Compression: {:?}",
            self.total_rows,
            self.columns,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression
        )
    }
}
