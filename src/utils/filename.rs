use crate::error::{ProcessingError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A measurement file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyFile {
    pub path: PathBuf,
    /// Year declared by the file name, e.g. `madrid_2007.csv` -> 2007.
    pub year: Option<i32>,
}

/// Extract the declared year from a file named `<prefix>_<year>.<ext>`.
pub fn year_from_filename(path: &Path, prefix: &str) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    let year_part = stem.strip_prefix(prefix)?.strip_prefix('_')?;
    year_part.parse::<i32>().ok()
}

/// Path of the file holding measurements for `year`.
pub fn yearly_file_path(data_dir: &Path, prefix: &str, year: i32, extension: &str) -> PathBuf {
    data_dir.join(format!("{}_{}.{}", prefix, year, extension))
}

/// Human readable form of the input pattern, used in error messages.
pub fn yearly_file_pattern(data_dir: &Path, prefix: &str, extension: &str) -> String {
    data_dir
        .join(format!("{}_*.{}", prefix, extension))
        .display()
        .to_string()
}

/// List every `<prefix>_*.<ext>` file in `data_dir`, sorted by path.
///
/// Fails with [`ProcessingError::MissingInput`] when nothing matches.
pub fn discover_yearly_files(
    data_dir: &Path,
    prefix: &str,
    extension: &str,
) -> Result<Vec<YearlyFile>> {
    let pattern = yearly_file_pattern(data_dir, prefix, extension);
    let file_prefix = format!("{}_", prefix);

    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProcessingError::MissingInput { pattern });
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        let matches_prefix = path
            .file_name()
            .and_then(|f| f.to_str())
            .is_some_and(|f| f.starts_with(&file_prefix));

        if matches_ext && matches_prefix {
            let year = year_from_filename(&path, prefix);
            if year.is_none() {
                debug!(path = %path.display(), "File name carries no year");
            }
            files.push(YearlyFile { path, year });
        }
    }

    if files.is_empty() {
        return Err(ProcessingError::MissingInput { pattern });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
