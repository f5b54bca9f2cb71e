pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{discover_yearly_files, year_from_filename, yearly_file_path, YearlyFile};
pub use progress::ProgressReporter;
