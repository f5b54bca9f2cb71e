pub mod measurement_reader;
pub mod station_reader;
pub mod summary_reader;

pub use measurement_reader::{parse_concentration, parse_timestamp, MeasurementReader};
pub use station_reader::StationReader;
pub use summary_reader::SummaryReader;
