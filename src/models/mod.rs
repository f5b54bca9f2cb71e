pub mod aggregates;
pub mod measurement;
pub mod season;
pub mod station;

pub use aggregates::{
    AnnualAverage, MeanAccumulator, SeasonalAverage, SeasonalShare, SeasonalShares, StationMean,
    StationRanking, TrendPoint, TrendSeries,
};
pub use measurement::{LongRecord, MeasurementTable, Observation};
pub use season::Season;
pub use station::{normalize_station_id, StationMetadata};
