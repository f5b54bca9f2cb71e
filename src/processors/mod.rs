pub mod annual_aggregator;
pub mod seasonal_aggregator;
pub mod seasonal_share;
pub mod station_ranking;
pub mod trend;

pub use annual_aggregator::AnnualAggregator;
pub use seasonal_aggregator::{dense_rank_descending, pollutants_of, SeasonalAggregator};
pub use seasonal_share::{compute_shares, SeasonalShareAggregator};
pub use station_ranking::StationRankingAggregator;
pub use trend::TrendAnalyzer;
