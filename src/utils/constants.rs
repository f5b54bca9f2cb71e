/// Input layout
pub const DEFAULT_DATA_DIR: &str = "VDS2425_Madrid";
pub const DEFAULT_FILE_PREFIX: &str = "madrid";
pub const DEFAULT_FILE_EXTENSION: &str = "csv";
pub const STATIONS_FILE: &str = "stations.csv";

/// Column names
pub const DATE_COLUMN: &str = "date";
pub const STATION_COLUMN: &str = "station";

/// Columns never treated as pollutants when reshaping to long form
pub const HOUSEKEEPING_COLUMNS: [&str; 5] = ["date", "station_id", "month", "year", "season"];

/// Pollutant vocabulary
pub const NITROGEN_DIOXIDE: &str = "NO_2";
pub const NITROGEN_MONOXIDE: &str = "NO";
pub const NITROGEN_OXIDES: &str = "NOx";
pub const PARTICULATE_PM10: &str = "PM10";
pub const OZONE: &str = "O_3";
pub const CARBON_MONOXIDE: &str = "CO";
pub const SULFUR_DIOXIDE: &str = "SO_2";

pub const ANNUAL_POLLUTANTS: [&str; 5] = [
    NITROGEN_DIOXIDE,
    PARTICULATE_PM10,
    OZONE,
    CARBON_MONOXIDE,
    SULFUR_DIOXIDE,
];
pub const RANKING_POLLUTANTS: [&str; 3] = [NITROGEN_MONOXIDE, NITROGEN_DIOXIDE, NITROGEN_OXIDES];
pub const TREND_POLLUTANTS: [&str; 3] = [NITROGEN_DIOXIDE, PARTICULATE_PM10, OZONE];

/// Station ranking defaults
pub const DEFAULT_RANKING_YEAR: i32 = 2018;

/// Station chart colour tiers (µg/m³)
pub const LOW_POLLUTION_LIMIT: f64 = 20.0;
pub const MEDIUM_POLLUTION_LIMIT: f64 = 40.0;

/// Output file names
pub const ANNUAL_SUMMARY_FILE: &str = "annual_pollution_2001_2018.csv";
pub const SEASONAL_BAR_CHART_FILE: &str = "BA2_seasonal_bar_chart.html";
pub const SEASONAL_PIE_CHART_FILE: &str = "BA2_seasonal_pie_chart.html";
pub const STATION_CHART_FILE: &str = "BCK2_station_pollution_chart.html";
pub const TREND_CHART_FILE: &str = "OMR4_pollution_trend.html";
pub const ANNUAL_PARQUET_FILE: &str = "annual_pollution.parquet";
pub const SEASONAL_PARQUET_FILE: &str = "seasonal_pollution.parquet";

/// Tolerance used when checking that seasonal shares sum to one
pub const SHARE_TOLERANCE: f64 = 1e-9;

pub const CONCENTRATION_UNIT: &str = "µg/m³";

/// Parquet export defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_PARQUET_COMPRESSION: &str = "snappy";
