use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "air-quality-processor")]
#[command(about = "Aggregates yearly air-quality measurement files into statistics and charts")]
#[command(version)]
pub struct Cli {
    /// Step to run; every chart and the annual summary when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, YAML or JSON) overriding the defaults"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Write charts without opening a browser")]
    pub no_open: bool,

    #[arg(long, global = true, help = "Directory holding the yearly measurement files")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory receiving the summary and charts")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Seasonal share, seasonal bars, station ranking, then annual summary and trend
    All,

    /// Write the annual summary table
    Annual {
        #[arg(long, help = "Also export the summary as Parquet")]
        parquet: bool,
    },

    /// Seasonal averages ranked within each year, as a grouped bar chart
    Seasonal {
        #[arg(long, help = "Also export the seasonal averages as Parquet")]
        parquet: bool,
    },

    /// Each season's share of the all-time average, as a pie chart
    Share {
        #[arg(short, long, help = "Pollutant column to break down [default: NO_2]")]
        pollutant: Option<String>,
    },

    /// Per-station averages for one year, as a horizontal bar chart
    Stations {
        #[arg(short, long, help = "Year whose measurement file is ranked [default: 2018]")]
        year: Option<i32>,
    },

    /// Year-over-year trend chart read from the annual summary
    Trend,
}
