use crate::charts::{self, publish};
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::AnnualAverage;
use crate::processors::{
    AnnualAggregator, SeasonalAggregator, SeasonalShareAggregator, StationRankingAggregator,
    TrendAnalyzer,
};
use crate::readers::SummaryReader;
use crate::utils::constants::{ANNUAL_PARQUET_FILE, SEASONAL_PARQUET_FILE, SHARE_TOLERANCE};
use crate::writers::{ParquetWriter, SummaryWriter};
use tracing::{debug, error, info, warn};
use validator::Validate;

type Step = fn(&PipelineConfig) -> Result<()>;

/// Steps of the default run, in execution order.
const PIPELINE: [(&str, Step); 4] = [
    ("seasonal share chart", share_chart),
    ("seasonal bar chart", seasonal_chart),
    ("station ranking chart", station_chart),
    ("annual summary and trend chart", annual_and_trend),
];

pub fn run(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(output_dir) = cli.output_dir {
        config = config.with_output_dir(output_dir);
    }
    if cli.no_open {
        config = config.with_auto_open(false);
    }
    debug!(?config, "Configuration resolved");

    match cli.command.unwrap_or(Commands::All) {
        Commands::All => run_all(&config),

        Commands::Annual { parquet } => {
            config.export_parquet |= parquet;
            annual_summary(&config).map(|_| ())
        }

        Commands::Seasonal { parquet } => {
            config.export_parquet |= parquet;
            seasonal_chart(&config)
        }

        Commands::Share { pollutant } => {
            if let Some(pollutant) = pollutant {
                config.share_pollutant = pollutant;
                config.validate()?;
            }
            share_chart(&config)
        }

        Commands::Stations { year } => {
            if let Some(year) = year {
                config.ranking_year = year;
                config.validate()?;
            }
            station_chart(&config)
        }

        Commands::Trend => trend_chart(&config),
    }
}

/// Run every step. A failing step is logged and the remaining steps still run.
pub fn run_all(config: &PipelineConfig) -> Result<()> {
    let mut failed = Vec::new();
    for (name, step) in PIPELINE {
        info!(step = name, "Starting");
        if let Err(e) = step(config) {
            error!(step = name, error = %e, "Step failed");
            failed.push(name.to_string());
        }
    }

    if failed.is_empty() {
        println!("All steps completed");
        Ok(())
    } else {
        Err(ProcessingError::StepsFailed { steps: failed })
    }
}

pub fn share_chart(config: &PipelineConfig) -> Result<()> {
    let shares = SeasonalShareAggregator::from_config(config).run()?;

    let total = shares.total_share();
    if (total - 1.0).abs() > SHARE_TOLERANCE {
        warn!(total, "Seasonal shares do not sum to one");
    }

    println!(
        "Seasonal share of {} ({} files used, {} skipped):",
        shares.pollutant, shares.files_used, shares.files_skipped
    );
    for season in &shares.seasons {
        match (season.share, season.mean) {
            (Some(share), Some(mean)) => {
                println!("  {:<7} {:>5.1}%  avg {:.1}", season.season.name(), share * 100.0, mean)
            }
            _ => println!("  {:<7} no data", season.season.name()),
        }
    }

    let figure = charts::seasonal_pie_chart(&shares);
    publish(&figure, &config.output_path(&config.seasonal_pie_chart_file), config.auto_open)
}

pub fn seasonal_chart(config: &PipelineConfig) -> Result<()> {
    let averages = SeasonalAggregator::from_config(config).run()?;

    if config.export_parquet {
        let path = config.output_path(SEASONAL_PARQUET_FILE);
        let writer = ParquetWriter::new().with_compression(&config.parquet_compression)?;
        writer.write_seasonal(&averages, &path)?;
        println!("{}", writer.get_file_info(&path)?.summary());
    }

    let figure = charts::seasonal_bar_chart(&averages, &config.default_chart_pollutant);
    publish(&figure, &config.output_path(&config.seasonal_bar_chart_file), config.auto_open)
}

pub fn station_chart(config: &PipelineConfig) -> Result<()> {
    let rankings = StationRankingAggregator::from_config(config).run()?;

    for ranking in &rankings {
        if let Some(top) = ranking.entries.first() {
            println!(
                "{}: {} stations, highest {} ({:.1})",
                ranking.pollutant,
                ranking.entries.len(),
                top.name,
                top.mean
            );
        }
    }

    let figure = charts::station_ranking_chart(
        &rankings,
        config.ranking_year,
        &config.default_chart_pollutant,
    );
    publish(&figure, &config.output_path(&config.station_chart_file), config.auto_open)
}

/// Compute and write the annual summary CSV, plus Parquet when enabled.
pub fn annual_summary(config: &PipelineConfig) -> Result<Vec<AnnualAverage>> {
    let rows = AnnualAggregator::from_config(config).run()?;

    let writer = SummaryWriter::new(config.annual_pollutants.clone());
    let path = config.output_path(&config.annual_summary_file);
    writer.write_annual(&rows, &path)?;
    println!("Annual summary: {} years written to {}", rows.len(), path.display());

    if config.export_parquet {
        let parquet_path = config.output_path(ANNUAL_PARQUET_FILE);
        let parquet = ParquetWriter::new().with_compression(&config.parquet_compression)?;
        parquet.write_annual(&rows, &writer.columns(&rows), &parquet_path)?;
        println!("{}", parquet.get_file_info(&parquet_path)?.summary());
    }

    Ok(rows)
}

/// Build the trend chart from the annual summary file on disk.
pub fn trend_chart(config: &PipelineConfig) -> Result<()> {
    let path = config.output_path(&config.annual_summary_file);
    if !path.exists() {
        return Err(ProcessingError::MissingInput {
            pattern: path.display().to_string(),
        });
    }

    let summary = SummaryReader::new().read_annual_summary(&path)?;
    let series = TrendAnalyzer::from_config(config).analyze(&summary);

    for s in &series {
        if let Some(point) = s.largest_change() {
            println!(
                "{}: largest change {:+.2} in {}",
                s.pollutant,
                point.delta.unwrap_or_default(),
                point.year
            );
        }
    }

    let figure = charts::trend_chart(&series);
    publish(&figure, &config.output_path(&config.trend_chart_file), config.auto_open)
}

fn annual_and_trend(config: &PipelineConfig) -> Result<()> {
    annual_summary(config)?;
    trend_chart(config)
}
