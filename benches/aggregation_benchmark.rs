use air_quality_processor::config::PipelineConfig;
use air_quality_processor::models::{MeasurementTable, Observation};
use air_quality_processor::processors::{
    dense_rank_descending, AnnualAggregator, SeasonalAggregator,
};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const POLLUTANTS: [&str; 5] = ["NO_2", "PM10", "O_3", "CO", "SO_2"];

// Hourly rows for a handful of stations over one year
fn create_year_table(year: i32, stations: usize, hours: usize) -> MeasurementTable {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    let mut observations = Vec::with_capacity(stations * hours);
    for hour in 0..hours {
        let timestamp = start + Duration::hours(hour as i64);
        for station in 0..stations {
            let base = 20.0 + (hour % 24) as f64 + station as f64;
            observations.push(Observation {
                timestamp: Some(timestamp),
                station: Some(format!("280790{:02}", station)),
                values: POLLUTANTS
                    .iter()
                    .enumerate()
                    .map(|(i, _)| if (hour + i) % 7 == 0 { None } else { Some(base * (i + 1) as f64) })
                    .collect(),
            });
        }
    }

    MeasurementTable::new(
        format!("madrid_{}.csv", year),
        Some(year),
        POLLUTANTS.iter().map(|p| p.to_string()).collect(),
    )
    .with_observations(observations)
}

fn benchmark_seasonal_aggregation(c: &mut Criterion) {
    let tables: Vec<MeasurementTable> = (2001..=2003).map(|y| create_year_table(y, 4, 24 * 90)).collect();
    let aggregator = SeasonalAggregator::from_config(&PipelineConfig::default());

    c.bench_function("seasonal_aggregation", |b| {
        b.iter(|| black_box(aggregator.aggregate_tables(&tables).len()))
    });
}

fn benchmark_annual_aggregation(c: &mut Criterion) {
    let tables: Vec<MeasurementTable> = (2001..=2003).map(|y| create_year_table(y, 4, 24 * 90)).collect();
    let aggregator = AnnualAggregator::from_config(&PipelineConfig::default());

    c.bench_function("annual_aggregation", |b| {
        b.iter(|| black_box(aggregator.aggregate_tables(&tables).len()))
    });
}

fn benchmark_dense_rank(c: &mut Criterion) {
    let values = vec![41.2, 18.5, 27.9, 41.2];

    c.bench_function("dense_rank_four_seasons", |b| {
        b.iter(|| black_box(dense_rank_descending(black_box(&values))))
    });
}

fn benchmark_varying_table_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("seasonal_by_stations");
    let aggregator = SeasonalAggregator::from_config(&PipelineConfig::default());

    for &stations in &[1, 8, 24] {
        group.bench_with_input(BenchmarkId::new("stations", stations), &stations, |b, &count| {
            let table = create_year_table(2018, count, 24 * 30);
            b.iter(|| black_box(aggregator.aggregate_tables([&table]).len()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_seasonal_aggregation,
    benchmark_annual_aggregation,
    benchmark_dense_rank,
    benchmark_varying_table_sizes
);
criterion_main!(benches);
