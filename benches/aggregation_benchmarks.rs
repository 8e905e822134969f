use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use supply_insights_api::{
    datasets::Dataset,
    services::{
        disruptions::{parse_estimated_impact, DisruptionService},
        forecasting::{ForecastService, DEFAULT_MODEL_VERSION},
        waste::{sort_by_urgency, summarize_items},
    },
};

/// Bundled dataset with its record lists repeated `factor` times.
fn scaled_dataset(factor: usize) -> Dataset {
    let base = Dataset::builtin(Utc::now());
    let mut dataset = base.clone();
    dataset.disruptions = base
        .disruptions
        .iter()
        .cycle()
        .take(base.disruptions.len() * factor)
        .cloned()
        .collect();
    dataset.waste = base
        .waste
        .iter()
        .cycle()
        .take(base.waste.len() * factor)
        .cloned()
        .collect();
    dataset
}

fn impact_parsing_benchmark(c: &mut Criterion) {
    c.bench_function("parse_estimated_impact", |b| {
        b.iter(|| {
            for raw in ["$2.3M", "$1,250K", " $890K "] {
                black_box(parse_estimated_impact(black_box(raw)).ok());
            }
        });
    });
}

fn disruption_summary_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("disruption_summary");

    for factor in [1usize, 25, 250].iter() {
        let service = DisruptionService::new(Arc::new(scaled_dataset(*factor)));
        group.bench_with_input(BenchmarkId::from_parameter(factor), factor, |b, _| {
            b.iter(|| black_box(service.summarize().ok()));
        });
    }

    group.finish();
}

fn waste_ranking_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("waste_ranking");

    for factor in [1usize, 25, 250].iter() {
        let items = scaled_dataset(*factor).waste;
        group.bench_with_input(BenchmarkId::from_parameter(factor), factor, |b, _| {
            b.iter(|| {
                let mut ranked = items.clone();
                sort_by_urgency(&mut ranked);
                black_box(summarize_items(&ranked))
            });
        });
    }

    group.finish();
}

fn forecast_lookup_benchmark(c: &mut Criterion) {
    let service = ForecastService::new(Arc::new(scaled_dataset(1)), DEFAULT_MODEL_VERSION);
    c.bench_function("forecast_resolve", |b| {
        b.iter(|| {
            black_box(
                service
                    .resolve(Some(black_box("SKU-12345-Milk")), Some("Texas"))
                    .ok(),
            )
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(50);
    targets =
        impact_parsing_benchmark,
        disruption_summary_benchmark,
        waste_ranking_benchmark,
        forecast_lookup_benchmark
}

criterion_main!(benches);
