use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fx_reconcile::engine::report::{convert_statement, EngineOptions};
use fx_reconcile::generator::{generate_random_statement, StatementConfig};

fn bench_pipeline_100_rows(c: &mut Criterion) {
    let config = StatementConfig {
        row_count: 100,
        ..Default::default()
    };
    let (statement, rates) = generate_random_statement(&config);
    let options = EngineOptions::default();

    c.bench_function("pipeline_100_rows", |b| {
        b.iter(|| convert_statement(black_box(&statement), black_box(&rates), &options))
    });
}

fn bench_pipeline_1000_rows(c: &mut Criterion) {
    let config = StatementConfig {
        row_count: 1000,
        ..Default::default()
    };
    let (statement, rates) = generate_random_statement(&config);
    let options = EngineOptions::default();

    c.bench_function("pipeline_1000_rows", |b| {
        b.iter(|| convert_statement(black_box(&statement), black_box(&rates), &options))
    });
}

fn bench_pipeline_10000_rows(c: &mut Criterion) {
    let config = StatementConfig {
        row_count: 10_000,
        day_span: 730,
        ..Default::default()
    };
    let (statement, rates) = generate_random_statement(&config);
    let options = EngineOptions::default();

    c.bench_function("pipeline_10000_rows", |b| {
        b.iter(|| convert_statement(black_box(&statement), black_box(&rates), &options))
    });
}

criterion_group!(
    benches,
    bench_pipeline_100_rows,
    bench_pipeline_1000_rows,
    bench_pipeline_10000_rows
);
criterion_main!(benches);
