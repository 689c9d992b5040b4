use std::time::Duration;

use axum::http::StatusCode;
use criterion::{Criterion, criterion_group, criterion_main};
use metrics_reporter::{HttpMetrics, StatusLabel};

fn setup(status_label: StatusLabel) -> HttpMetrics {
    let registry = HttpMetrics::registry().unwrap();
    HttpMetrics::register(&registry, status_label).unwrap()
}

fn bench_observe(c: &mut Criterion) {
    let metrics = setup(StatusLabel::Code);

    c.bench_function("reporter/observe_code", |b| {
        b.iter(|| metrics.observe(StatusCode::OK, Duration::from_micros(250)));
    });

    let metrics = setup(StatusLabel::Class);

    c.bench_function("reporter/observe_class", |b| {
        b.iter(|| metrics.observe(StatusCode::OK, Duration::from_micros(250)));
    });
}

fn bench_render(c: &mut Criterion) {
    let metrics = setup(StatusLabel::Code);
    for status in [StatusCode::OK, StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
        for _ in 0..1_000 {
            metrics.observe(status, Duration::from_millis(3));
        }
    }

    c.bench_function("reporter/render", |b| {
        b.iter(|| metrics.registry_handle().render());
    });
}

criterion_group!(benches, bench_observe, bench_render);
criterion_main!(benches);
