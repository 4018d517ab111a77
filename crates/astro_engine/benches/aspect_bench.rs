use astro_engine::aspects::AspectDetector;
use astro_engine::bodies::CHART_BODIES;
use astro_engine::ephemeris::{Backend, PlanetPosition};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_detect(c: &mut Criterion) {
    let detector = AspectDetector::new();

    c.bench_function("detect", |b| {
        b.iter(|| detector.detect(black_box(100.0), black_box(218.5)))
    });
}

fn bench_scan_chart(c: &mut Criterion) {
    let detector = AspectDetector::new();
    let positions: Vec<PlanetPosition> = CHART_BODIES
        .iter()
        .enumerate()
        .map(|(i, &body)| {
            PlanetPosition::new(body, (i as f64) * 31.7, 0.0, 1.0, 1.0, Backend::Analytic)
        })
        .collect();

    c.bench_function("scan_chart", |b| {
        b.iter(|| detector.scan(black_box(&positions)))
    });
}

criterion_group!(benches, bench_detect, bench_scan_chart);
criterion_main!(benches);
