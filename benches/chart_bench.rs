//! Benchmarks for chart rendering
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use xpdash::{ChartOptions, ChartRenderer, Transaction};

fn create_xp_records(count: usize) -> Vec<Transaction> {
    let start = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| Transaction::xp((i % 50) as f64 * 250.0, start + Duration::hours(i as i64)))
        .collect()
}

fn create_skill_records(count: usize) -> Vec<Transaction> {
    const SKILLS: [&str; 8] = [
        "skill_go", "skill_js", "skill_algo", "skill_prog",
        "skill_html", "skill_sql", "skill_unix", "skill_docker",
    ];
    (0..count)
        .map(|i| Transaction::skill(SKILLS[i % SKILLS.len()], (i % 100) as f64))
        .collect()
}

fn bench_line_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_chart");
    let renderer = ChartRenderer::new(ChartOptions::xp_progress());

    for size in [10, 100, 1000] {
        let records = create_xp_records(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("plot_{}", size), |b| {
            b.iter(|| renderer.plot(black_box(&records)))
        });

        group.bench_function(format!("render_svg_{}", size), |b| {
            b.iter(|| renderer.render_svg(black_box(&records)))
        });
    }

    group.finish();
}

fn bench_bar_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_chart");
    let renderer = ChartRenderer::new(ChartOptions::skills());

    for size in [100, 1000] {
        let records = create_skill_records(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("render_svg_{}", size), |b| {
            b.iter(|| renderer.render_svg(black_box(&records)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_line_chart, bench_bar_chart);
criterion_main!(benches);
