//! Benchmarks for the engine's hot paths: window sampling (one per flush)
//! and immediate-mode dispatch (one per submit when coalescing is off).
//!
//! Run with: cargo bench --features benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use debounce_core::{Debouncer, DebouncerConfig, WindowedAverage};

fn bench_windowed_average(c: &mut Criterion) {
    c.bench_function("windowed_average_push_and_deviation", |b| {
        let averages = WindowedAverage::new(10);
        let mut sample = 0.0_f64;
        b.iter(|| {
            sample += 1.0;
            averages.push(sample);
            black_box(averages.relative_deviation_of_window())
        });
    });
}

fn bench_immediate_submit(c: &mut Criterion) {
    let config = DebouncerConfig {
        enabled: false,
        ..DebouncerConfig::default()
    };
    let debouncer = Debouncer::new(|_payload: u64| Ok(()), &config);

    c.bench_function("immediate_mode_submit", |b| {
        b.iter(|| debouncer.submit(black_box(42)));
    });
}

criterion_group!(benches, bench_windowed_average, bench_immediate_submit);
criterion_main!(benches);
