//! Criterion micro-benchmarks for scheduler passes and curve evaluation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use simloop_bench::reference_scheduler;
use simloop_core::{Component, Periodic};
use simloop_engine::SignalCurve;
use simloop_test_utils::StepLog;

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_run_1000_passes");
    for components in [1usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(components),
            &components,
            |b, &n| {
                let (mut sched, outputs) = reference_scheduler(n, 1000).unwrap();
                b.iter(|| {
                    sched.run().unwrap();
                    black_box(outputs[0].get());
                });
            },
        );
    }
    group.finish();
}

fn bench_periodic_condition(c: &mut Criterion) {
    let mut p = Periodic::new(StepLog::new(), 0.01);
    p.init(0.0).unwrap();
    let mut t = 0.0;
    c.bench_function("periodic_exec_condition", |b| {
        b.iter(|| {
            t += 0.001;
            black_box(p.exec_condition(black_box(t)))
        });
    });
}

fn bench_curve(c: &mut Criterion) {
    let xs: Vec<f64> = (0..1024).map(|i| i as f64 * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|x| (x * 0.1).sin()).collect();
    let curve = SignalCurve::new(xs, ys).unwrap();
    c.bench_function("curve_interpolate_1024", |b| {
        let mut x = 0.0;
        b.iter(|| {
            x = (x + 0.37) % 511.5;
            black_box(curve.interpolate(black_box(x)).unwrap())
        });
    });
}

criterion_group!(benches, bench_passes, bench_periodic_condition, bench_curve);
criterion_main!(benches);
