//! Benchmarks for filter rendering and optimization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qfilter_core::filter::{field, Condition, Filter, GroupCondition};

/// A filter with `width` top-level groups, each holding a small nested tree.
fn wide_filter(width: usize) -> Filter {
    Filter::from_conditions((0..width).map(|i| -> Box<dyn Condition> {
        Box::new(GroupCondition::must(vec![
            Box::new(field("category").eq(format!("c{}", i % 7))),
            Box::new(GroupCondition::should(vec![
                Box::new(field("year").gte(2000 + (i % 25) as i64)),
                Box::new(field("score").lt(0.5)),
            ])),
        ]))
    }))
}

/// `depth` levels of single-child `must` groups around one leaf.
fn deep_filter(depth: usize) -> Filter {
    let mut condition: Box<dyn Condition> = Box::new(field("city").eq("Paris"));
    for _ in 0..depth {
        condition = Box::new(GroupCondition::must(vec![condition]));
    }
    Filter::from_boxed(condition)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for width in [1, 16, 128, 1024].iter() {
        let filter = wide_filter(*width);

        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::new("compact", width), width, |bench, _| {
            bench.iter(|| black_box(&filter).render(false))
        });
        group.bench_with_input(BenchmarkId::new("indented", width), width, |bench, _| {
            bench.iter(|| black_box(&filter).render(true))
        });
    }

    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");

    for depth in [4, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::new("deep", depth), depth, |bench, &depth| {
            bench.iter_with_setup(|| deep_filter(depth), |mut filter| filter.optimize())
        });
    }

    for width in [16, 128, 1024].iter() {
        group.bench_with_input(BenchmarkId::new("wide", width), width, |bench, &width| {
            bench.iter_with_setup(|| wide_filter(width), |mut filter| filter.optimize())
        });
    }

    group.finish();
}

fn bench_collect_fields(c: &mut Criterion) {
    let filter = wide_filter(1024);
    c.bench_function("collect_payload_fields/1024", |bench| {
        bench.iter(|| black_box(&filter).collect_payload_fields())
    });
}

criterion_group!(benches, bench_render, bench_optimize, bench_collect_fields);
criterion_main!(benches);
