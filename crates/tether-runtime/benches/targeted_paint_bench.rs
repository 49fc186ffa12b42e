//! Benchmarks for targeted versus full painting.
//!
//! Run with: `cargo bench --package tether-runtime --bench targeted_paint_bench`
//!
//! A targeted paint should cost the same regardless of how many elements are
//! bound; a full repaint grows linearly with them.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, json};
use std::hint::black_box;
use tether_core::{Document, Element};
use tether_runtime::{BindConfig, BoundView, DataBind};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// A model with `n` leaves spread over groups of 16, and one bound element
/// per leaf.
fn setup(n: usize) -> (Document, BoundView<Element>) {
    let mut groups = Map::new();
    let mut elements = Vec::with_capacity(n);
    for i in 0..n {
        let group = format!("g{}", i / 16);
        let key = format!("k{}", i % 16);
        let entry = groups
            .entry(group.clone())
            .or_insert_with(|| json!({}));
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(key.clone(), json!(format!("v{i}")));
        }
        elements.push(Element::new("p").with_attr("data-bind", format!("{group}.{key}")));
    }
    let doc = Document::with_body(elements);
    let view = DataBind::initialize(
        BindConfig::default(),
        serde_json::Value::Object(groups),
        doc.elements(),
    )
    .expect("bench model binds");
    (doc, view)
}

fn bench_targeted_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("targeted_write");
    group.throughput(Throughput::Elements(1));
    for n in SIZES {
        let (_doc, view) = setup(n);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("single_leaf", n), &view, |b, view| {
            b.iter(|| {
                flip = !flip;
                let value = if flip { "on" } else { "off" };
                let _ = black_box(view.model().set("g0.k0", value));
            });
        });
    }
    group.finish();
}

fn bench_equal_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("equal_write");
    for n in SIZES {
        let (_doc, view) = setup(n);
        group.bench_with_input(BenchmarkId::new("no_op", n), &view, |b, view| {
            b.iter(|| {
                let _ = black_box(view.model().set("g0.k0", "v0"));
            });
        });
    }
    group.finish();
}

fn bench_full_repaint(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_repaint");
    for n in SIZES {
        let (_doc, view) = setup(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("all", n), &view, |b, view| {
            b.iter(|| black_box(view.repaint()));
        });
    }
    group.finish();
}

fn bench_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("init");
    for n in [100, 1_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("observe_index_paint", n), |b| {
            b.iter(|| black_box(setup(n)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_targeted_write,
    bench_equal_write,
    bench_full_repaint,
    bench_init
);
criterion_main!(benches);
