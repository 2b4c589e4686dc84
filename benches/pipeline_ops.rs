//! Benchmarks for pipeline container operations
//!
//! Run with: cargo bench

use analitico_pipeline::pipeline::{
    NodeEdit, PipelineContainer, PipelineEnvironment, PluginKind, PluginRecord, PluginRegistry,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

fn dataframe_pipeline(transforms: usize) -> PluginRecord {
    let mut root = PluginKind::DataframePipeline
        .new_record()
        .with_child(PluginKind::CsvDataframeSource.new_record());
    for i in 0..transforms {
        root = root.with_child(
            PluginKind::CodeDataframe
                .new_record()
                .with_field("code", json!(format!("df['c{}'] = {}", i, i))),
        );
    }
    root
}

fn bench_resolve(c: &mut Criterion) {
    let registry = PluginRegistry::builtin();
    c.bench_function("resolve_known", |b| {
        b.iter(|| registry.resolve(black_box("analitico.plugin.TransformDataframePlugin")))
    });
}

fn bench_load_serialize(c: &mut Criterion) {
    let env = PipelineEnvironment::builtin();
    let mut group = c.benchmark_group("load_serialize");
    for size in [4usize, 32, 128] {
        let record = dataframe_pipeline(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &record, |b, record| {
            b.iter(|| {
                let container = PipelineContainer::for_record(env.clone(), record.clone()).unwrap();
                black_box(container.serialize())
            })
        });
    }
    group.finish();
}

fn bench_drag_feedback(c: &mut Criterion) {
    let env = PipelineEnvironment::builtin();
    let container = PipelineContainer::for_record(env, dataframe_pipeline(64)).unwrap();
    c.bench_function("can_move_sweep_64", |b| {
        b.iter(|| {
            let len = container.len();
            let accepted = (0..len).filter(|&to| container.can_move(black_box(10), to)).count();
            black_box(accepted)
        })
    });
}

fn bench_child_edit(c: &mut Criterion) {
    let env = PipelineEnvironment::builtin();
    let mut container = PipelineContainer::for_record(env, dataframe_pipeline(32)).unwrap();
    let events = container.subscribe();
    let mut n = 0u64;
    c.bench_function("child_edit_propagation", |b| {
        b.iter(|| {
            n += 1;
            container
                .edit(5, NodeEdit::SetCode(format!("df = df.head({})", n)))
                .unwrap();
            black_box(events.try_iter().count())
        })
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_load_serialize,
    bench_drag_feedback,
    bench_child_edit
);
criterion_main!(benches);
