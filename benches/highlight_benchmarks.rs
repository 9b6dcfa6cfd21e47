//! Benchmarks for the highlighting hot paths.
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wordlight_buffer::{FindOptions, SnapshotPoint, Span, SpanTrackingMode, TextBuffer};
use wordlight_core::{CommandSet, HighlightEngine, SnapshotSearch, WordNavigator, WordResolver};

/// Generates a script with a command on every line.
fn generate_script(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 3 {
            0 => format!("dump 0x{:04x} ; dumped {}\n", i, i),
            1 => format!("memset 0x{:04x}, 0, 16\n", i),
            _ => format!("loadmem <file://scripts/part{}.bin>\n", i),
        })
        .collect()
}

/// Benchmarks whole-word search over snapshots of growing size.
fn bench_find_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_all");

    for size in [100, 1000, 10000].iter() {
        let snapshot = TextBuffer::from(generate_script(*size).as_str()).snapshot();

        group.bench_with_input(BenchmarkId::new("exact_word", size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let matches = snapshot.find_all(black_box("dump"), FindOptions::EXACT_WORD);
                black_box(matches)
            })
        });
    }

    group.finish();
}

/// Benchmarks mapping a span across a chain of edits.
fn bench_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation");

    for edits in [1, 10, 100].iter() {
        let mut buffer = TextBuffer::from(generate_script(1000).as_str());
        let original = buffer.snapshot();
        for i in 0..*edits {
            buffer.insert(i * 3, "x ").unwrap();
        }
        let latest = buffer.snapshot();

        group.bench_with_input(BenchmarkId::new("edge_exclusive", edits), &latest, |b, latest| {
            b.iter(|| {
                let span = original
                    .translate_span(
                        black_box(Span::new(500, 504)),
                        latest,
                        SpanTrackingMode::EdgeExclusive,
                    )
                    .unwrap();
                black_box(span)
            })
        });
    }

    group.finish();
}

/// Benchmarks the renderer-side tag query on a settled engine.
fn bench_tags_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("tags_query");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut buffer = TextBuffer::from(generate_script(10000).as_str());
    let snapshot = buffer.snapshot();

    let registry: CommandSet = ["dump", "memset", "loadmem"].into_iter().collect();
    let engine = HighlightEngine::new(
        WordResolver::new(Arc::new(WordNavigator), Arc::new(registry)),
        Arc::new(SnapshotSearch),
        runtime.handle().clone(),
    );
    engine.notify_caret_moved(SnapshotPoint::new(snapshot.clone(), 1).unwrap());
    runtime.block_on(engine.idle());

    group.bench_function("same_snapshot_viewport", |b| {
        b.iter(|| {
            let tags = engine.tags(black_box(&[Span::new(0, 2000)]), &snapshot);
            black_box(tags)
        })
    });

    let edited = buffer.insert(0, "# header\n").unwrap();
    group.bench_function("translated_viewport", |b| {
        b.iter(|| {
            let tags = engine.tags(black_box(&[Span::new(0, 2000)]), &edited);
            black_box(tags)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_find_all, bench_translation, bench_tags_query);
criterion_main!(benches);
