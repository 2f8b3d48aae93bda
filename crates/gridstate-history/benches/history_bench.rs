//! Benchmarks for history engine hot paths.
//!
//! Measures commit cost for the two interesting outcomes (recorded frame vs
//! dedup hit), eviction steady-state at capacity, and cursor moves.
//!
//! Run with: cargo bench -p gridstate-history --bench history_bench

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use gridstate_history::{EditHistory, HistoryConfig};

const ROWS: usize = 64;

fn rows(tag: u64) -> Vec<u64> {
    (0..ROWS as u64).map(|i| i.wrapping_mul(31) ^ tag).collect()
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("history/commit");

    // Every commit records a new frame; the engine stays under capacity.
    group.bench_function("recorded", |b| {
        let mut engine = EditHistory::with_config(rows(0), HistoryConfig::unlimited());
        let mut tag = 0u64;
        b.iter(|| {
            tag += 1;
            engine.commit(black_box(rows(tag)));
        })
    });

    // Every commit is a dedup hit against the cursor frame.
    group.bench_function("dedup_hit", |b| {
        let mut engine = EditHistory::new(rows(0));
        let shared = Arc::new(rows(1));
        engine.commit_arc(Arc::clone(&shared));
        b.iter(|| engine.commit_arc(black_box(Arc::clone(&shared))))
    });

    // At capacity: every recorded commit also evicts the oldest frame.
    group.bench_function("evicting", |b| {
        let config = HistoryConfig::structural().with_limit(50);
        let mut engine = EditHistory::with_config(rows(0), config);
        let mut tag = 0u64;
        for _ in 0..50 {
            tag += 1;
            engine.commit(rows(tag));
        }
        b.iter(|| {
            tag += 1;
            engine.commit(black_box(rows(tag)));
        })
    });

    group.finish();
}

fn bench_cursor_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("history/cursor");

    group.bench_function("undo_redo_pair", |b| {
        let mut engine = EditHistory::with_config(rows(0), HistoryConfig::unlimited());
        for tag in 1..100 {
            engine.commit(rows(tag));
        }
        b.iter(|| {
            black_box(engine.undo());
            black_box(engine.redo());
        })
    });

    group.bench_function("is_dirty", |b| {
        let mut engine = EditHistory::new(rows(0));
        engine.commit(rows(1));
        b.iter(|| black_box(engine.is_dirty()))
    });

    group.finish();
}

criterion_group!(benches, bench_commit, bench_cursor_moves);
criterion_main!(benches);
