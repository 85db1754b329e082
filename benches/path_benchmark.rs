//! Benchmarks for path search.
//!
//! Path search runs several times per turn (target, relocation, every gather
//! source), so it is the planner's hot path.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use generalist::game::{MapBuilder, ScoreEntry};
use generalist::{PathSearch, SearchMode, Team, Tuning, TurnPayload, WorldState};

/// A square map with a comb of mountain walls and a spread of armies.
fn comb_world(side: usize) -> WorldState {
    let mut builder = MapBuilder::new(side, side);
    for row in 0..side {
        for col in 0..side {
            let index = row * side + col;
            if col % 4 == 2 && row != (col / 4) % side && row + 1 != side {
                builder = builder.mountain(index);
            } else if (row + col) % 7 == 0 {
                builder = builder.neutral(index, i32::try_from((row * col) % 40).unwrap());
            }
        }
    }
    let builder = builder.owned(0, 0, 50).owned(side * side - 1, 1, 10);
    let scores = vec![ScoreEntry::empty(0), ScoreEntry::empty(1)];
    let mut world = WorldState::new(Team::solo(0));
    world
        .update(&TurnPayload::full(1, scores, vec![0, -1], &[], &builder.build()))
        .unwrap();
    world
}

fn bench_corner_to_corner(c: &mut Criterion) {
    let tuning = Tuning::default();
    let mut group = c.benchmark_group("path_corner_to_corner");

    for side in [10usize, 20, 30] {
        let world = comb_world(side);
        let end = side * side - 1;
        group.bench_with_input(BenchmarkId::new("direct", side), &world, |b, world| {
            let search = PathSearch::new(world, &tuning);
            b.iter(|| black_box(search.search(black_box(0), black_box(end), SearchMode::Direct)));
        });
        group.bench_with_input(BenchmarkId::new("gather", side), &world, |b, world| {
            let search = PathSearch::new(world, &tuning);
            b.iter(|| black_box(search.search(black_box(0), black_box(end), SearchMode::Gather)));
        });
    }

    group.finish();
}

fn bench_unreachable(c: &mut Criterion) {
    // Worst case: the whole reachable area is expanded before giving up.
    let side = 20;
    let mut builder = MapBuilder::new(side, side).owned(0, 0, 50);
    for row in 0..side {
        builder = builder.mountain(row * side + side / 2);
    }
    let scores = vec![ScoreEntry::empty(0), ScoreEntry::empty(1)];
    let mut world = WorldState::new(Team::solo(0));
    world
        .update(&TurnPayload::full(1, scores, vec![0, -1], &[], &builder.build()))
        .unwrap();
    let tuning = Tuning::default();
    let search = PathSearch::new(&world, &tuning);

    c.bench_function("path_unreachable_20x20", |b| {
        b.iter(|| black_box(search.search(black_box(0), black_box(side * side - 1), SearchMode::Direct)));
    });
}

criterion_group!(benches, bench_corner_to_corner, bench_unreachable);
criterion_main!(benches);
