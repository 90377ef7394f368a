use criterion::{criterion_group, criterion_main, Criterion};
use gridbot::engine::{Direction, GridState};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

/// Boards of every fill level from empty to full, on a few side lengths.
fn corpus() -> Vec<GridState> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut boards = Vec::new();
    for size in [4, 5, 6] {
        let mut grid = GridState::new(size).expect("valid side");
        boards.push(grid.clone());
        while grid.has_empty_cells() {
            grid.spawn_random_tile(&mut rng).expect("board has a gap");
            boards.push(grid.clone());
        }
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    for dir in Direction::ALL {
        c.bench_function(&format!("shift/{dir}"), |bch| {
            bch.iter(|| {
                let mut acc = 0u64;
                for bd in &boards {
                    acc ^= bd.shift(dir).score();
                }
                black_box(acc)
            })
        });
    }
}

fn bench_queries(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("queries/can_move", |bch| {
        bch.iter(|| boards.iter().filter(|bd| bd.can_move()).count())
    });
    c.bench_function("queries/empty_cells", |bch| {
        bch.iter(|| boards.iter().map(|bd| bd.empty_cells().count()).sum::<usize>())
    });
    c.bench_function("queries/spawn_outcomes", |bch| {
        bch.iter(|| boards.iter().map(|bd| bd.spawn_outcomes().count()).sum::<usize>())
    });
}

criterion_group!(engine_ops, bench_shift, bench_queries);
criterion_main!(engine_ops);
