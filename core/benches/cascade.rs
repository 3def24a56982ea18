use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use gemquest_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    for size in [8, 12, 16] {
        group.bench_function(format!("{size}x{size}"), |b| {
            let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
            b.iter(|| initialize_board(black_box(size), &mut rng).unwrap())
        });
    }
    group.finish();
}

fn find_matches(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let board = initialize_board(8, &mut rng).unwrap();
    c.bench_function("find_matches 8x8", |b| b.iter(|| black_box(&board).find_matches()));
}

fn greedy_move(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(11);
    let round = Round::new_game(1, GameConfig::default(), PlayerProfile::default(), &mut rng)
        .unwrap();

    c.bench_function("best move + resolve", |b| {
        b.iter_batched(
            || (round.clone(), SmallRng::seed_from_u64(13)),
            |(mut round, mut rng)| {
                if let Some(best) = best_move(round.board()) {
                    round.tap(best.from).unwrap();
                    round.tap(best.to).unwrap();
                    round.resolve(&mut rng).unwrap();
                }
                round
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, generation, find_matches, greedy_move);
criterion_main!(benches);
