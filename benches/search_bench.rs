use criterion::{criterion_group, criterion_main, Criterion};
use homeworlds::board::Position;
use homeworlds::search::Search;
use homeworlds::types::SearchConfig;

fn bench_search(c: &mut Criterion) {
    let opening = Position::standard_opening();

    c.bench_function("search_depth_2_opening", |b| {
        b.iter(|| {
            let config = SearchConfig { max_depth: 2, max_nodes: 200_000, seed: 1 };
            Search::new(config).minimax(&opening, None)
        })
    });

    c.bench_function("search_depth_3_opening", |b| {
        b.iter(|| {
            let config = SearchConfig { max_depth: 3, max_nodes: 500_000, seed: 1 };
            Search::new(config).minimax(&opening, None)
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
