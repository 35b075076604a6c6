use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wedge_core::token::parse_grid;
use wedge_core::Catalogue;
use wedge_engine::perft::perft;
use wedge_engine::{Field, MoveSearch, SearchConfig};

fn cluttered() -> Field {
    let grid = parse_grid(
        ". . . . . . . .
         . . . . . . . .
         . . . . . . . .
         . . . . . . . .
         . . . . . . . .
         . . #b #b . . . .
         . . . . . 7c . .
         #a . . 3d #c #c . .
         #a 1a . #d #d !#e . #f
         #a #a . #d . !#e #f #f",
    )
    .expect("bench layout");
    Field::from_grid(grid, 0).expect("bench field")
}

fn bench_search(c: &mut Criterion) {
    let catalogue = Catalogue::standard().expect("catalogue");
    let open = Field::new(8, 10, 0);
    let cluttered = cluttered();
    let config = SearchConfig::standard();
    let mut search = MoveSearch::new();

    for piece in catalogue.iter() {
        let spawn = piece.spawn_position(8, 10);
        c.bench_function(&format!("search_open_{}", piece.name()), |b| {
            b.iter(|| search.search(black_box(&open), piece, spawn, &config).len())
        });
        c.bench_function(&format!("search_cluttered_{}", piece.name()), |b| {
            b.iter(|| search.search(black_box(&cluttered), piece, spawn, &config).len())
        });
    }
}

fn bench_perft(c: &mut Criterion) {
    let catalogue = Catalogue::standard().expect("catalogue");
    let field = Field::new(6, 10, 0);
    let queue: Vec<_> = ["bar2", "ramp", "square", "hook"]
        .iter()
        .filter_map(|n| catalogue.by_name(n))
        .collect();
    let config = SearchConfig::standard();

    c.bench_function("perft_depth_1", |b| {
        b.iter(|| perft(black_box(&field), &queue[..1], 1, &config))
    });

    c.bench_function("perft_depth_2", |b| {
        b.iter(|| perft(black_box(&field), &queue[..2], 2, &config))
    });

    c.bench_function("perft_depth_3", |b| {
        b.iter(|| perft(black_box(&field), &queue[..3], 3, &config))
    });
}

criterion_group!(benches, bench_search, bench_perft);
criterion_main!(benches);
