use criterion::{Criterion, black_box, criterion_group, criterion_main};

use castellan::{
    chess::{attacks::AttackTables, position::Position},
    perft::perft,
};

fn bench_startpos(c: &mut Criterion) {
    let pos = Position::startpos();
    c.bench_function("perft startpos depth 4", |b| {
        b.iter(|| black_box(perft(black_box(&pos), 4)));
    });
}

fn bench_kiwipete(c: &mut Criterion) {
    let pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3P4/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    c.bench_function("perft kiwipete depth 3", |b| {
        b.iter(|| black_box(perft(black_box(&pos), 3)));
    });
}

fn bench_table_build(c: &mut Criterion) {
    c.bench_function("attack table construction", |b| {
        b.iter(|| black_box(AttackTables::new()));
    });
}

criterion_group!(benches, bench_startpos, bench_kiwipete, bench_table_build);
criterion_main!(benches);
