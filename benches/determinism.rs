use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use jumping_jack::{
    game::{config::TrackConfig, track::TrackGenerator},
    InputFrame, Run, RunConfig, TileCatalog, TileKind, TICK_DT,
};

fn bench_tick_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("Run Ticks");

    group.bench_function("600 idle ticks", |b| {
        b.iter(|| {
            let mut run = Run::new(RunConfig::default(), TileCatalog::default(), 12345)
                .expect("default config is valid");
            for _ in 0..600 {
                if run.tick(TICK_DT, InputFrame::idle()).expect("tick").game_over {
                    break;
                }
            }
            black_box(run.compute_hash());
        });
    });

    group.finish();
}

fn bench_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("Track Generation");

    group.bench_function("initialize", |b| {
        let mut track = TrackGenerator::new(TileCatalog::default(), TrackConfig::default(), 7);
        b.iter(|| {
            track.initialize(TileKind::Straight, 10);
            black_box(track.live_tile_count());
        });
    });

    group.bench_function("100 commits", |b| {
        let mut catalog = TileCatalog::default();
        catalog.turn_tiles.retain(|t| t.kind == TileKind::SidewaysTurn);
        let mut track = TrackGenerator::new(catalog, TrackConfig::default(), 7);
        b.iter(|| {
            track.initialize(TileKind::Straight, 10);
            let mut direction = Vec3::X;
            for _ in 0..100 {
                track.commit_turn(direction).expect("pending turn");
                direction = Vec3::new(-direction.z, 0.0, direction.x);
            }
            black_box(track.fingerprint());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tick_loop, bench_track);
criterion_main!(benches);
