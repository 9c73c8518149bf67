//! End-to-end run scenarios and generator invariants.

use glam::Vec3;
use proptest::prelude::*;

use jumping_jack::core::math::rotate_heading;
use jumping_jack::game::{
    config::TrackConfig,
    events::{RunEvent, RunEventData},
    track::TrackGenerator,
};
use jumping_jack::{InputFrame, PlayerInputBuffer, Run, RunConfig, TileCatalog, TileKind, TICK_DT};

fn commit_next(track: &mut TrackGenerator, direction: Vec3) -> Vec3 {
    let pending = track.pending_turn().expect("turn tile after every run").kind;
    let sign = if pending == TileKind::TurnLeft { -1.0 } else { 1.0 };
    let next = rotate_heading(direction, sign);
    track.commit_turn(next).expect("commit");
    next
}

proptest! {
    #[test]
    fn prop_live_tiles_bounded(seed in any::<u64>(), commits in 0usize..40) {
        let mut track = TrackGenerator::new(TileCatalog::default(), TrackConfig::default(), seed);
        track.initialize(TileKind::Straight, 10);

        let mut direction = Vec3::Z;
        for _ in 0..commits {
            direction = commit_next(&mut track, direction);
            prop_assert!(track.live_tile_count() as u32 <= track.current_run_length() + 1);
        }
    }

    #[test]
    fn prop_run_length_in_range(seed in any::<u64>(), min in 1u32..8, extra in 0u32..8) {
        let config = TrackConfig {
            min_straight: min,
            max_straight: min + extra,
            ..TrackConfig::default()
        };
        let mut track = TrackGenerator::new(TileCatalog::default(), config, seed);
        track.initialize(TileKind::Straight, 10);

        let mut direction = Vec3::Z;
        for _ in 0..10 {
            direction = commit_next(&mut track, direction);
            let straights = track.straight_run_length();
            prop_assert!(straights >= min && straights <= min + extra);

            let kinds: Vec<_> = track.tiles().map(|t| t.kind).collect();
            prop_assert_eq!(kinds.iter().filter(|k| k.is_turn()).count(), 2);
            prop_assert!(kinds.last().is_some_and(|k| k.is_turn()));
        }
    }

    #[test]
    fn prop_speed_never_drops(seed in any::<u64>(), presses in prop::collection::vec(0u8..4, 1..240)) {
        let mut run = Run::new(RunConfig::default(), TileCatalog::default(), seed).unwrap();
        let max = run.config().movement.max_speed;
        let mut last = run.player().forward_speed;

        for press in presses {
            let frame = match press {
                1 => InputFrame::jump(),
                2 => InputFrame::slide(),
                3 => InputFrame::turn_right(),
                _ => InputFrame::idle(),
            };
            run.tick(TICK_DT, frame).unwrap();

            let speed = run.player().forward_speed;
            prop_assert!(speed >= last && speed <= max);
            last = speed;
        }
    }
}

#[test]
fn test_initialize_twice_is_identical() {
    let mut track = TrackGenerator::new(TileCatalog::default(), TrackConfig::default(), 31337);

    track.initialize(TileKind::Straight, 10);
    let first = (track.fingerprint(), track.cursor(), track.live_tile_count());

    track.initialize(TileKind::Straight, 10);
    assert_eq!((track.fingerprint(), track.cursor(), track.live_tile_count()), first);
}

#[test]
fn test_listener_sees_one_game_over() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut config = RunConfig::default();
    config.track.obstacle_chance = 0.0;
    let mut run = Run::new(config, TileCatalog::default(), 8).unwrap();

    let seen: Rc<RefCell<Vec<RunEvent>>> = Rc::default();
    let sink = Rc::clone(&seen);
    run.attach(Box::new(move |e: &RunEvent| sink.borrow_mut().push(e.clone())));

    // Never turning runs the runner off the end of the first run
    for _ in 0..60 * 60 {
        run.tick(TICK_DT, InputFrame::idle()).unwrap();
    }

    let events = seen.borrow();
    let game_overs: Vec<_> = events.iter().filter(|e| e.is_game_over()).collect();
    assert_eq!(game_overs.len(), 1);
    assert!(run.player().position.z > 100.0);

    // Score stops with the run
    let final_score = match game_overs[0].data {
        RunEventData::GameOver { final_score } => final_score,
        _ => unreachable!(),
    };
    assert_eq!(run.player().score_value(), final_score);
    assert!(events.iter().skip_while(|e| !e.is_game_over()).count() == 1);
}

#[test]
fn test_detached_listener_is_silent() {
    let mut run = Run::new(RunConfig::default(), TileCatalog::default(), 8).unwrap();
    let id = run.attach(Box::new(|_: &RunEvent| panic!("detached listener called")));

    assert!(run.detach(id));
    run.tick(TICK_DT, InputFrame::idle()).unwrap();
}

#[test]
fn test_survives_turns_with_autoturn() {
    let mut config = RunConfig::default();
    config.track.obstacle_chance = 0.0;
    let mut catalog = TileCatalog::default();
    catalog.turn_tiles.retain(|t| t.kind == TileKind::SidewaysTurn);
    let mut run = Run::new(config, catalog, 99).unwrap();

    let mut turns = 0;
    for _ in 0..60 * 90 {
        let radius = run.config().movement.turn_snap_radius;
        let frame = if run.track().turn_tile_near(run.player().position, radius).is_some() {
            InputFrame::turn_left()
        } else {
            InputFrame::idle()
        };
        let result = run.tick(TICK_DT, frame).unwrap();
        assert!(!result.game_over, "fell at {:?}", run.player().position);
        if result.turned.is_some() {
            turns += 1;
        }
    }

    assert!(turns >= 3);
    assert!(run.track().live_tile_count() as u32 <= run.track().current_run_length() + 1);
}

#[test]
fn test_recording_survives_bytes() {
    let mut recording = PlayerInputBuffer::new([1u8; 16], 5);
    for t in 0..100u32 {
        let frame = if t % 25 == 0 { InputFrame::jump() } else { InputFrame::idle() };
        recording.record(t, frame);
    }

    let (live, _) = jumping_jack::replay_run(RunConfig::default(), TileCatalog::default(), &recording, 100).unwrap();
    let restored = PlayerInputBuffer::from_bytes(&recording.to_bytes().unwrap()).unwrap();
    let (replayed, _) = jumping_jack::replay_run(RunConfig::default(), TileCatalog::default(), &restored, 100).unwrap();

    assert_eq!(live.compute_hash(), replayed.compute_hash());
}
