//! Jumping Jack Demo Runner
//!
//! Plays one seeded run with a simple autopilot, then replays the recorded
//! inputs and checks that the replay lands on the same state hash.
//!
//! Usage: `jumping-jack [config.json]`

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jumping_jack::{
    core::rng::derive_run_seed,
    game::events::{RunEvent, RunEventData},
    replay_run, InputFrame, PlayerInputBuffer, Run, RunConfig, TileCatalog, TICK_DT, TICK_RATE,
    VERSION,
};

/// Give up on the demo after this many ticks (five minutes).
const MAX_DEMO_TICKS: u32 = TICK_RATE * 300;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Jumping Jack v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => RunConfig::default(),
    };

    demo_run(config)
}

/// Play, replay and compare.
fn demo_run(config: RunConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Run ===");

    let run_id = uuid::Uuid::new_v4();
    let clock_millis = chrono::Utc::now().timestamp_subsec_millis();
    let seed = derive_run_seed(run_id.as_bytes(), clock_millis);

    info!("Run ID: {}", run_id);
    info!("Seed: {}", seed);

    let mut run = Run::new(config.clone(), TileCatalog::default(), seed)?;
    run.attach(Box::new(|event: &RunEvent| match &event.data {
        RunEventData::HeadingChanged { direction } => {
            info!("Tick {}: heading now {:?}", event.tick, direction);
        }
        RunEventData::PickupCollected { pickup_id, .. } => {
            info!("Tick {}: collected pickup {}", event.tick, pickup_id);
        }
        RunEventData::GameOver { final_score } => {
            info!("Tick {}: game over, final score {}", event.tick, final_score);
        }
        _ => {}
    }));

    let mut recording = PlayerInputBuffer::new(*run_id.as_bytes(), seed);
    let mut turns = 0u32;

    for t in 0..MAX_DEMO_TICKS {
        let frame = autopilot(&run);
        recording.record(t, frame);

        let result = run.tick(TICK_DT, frame)?;
        if result.turned.is_some() {
            turns += 1;
        }
        if t % (TICK_RATE * 10) == 0 {
            let player = run.player();
            info!(
                "Tick {}: score {}, speed {:.2}, {} live tiles",
                t,
                player.score_value(),
                player.forward_speed,
                run.track().live_tile_count()
            );
        }
        if result.game_over {
            break;
        }
    }

    let ticks = run.clock().tick;
    recording.finalize(ticks.saturating_sub(1));

    info!("=== Run Results ===");
    info!("Ticks: {} ({:.1}s)", ticks, run.clock().elapsed);
    info!("Turns: {}", turns);
    info!("Score: {}", run.player().score_value());
    info!("Recording: {} input changes", recording.delta_count());

    let hash = run.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let bytes = recording.to_bytes()?;
    let restored = PlayerInputBuffer::from_bytes(&bytes)?;
    let (replayed, _) = replay_run(config, TileCatalog::default(), &restored, ticks)?;
    let replay_hash = replayed.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    run.reload();
    info!("Reloaded at score {}", run.player().score_value());

    Ok(())
}

/// Pick this tick's input: turn when a turn tile allows it, jump low
/// barriers and slide under raised ones.
fn autopilot(run: &Run) -> InputFrame {
    let player = run.player();
    let track = run.track();

    if let Some(turn) = track.turn_tile_near(player.position, run.config().movement.turn_snap_radius) {
        return if turn.kind.accepts_turn(1) {
            InputFrame::turn_right()
        } else {
            InputFrame::turn_left()
        };
    }

    let reach = player.forward_speed * 0.3 + 0.65;
    for obstacle in track.obstacles() {
        let ahead = (obstacle.position - player.position).dot(player.movement_direction);
        if ahead <= 0.0 || ahead > reach {
            continue;
        }
        return if obstacle.bounds.min.y > obstacle.position.y + 0.5 {
            InputFrame::slide()
        } else {
            InputFrame::jump()
        };
    }

    InputFrame::idle()
}
