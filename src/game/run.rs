//! Run Loop
//!
//! Composition root for one endless run. Owns the track generator, the runner
//! controller, the event bus and the clock, and routes a validated turn into
//! the single `commit_turn` call that extends the track.

use glam::Vec3;
use tracing::info;

use crate::core::hash::{compute_state_hash, StateHash};
use crate::game::catalog::{TileCatalog, TileKind};
use crate::game::config::RunConfig;
use crate::game::error::RunError;
use crate::game::events::{EventBus, RunEvent, RunListener, SubscriberId};
use crate::game::input::{InputFrame, PlayerInputBuffer};
use crate::game::movement::RunnerMovementController;
use crate::game::state::PlayerState;
use crate::game::track::TrackGenerator;
use crate::TICK_DT;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<RunEvent>,
    /// New heading if a turn was committed this tick
    pub turned: Option<Vec3>,
    /// Whether the run ended this tick
    pub game_over: bool,
}

/// Simulation clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    /// Ticks run so far
    pub tick: u32,
    /// Scaled seconds elapsed
    pub elapsed: f32,
    /// Multiplier on every `dt`; 0 freezes the simulation
    pub time_scale: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            time_scale: 1.0,
        }
    }
}

/// One endless run.
#[derive(Debug)]
pub struct Run {
    config: RunConfig,
    seed: u64,
    track: TrackGenerator,
    runner: RunnerMovementController,
    bus: EventBus,
    clock: Clock,
}

impl Run {
    /// Validate the config and lay down the starting track.
    pub fn new(config: RunConfig, catalog: TileCatalog, seed: u64) -> Result<Self, RunError> {
        config.validate()?;

        let mut track = TrackGenerator::new(catalog, config.track.clone(), seed);
        track.initialize(TileKind::Straight, config.track.initial_straight_count);
        let runner = RunnerMovementController::new(config.movement.clone());

        info!("Run created with seed {}", seed);

        Ok(Self {
            config,
            seed,
            track,
            runner,
            bus: EventBus::new(),
            clock: Clock::default(),
        })
    }

    /// Attach an event listener.
    pub fn attach(&mut self, listener: Box<dyn RunListener>) -> SubscriberId {
        self.bus.attach(listener)
    }

    /// Detach an event listener.
    pub fn detach(&mut self, id: SubscriberId) -> bool {
        self.bus.detach(id)
    }

    /// Run one tick of `dt` seconds with this tick's input.
    ///
    /// Inputs apply before movement: turn, then jump, then slide. A game over
    /// freezes the clock, so later ticks change nothing, the tick count
    /// included.
    pub fn tick(&mut self, dt: f32, input: InputFrame) -> Result<TickResult, RunError> {
        let mut result = TickResult::default();
        if self.clock.time_scale == 0.0 {
            return Ok(result);
        }
        let dt = dt * self.clock.time_scale;

        self.clock.tick += 1;
        self.clock.elapsed += dt;
        self.bus.set_tick(self.clock.tick);

        // The heading only changes when the track can follow it
        if input.turn != 0 && self.track.pending_turn().is_some() {
            if let Some(direction) = self.runner.turn(input.turn, &self.track, &mut self.bus) {
                self.track.commit_turn(direction)?;
                result.turned = Some(direction);
            }
        }
        if input.jump_pressed() {
            self.runner.jump(&self.track);
        }
        if input.slide_pressed() {
            self.runner.slide(&self.track);
        }

        self.runner.update(dt, &mut self.track, &mut self.bus);
        self.runner.late_update(dt);

        result.events = self.bus.take_events();
        result.game_over = result.events.iter().any(RunEvent::is_game_over);
        if result.game_over {
            self.clock.time_scale = 0.0;
            info!(
                "Game over at tick {} after {:.2}s",
                self.clock.tick, self.clock.elapsed
            );
        }

        Ok(result)
    }

    /// Restart from the starting configuration with the same seed.
    ///
    /// Listeners stay attached.
    pub fn reload(&mut self) {
        self.clock = Clock::default();
        self.track
            .initialize(TileKind::Straight, self.config.track.initial_straight_count);
        self.runner.reset();
        self.bus.take_events();
        info!("Run reloaded");
    }

    /// Hash of the track layout and runner state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.clock.tick, self.seed, |hasher| {
            self.track.hash_into(hasher);
            self.runner.state().hash_into(hasher);
        })
    }

    /// Check if the run has ended.
    pub fn is_game_over(&self) -> bool {
        !self.runner.is_alive()
    }

    /// Track generator.
    pub fn track(&self) -> &TrackGenerator {
        &self.track
    }

    /// Runner controller.
    pub fn runner(&self) -> &RunnerMovementController {
        &self.runner
    }

    /// Mutable runner controller, for placing the runner directly.
    pub fn runner_mut(&mut self) -> &mut RunnerMovementController {
        &mut self.runner
    }

    /// Runner state.
    pub fn player(&self) -> &PlayerState {
        self.runner.state()
    }

    /// Simulation clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Track seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Config in use.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

/// Replay a recorded run at the fixed tick rate.
///
/// The seed comes from the recording. Ticks past the end of the recording
/// are idle; replay stops early at game over.
pub fn replay_run(
    config: RunConfig,
    catalog: TileCatalog,
    inputs: &PlayerInputBuffer,
    tick_count: u32,
) -> Result<(Run, Vec<RunEvent>), RunError> {
    let mut run = Run::new(config, catalog, inputs.rng_seed)?;
    let mut all_events = Vec::new();

    let frames = inputs
        .replay_iter()
        .map(|(_, frame)| frame)
        .chain(std::iter::repeat(InputFrame::idle()))
        .take(tick_count as usize);

    for frame in frames {
        let result = run.tick(TICK_DT, frame)?;
        all_events.extend(result.events);

        if result.game_over {
            break;
        }
    }

    Ok((run, all_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::RunEventData;

    fn quiet_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.track.obstacle_chance = 0.0;
        config.track.pickup_chance = 0.0;
        config
    }

    fn right_turns_only() -> TileCatalog {
        let mut catalog = TileCatalog::default();
        catalog.turn_tiles.retain(|t| t.kind == TileKind::TurnRight);
        catalog
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = RunConfig::default();
        config.track.min_straight = 0;

        assert!(matches!(
            Run::new(config, TileCatalog::default(), 1),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn test_tick_runs_forward() {
        let mut run = Run::new(quiet_config(), TileCatalog::default(), 1).unwrap();

        for _ in 0..60 {
            let result = run.tick(TICK_DT, InputFrame::idle()).unwrap();
            assert!(!result.game_over);
        }

        assert_eq!(run.clock().tick, 60);
        assert!(run.player().position.z > 3.9);
        assert!((run.player().score - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_turn_commits_track() {
        let mut run = Run::new(quiet_config(), right_turns_only(), 1).unwrap();
        run.runner_mut().state_mut().position = Vec3::new(0.0, 0.0, 99.9);

        let result = run.tick(TICK_DT, InputFrame::turn_right()).unwrap();

        assert_eq!(result.turned, Some(Vec3::X));
        assert!(result
            .events
            .iter()
            .any(|e| e.data == RunEventData::HeadingChanged { direction: Vec3::X }));
        let straights = run.track().straight_run_length() as usize;
        assert_eq!(run.track().live_tile_count(), straights + 2);

        // Keep running along the new heading
        for _ in 0..120 {
            assert!(!run.tick(TICK_DT, InputFrame::idle()).unwrap().game_over);
        }
        assert!(run.player().position.x > 7.0);
    }

    #[test]
    fn test_game_over_freezes_clock() {
        let mut run = Run::new(quiet_config(), TileCatalog::default(), 1).unwrap();
        run.runner_mut().state_mut().position = Vec3::new(8.0, 0.0, 5.0);

        let mut game_overs = 0;
        for _ in 0..90 {
            let result = run.tick(TICK_DT, InputFrame::jump()).unwrap();
            game_overs += result.events.iter().filter(|e| e.is_game_over()).count();
        }

        assert_eq!(game_overs, 1);
        assert!(run.is_game_over());
        assert_eq!(run.clock().time_scale, 0.0);

        let frozen = run.player().clone();
        let clock = *run.clock();
        let hash = run.compute_hash();
        let result = run.tick(TICK_DT, InputFrame::turn_left()).unwrap();
        assert!(result.events.is_empty());
        assert_eq!(run.player(), &frozen);
        assert_eq!(run.clock(), &clock);
        assert_eq!(run.compute_hash(), hash);
    }

    #[test]
    fn test_turn_without_turn_tile_keeps_heading() {
        let mut catalog = TileCatalog::default();
        catalog.turn_tiles.clear();
        let mut run = Run::new(quiet_config(), catalog, 1).unwrap();
        run.runner_mut().state_mut().position = Vec3::new(0.0, 0.0, 90.0);

        let result = run.tick(TICK_DT, InputFrame::turn_right()).unwrap();

        assert_eq!(result.turned, None);
        assert!(result
            .events
            .iter()
            .all(|e| !matches!(e.data, RunEventData::HeadingChanged { .. })));
        assert_eq!(run.player().movement_direction, Vec3::Z);
        assert_eq!(run.player().facing_target, glam::Quat::IDENTITY);
    }

    #[test]
    fn test_reload_restores_start() {
        let mut run = Run::new(RunConfig::default(), TileCatalog::default(), 42).unwrap();
        let start = run.compute_hash();
        let layout = run.track().fingerprint();

        for _ in 0..30 {
            run.tick(TICK_DT, InputFrame::idle()).unwrap();
        }
        assert_ne!(run.compute_hash(), start);

        run.reload();
        assert_eq!(run.compute_hash(), start);
        assert_eq!(run.track().fingerprint(), layout);
        assert_eq!(run.clock(), &Clock::default());
    }

    #[test]
    fn test_replay_matches_live_run() {
        let seed = 2024;
        let mut run = Run::new(RunConfig::default(), TileCatalog::default(), seed).unwrap();
        let mut recording = PlayerInputBuffer::new([3u8; 16], seed);

        for t in 0..300u32 {
            let frame = match t {
                20 => InputFrame::jump(),
                150 => InputFrame::slide(),
                _ => InputFrame::idle(),
            };
            recording.record(t, frame);
            if run.tick(TICK_DT, frame).unwrap().game_over {
                break;
            }
        }

        let (replayed, _) = replay_run(
            RunConfig::default(),
            TileCatalog::default(),
            &recording,
            run.clock().tick,
        )
        .unwrap();

        assert_eq!(replayed.compute_hash(), run.compute_hash());
    }
}
