//! Runner Movement Controller
//!
//! Per-tick locomotion of the player:
//!
//! 1. Score accrual
//! 2. Grounded test against the track
//! 3. Forward motion along the heading
//! 4. Speed-coupled gravity and landing
//! 5. Fall-off detection
//! 6. Speed ramp, slide timer, obstacle and pickup contacts
//!
//! Jump, slide and turn are edge-triggered inputs applied between ticks.
//! Once the runner is dead every operation is a no-op.

use glam::Vec3;
use tracing::{debug, info};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::math::{inverse_lerp, lerp, quarter_turn, rotate_heading};
use crate::game::collision::{is_grounded, obstacle_contact, pickup_contact, resolve_landing};
use crate::game::config::MovementConfig;
use crate::game::events::{AudioCue, EventBus, RunEventData};
use crate::game::state::{PlayerState, SlideState};
use crate::game::track::TrackGenerator;

/// Vertical speed below which an ungrounded runner counts as falling.
const FALLING_THRESHOLD: f32 = -0.1;

/// Animation rate stops ramping once it reaches this.
const MAX_ANIMATION_RATE: f32 = 1.25;

/// Floor for the jump height so the launch velocity stays positive.
const MIN_JUMP_HEIGHT: f32 = 0.01;

/// Drives one runner.
#[derive(Clone, Debug)]
pub struct RunnerMovementController {
    config: MovementConfig,
    state: PlayerState,
}

impl RunnerMovementController {
    /// Fresh runner at the origin.
    pub fn new(config: MovementConfig) -> Self {
        let state = PlayerState::new(&config);
        Self { config, state }
    }

    /// Back to the starting state.
    pub fn reset(&mut self) {
        self.state = PlayerState::new(&self.config);
    }

    /// Current runner state.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Mutable runner state, for placing the runner directly.
    pub fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    /// Tunables in use.
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Check if the run is still going.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state.alive
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance the runner by `dt` seconds.
    pub fn update(&mut self, dt: f32, track: &mut TrackGenerator, bus: &mut EventBus) {
        if !self.state.alive {
            return;
        }
        let config = &self.config;
        let player = &mut self.state;

        player.score += config.score_multiplier * dt;
        bus.emit(RunEventData::ScoreUpdated { score: player.score_value() });

        let grounded = is_grounded(track, player.position);
        player.grounded = grounded;

        player.position += player.movement_direction * player.forward_speed * dt;

        if grounded && player.velocity.y < 0.0 {
            player.velocity.y = config.ground_stick;
        }
        let speed_fraction = inverse_lerp(config.initial_speed, config.max_speed, player.forward_speed);
        let mut gravity = lerp(config.initial_gravity, config.max_gravity, speed_fraction);
        if player.velocity.y < 0.0 {
            gravity *= config.fall_multiplier;
        }
        player.velocity.y -= gravity * dt;

        let previous_y = player.position.y;
        player.position.y += player.velocity.y * dt;
        resolve_landing(track, previous_y, player, config.ground_stick);

        if !grounded && player.velocity.y < FALLING_THRESHOLD {
            player.airborne_time += dt;
        } else {
            player.airborne_time = 0.0;
        }
        if player.airborne_time > config.fall_tolerance {
            debug!("Runner fell off the track at {:?}", player.position);
            self.die(bus);
            return;
        }

        if player.forward_speed < config.max_speed {
            player.forward_speed = (player.forward_speed + config.speed_increase_rate * dt).min(config.max_speed);
            if player.animation_rate < MAX_ANIMATION_RATE {
                player.animation_rate += dt / player.forward_speed;
            }
        }

        if let Some(slide) = player.slide.as_mut() {
            slide.remaining -= dt;
            if slide.remaining <= 0.0 {
                player.cancel_slide();
            }
        }

        #[cfg(feature = "debug-tracing")]
        trace!(
            "pos={:?} vy={:.3} speed={:.3} grounded={} air={:.3}",
            player.position,
            player.velocity.y,
            player.forward_speed,
            grounded,
            player.airborne_time
        );

        self.handle_contacts(track, bus);
    }

    /// Ease the facing toward its target.
    pub fn late_update(&mut self, dt: f32) {
        let t = (self.config.turn_speed * dt).clamp(0.0, 1.0);
        self.state.rotation = self.state.rotation.lerp(self.state.facing_target, t);
    }

    // =========================================================================
    // INPUTS
    // =========================================================================

    /// Launch a jump. Only from the floor and not mid-slide.
    pub fn jump(&mut self, track: &TrackGenerator) -> bool {
        if !self.can_act(track) {
            return false;
        }
        let height = self.config.jump_height.max(MIN_JUMP_HEIGHT);
        self.state.velocity.y = (2.0 * self.config.initial_gravity * height).sqrt();
        true
    }

    /// Start a slide. Only from the floor and not already sliding.
    ///
    /// The capsule is halved for one slide clip at the current animation rate.
    pub fn slide(&mut self, track: &TrackGenerator) -> bool {
        if !self.can_act(track) {
            return false;
        }
        let player = &mut self.state;
        let restore = player.capsule;
        player.capsule = restore.crouched();
        player.slide = Some(SlideState {
            remaining: self.config.slide_clip_length / player.animation_rate,
            restore,
        });
        true
    }

    /// Try a turn (`-1` left, `+1` right).
    ///
    /// On success the heading rotates a quarter turn, the runner snaps onto
    /// the turn pivot, and the new heading is returned so the caller can
    /// extend the track.
    pub fn turn(&mut self, value: i8, track: &TrackGenerator, bus: &mut EventBus) -> Option<Vec3> {
        if !self.state.alive || !matches!(value, -1 | 1) {
            return None;
        }
        let turn_tile = track.turn_tile_near(self.state.position, self.config.turn_snap_radius)?;
        if !turn_tile.kind.accepts_turn(value) {
            return None;
        }

        let sign = f32::from(value);
        let player = &mut self.state;
        player.movement_direction = rotate_heading(player.movement_direction, sign);
        bus.emit(RunEventData::HeadingChanged { direction: player.movement_direction });

        player.position.x = turn_tile.pivot.x;
        player.position.z = turn_tile.pivot.z;
        player.facing_target = (player.facing_target * quarter_turn(sign)).normalize();

        debug!(
            "Turned {} on tile {} toward {:?}",
            if value < 0 { "left" } else { "right" },
            turn_tile.tile_id,
            player.movement_direction
        );
        Some(player.movement_direction)
    }

    /// End the run. Later calls do nothing.
    ///
    /// Emits the final score followed by the game over event.
    pub fn die(&mut self, bus: &mut EventBus) {
        if !self.state.alive {
            return;
        }
        self.state.alive = false;
        self.state.cancel_slide();

        let score = self.state.score_value();
        bus.emit(RunEventData::ScoreUpdated { score });
        bus.emit(RunEventData::GameOver { final_score: score });
        info!("Run over with score {}", score);
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn can_act(&self, track: &TrackGenerator) -> bool {
        self.state.alive && !self.state.is_sliding() && is_grounded(track, self.state.position)
    }

    fn handle_contacts(&mut self, track: &mut TrackGenerator, bus: &mut EventBus) {
        if let Some(obstacle) = obstacle_contact(&self.state, track) {
            debug!("Runner hit obstacle {}", obstacle);
            self.die(bus);
            return;
        }

        let Some(id) = pickup_contact(&self.state, track) else {
            return;
        };
        let Some(pickup) = track.take_pickup(id) else {
            return;
        };
        bus.emit(RunEventData::AudioCue(AudioCue::PickupCollected));
        bus.emit(RunEventData::PickupCollected { pickup_id: pickup.id, kind: pickup.kind });

        if self.config.pickup_speed_boost > 0.0 {
            let player = &mut self.state;
            player.forward_speed = (player.forward_speed + self.config.pickup_speed_boost).min(self.config.max_speed);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
