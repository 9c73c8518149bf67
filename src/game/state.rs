//! Runner State
//!
//! Kinematic state of the player: transform, velocities, capsule shape, the
//! timed slide substate and the alive flag.

use glam::{Quat, Vec3};
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::math::{Aabb, FORWARD};
use crate::game::config::MovementConfig;

// =============================================================================
// CAPSULE
// =============================================================================

/// Vertical collision capsule. `center` is relative to the player's feet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    /// Total height
    pub height: f32,
    /// Radius
    pub radius: f32,
    /// Center offset above the feet
    pub center: Vec3,
}

impl Capsule {
    /// Standing capsule resting on the feet.
    pub fn standing(height: f32, radius: f32) -> Self {
        Self {
            height,
            radius,
            center: Vec3::new(0.0, height * 0.5, 0.0),
        }
    }

    /// Half-height capsule, lowered so its bottom stays on the feet.
    pub fn crouched(&self) -> Self {
        let height = self.height * 0.5;
        Self {
            height,
            radius: self.radius,
            center: self.center - Vec3::new(0.0, (self.height - height) * 0.5, 0.0),
        }
    }

    /// World bounding box with the feet at `position`.
    pub fn bounds(&self, position: Vec3) -> Aabb {
        let size = Vec3::new(self.radius * 2.0, self.height, self.radius * 2.0);
        Aabb::from_center_size(position + self.center, size)
    }
}

/// Active slide: time left and the capsule to restore.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlideState {
    /// Seconds until the slide ends
    pub remaining: f32,
    /// Capsule before the slide started
    pub restore: Capsule,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Runner kinematic state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Feet position
    pub position: Vec3,
    /// Velocity; only `y` is integrated, forward motion uses `forward_speed`
    pub velocity: Vec3,
    /// Forward speed, never decreasing
    pub forward_speed: f32,
    /// Axis-aligned heading
    pub movement_direction: Vec3,
    /// Current facing
    pub rotation: Quat,
    /// Facing the rotation is easing toward
    pub facing_target: Quat,
    /// On the floor as of the last grounded test
    pub grounded: bool,
    /// Continuous time spent falling
    pub airborne_time: f32,
    /// False once the run has ended
    pub alive: bool,
    /// Accumulated score
    pub score: f32,
    /// Animation playback rate; scales slide duration
    pub animation_rate: f32,
    /// Collision capsule
    pub capsule: Capsule,
    /// Slide substate
    pub slide: Option<SlideState>,
}

impl PlayerState {
    /// Fresh runner at the origin facing forward.
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            // Resting on the floor
            velocity: Vec3::new(0.0, config.ground_stick, 0.0),
            forward_speed: config.initial_speed,
            movement_direction: FORWARD,
            rotation: Quat::IDENTITY,
            facing_target: Quat::IDENTITY,
            grounded: false,
            airborne_time: 0.0,
            alive: true,
            score: 0.0,
            animation_rate: 1.0,
            capsule: Capsule::standing(config.capsule_height, config.capsule_radius),
            slide: None,
        }
    }

    /// Check if the slide substate is active.
    #[inline]
    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    /// Score as reported to listeners.
    #[inline]
    pub fn score_value(&self) -> i32 {
        self.score as i32
    }

    /// World bounds of the capsule.
    pub fn bounds(&self) -> Aabb {
        self.capsule.bounds(self.position)
    }

    /// End the slide early and restore the standing capsule.
    pub fn cancel_slide(&mut self) {
        if let Some(slide) = self.slide.take() {
            self.capsule = slide.restore;
        }
    }

    /// Hash this state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec3(self.position);
        hasher.update_vec3(self.velocity);
        hasher.update_f32(self.forward_speed);
        hasher.update_vec3(self.movement_direction);
        hasher.update_quat(self.facing_target);
        hasher.update_bool(self.grounded);
        hasher.update_f32(self.airborne_time);
        hasher.update_bool(self.alive);
        hasher.update_f32(self.score);
        hasher.update_f32(self.animation_rate);
        hasher.update_f32(self.capsule.height);
        hasher.update_bool(self.is_sliding());
    }
}
