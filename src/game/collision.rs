//! Collision Detection
//!
//! Capsule-vs-track contact tests. The runner's capsule is approximated by
//! its bounding box; tiles, obstacles and pickups come from the track queries.

use glam::Vec3;

use crate::game::state::PlayerState;
use crate::game::track::{ObstacleId, PickupId, TrackGenerator};

/// Feet within this distance of a floor count as standing on it.
pub const GROUND_SNAP: f32 = 0.05;

/// Floor height under the feet, if the feet rest on it.
pub fn ground_contact(track: &TrackGenerator, position: Vec3) -> Option<f32> {
    let floor = track.ground_height_at(position)?;
    if (position.y - floor).abs() <= GROUND_SNAP {
        Some(floor)
    } else {
        None
    }
}

/// Check if the feet rest on a tile.
#[inline]
pub fn is_grounded(track: &TrackGenerator, position: Vec3) -> bool {
    ground_contact(track, position).is_some()
}

/// Stop a vertical step that passed through a floor.
///
/// Only floors the feet started above can catch them; a runner that already
/// dropped below the track keeps falling. Returns true on landing.
pub fn resolve_landing(
    track: &TrackGenerator,
    previous_y: f32,
    player: &mut PlayerState,
    ground_stick: f32,
) -> bool {
    let Some(floor) = track.ground_height_at(player.position) else {
        return false;
    };
    if previous_y < floor - GROUND_SNAP || player.position.y >= floor {
        return false;
    }

    player.position.y = floor;
    if player.velocity.y < ground_stick {
        player.velocity.y = ground_stick;
    }
    true
}

/// First obstacle the capsule touches.
#[inline]
pub fn obstacle_contact(player: &PlayerState, track: &TrackGenerator) -> Option<ObstacleId> {
    track.obstacle_hit(&player.bounds())
}

/// First pickup the capsule touches.
#[inline]
pub fn pickup_contact(player: &PlayerState, track: &TrackGenerator) -> Option<PickupId> {
    track.pickup_hit(&player.bounds())
}
