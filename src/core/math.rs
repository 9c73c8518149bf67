//! Math helpers on top of `glam`.
//!
//! The track lives on the XZ plane with +Y up. Headings are always one of the
//! four axis-aligned unit vectors; a positive quarter turn rotates +Z toward +X
//! (a right turn seen from above).

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use serde::{Serialize, Deserialize};

/// Heading of a fresh run.
pub const FORWARD: Vec3 = Vec3::Z;

/// World up axis.
pub const UP: Vec3 = Vec3::Y;

/// Yaw rotation of `sign` quarter turns (+1 right, -1 left).
#[inline]
pub fn quarter_turn(sign: f32) -> Quat {
    Quat::from_rotation_y(FRAC_PI_2 * sign)
}

/// Rotate an axis-aligned heading by a quarter turn, snapping away float drift.
#[inline]
pub fn rotate_heading(direction: Vec3, sign: f32) -> Vec3 {
    snap_to_axis(quarter_turn(sign) * direction)
}

/// Round every component to the nearest integer.
///
/// Headings produced by repeated quarter turns accumulate `1e-8` noise;
/// rounding keeps them exact unit axes.
#[inline]
pub fn snap_to_axis(v: Vec3) -> Vec3 {
    Vec3::new(v.x.round(), v.y.round(), v.z.round())
}

/// Orientation that points local +Z along a horizontal direction.
#[inline]
pub fn look_rotation(direction: Vec3) -> Quat {
    Quat::from_rotation_y(direction.x.atan2(direction.z))
}

/// Size of the world-space bounding box of a box of `local_size` under `rotation`.
#[inline]
pub fn world_extent(local_size: Vec3, rotation: Quat) -> Vec3 {
    let x = (rotation * Vec3::new(local_size.x, 0.0, 0.0)).abs();
    let y = (rotation * Vec3::new(0.0, local_size.y, 0.0)).abs();
    let z = (rotation * Vec3::new(0.0, 0.0, local_size.z)).abs();
    snap_small(x + y + z)
}

/// Position of `value` between `a` and `b`, clamped to [0, 1].
///
/// Returns 0 when the range is empty.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Linear interpolation without clamping.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// Snap to a 1/1024 grid when within EPS of it; catalog sizes all sit on it.
fn snap_small(v: Vec3) -> Vec3 {
    const EPS: f32 = 1e-4;
    let snap = |c: f32| {
        let q = (c * 1024.0).round() / 1024.0;
        if (c - q).abs() < EPS { q } else { c }
    };
    Vec3::new(snap(v.x), snap(v.y), snap(v.z))
}

// =============================================================================
// AXIS-ALIGNED BOXES
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box centered on `center` with full extents `size`.
    #[inline]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    /// Check overlap with another box (touching counts).
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Check whether the horizontal projection contains the point.
    #[inline]
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check overlap with a sphere.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_turn_from_forward() {
        assert_eq!(rotate_heading(FORWARD, 1.0), Vec3::X);
        assert_eq!(rotate_heading(FORWARD, -1.0), Vec3::NEG_X);
    }

    #[test]
    fn test_four_turns_return_home() {
        let mut dir = FORWARD;
        for _ in 0..4 {
            dir = rotate_heading(dir, 1.0);
        }
        assert_eq!(dir, FORWARD);
    }

    #[test]
    fn test_look_rotation_matches_heading() {
        for dir in [Vec3::Z, Vec3::X, Vec3::NEG_Z, Vec3::NEG_X] {
            let rotated = look_rotation(dir) * FORWARD;
            assert!(rotated.abs_diff_eq(dir, 1e-5), "{dir:?} -> {rotated:?}");
        }
    }

    #[test]
    fn test_world_extent_swaps_axes() {
        let size = Vec3::new(4.0, 0.5, 10.0);
        assert_eq!(world_extent(size, look_rotation(Vec3::Z)), size);
        assert_eq!(world_extent(size, look_rotation(Vec3::X)), Vec3::new(10.0, 0.5, 4.0));
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(4.0, 30.0, 4.0), 0.0);
        assert_eq!(inverse_lerp(4.0, 30.0, 30.0), 1.0);
        assert_eq!(inverse_lerp(4.0, 30.0, 50.0), 1.0);
        assert_eq!(inverse_lerp(4.0, 30.0, 17.0), 0.5);
        assert_eq!(inverse_lerp(3.0, 3.0, 9.0), 0.0);
    }

    #[test]
    fn test_aabb_queries() {
        let a = Aabb::from_center_size(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::from_center_size(Vec3::new(1.5, 0.0, 0.0), Vec3::splat(1.0));
        let c = Aabb::from_center_size(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(1.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_xz(Vec3::new(1.0, 50.0, -1.0)));
        assert!(a.intersects_sphere(Vec3::new(1.05, 0.0, 0.0), 0.1));
        assert!(!a.intersects_sphere(Vec3::new(1.2, 0.0, 0.0), 0.1));
    }
}
