//! Tile Catalog
//!
//! Immutable descriptors for everything the generator can place: tiles,
//! obstacles and the pickup. Sizes are local (heading +Z); the generator
//! rotates them into world space when it spawns an instance.

use glam::Vec3;
use serde::{Serialize, Deserialize};

/// Category of a track tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    /// Plain forward segment
    Straight = 0,
    /// Turn tile that only accepts a left turn
    TurnLeft = 1,
    /// Turn tile that only accepts a right turn
    TurnRight = 2,
    /// T-junction; either direction is accepted
    SidewaysTurn = 3,
}

impl TileKind {
    /// Check if this is one of the turn kinds.
    #[inline]
    pub fn is_turn(self) -> bool {
        !matches!(self, TileKind::Straight)
    }

    /// Check whether a turn input (`-1` left, `+1` right) is valid on this tile.
    pub fn accepts_turn(self, value: i8) -> bool {
        match self {
            TileKind::TurnLeft => value == -1,
            TileKind::TurnRight => value == 1,
            TileKind::SidewaysTurn => value == -1 || value == 1,
            TileKind::Straight => false,
        }
    }
}

/// Descriptor of a placeable tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Tile category
    pub kind: TileKind,
    /// Local bounding size (x = width, y = thickness, z = depth along heading)
    pub size: Vec3,
    /// Turn pivot, relative to the tile origin (turn kinds only)
    pub pivot: Option<Vec3>,
    /// Local size of the turn trigger volume centered on the pivot.
    /// A zero size reduces turn detection to "pivot within the snap radius".
    #[serde(default)]
    pub turn_trigger: Vec3,
}

impl TileDescriptor {
    /// Standard straight segment.
    pub fn straight(size: Vec3) -> Self {
        Self {
            kind: TileKind::Straight,
            size,
            pivot: None,
            turn_trigger: Vec3::ZERO,
        }
    }

    /// Turn tile with the pivot at its origin.
    pub fn turn(kind: TileKind, size: Vec3, turn_trigger: Vec3) -> Self {
        Self {
            kind,
            size,
            pivot: Some(Vec3::ZERO),
            turn_trigger,
        }
    }
}

/// Descriptor of a blocking obstacle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    /// Display name, used in logs
    pub name: String,
    /// Local bounding size
    pub size: Vec3,
    /// Height of the box bottom above the floor
    pub elevation: f32,
}

/// Kind of pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PickupKind {
    /// Lightning bolt, named for a speed boost
    SpeedBoost = 0,
}

/// Descriptor of the pickup placed on straight tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupDescriptor {
    /// Pickup kind
    pub kind: PickupKind,
    /// Contact radius
    pub radius: f32,
    /// Height above the tile floor
    pub lift: f32,
}

impl Default for PickupDescriptor {
    fn default() -> Self {
        Self {
            kind: PickupKind::SpeedBoost,
            radius: 0.5,
            lift: 1.0,
        }
    }
}

/// Everything the generator can place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileCatalog {
    /// Straight segment used for every run
    pub straight: TileDescriptor,
    /// Depth of the straight tile's collider; part of the post-turn offset
    pub straight_collider_depth: f32,
    /// Candidate turn tiles, chosen uniformly
    pub turn_tiles: Vec<TileDescriptor>,
    /// Candidate obstacles, chosen uniformly
    pub obstacles: Vec<ObstacleDescriptor>,
    /// Pickup placed on obstacle-free straights (`None` disables pickups)
    pub pickup: Option<PickupDescriptor>,
    /// Overlap built into the left/right turn meshes
    pub turn_overlap_margin: f32,
}

impl TileCatalog {
    /// Look up a tile descriptor by kind.
    ///
    /// Returns the first matching turn tile for turn kinds.
    pub fn descriptor(&self, kind: TileKind) -> Option<&TileDescriptor> {
        if kind == TileKind::Straight {
            return Some(&self.straight);
        }
        self.turn_tiles.iter().find(|t| t.kind == kind)
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        let trigger = Vec3::new(4.0, 2.0, 1.0);
        Self {
            straight: TileDescriptor::straight(Vec3::new(4.0, 0.5, 10.0)),
            straight_collider_depth: 10.0,
            turn_tiles: vec![
                TileDescriptor::turn(TileKind::TurnLeft, Vec3::new(4.0, 0.5, 10.0), trigger),
                TileDescriptor::turn(TileKind::TurnRight, Vec3::new(4.0, 0.5, 10.0), trigger),
                TileDescriptor::turn(TileKind::SidewaysTurn, Vec3::new(12.0, 0.5, 10.0), trigger),
            ],
            obstacles: vec![
                // Jump over
                ObstacleDescriptor {
                    name: "low_barrier".to_string(),
                    size: Vec3::new(4.0, 1.0, 0.5),
                    elevation: 0.0,
                },
                // Slide under
                ObstacleDescriptor {
                    name: "high_barrier".to_string(),
                    size: Vec3::new(4.0, 1.5, 0.5),
                    elevation: 1.2,
                },
            ],
            pickup: Some(PickupDescriptor::default()),
            turn_overlap_margin: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_acceptance() {
        assert!(TileKind::TurnLeft.accepts_turn(-1));
        assert!(!TileKind::TurnLeft.accepts_turn(1));
        assert!(TileKind::TurnRight.accepts_turn(1));
        assert!(!TileKind::TurnRight.accepts_turn(-1));
        assert!(TileKind::SidewaysTurn.accepts_turn(-1));
        assert!(TileKind::SidewaysTurn.accepts_turn(1));
        assert!(!TileKind::Straight.accepts_turn(1));
        assert!(!TileKind::SidewaysTurn.accepts_turn(0));
    }

    #[test]
    fn test_default_catalog_shape() {
        let catalog = TileCatalog::default();

        assert!(!catalog.straight.kind.is_turn());
        assert!(catalog.turn_tiles.iter().all(|t| t.kind.is_turn() && t.pivot.is_some()));
        assert_eq!(catalog.descriptor(TileKind::SidewaysTurn).map(|t| t.size.x), Some(12.0));
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = TileCatalog::default();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: TileCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
