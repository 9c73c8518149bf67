//! Track Generation and Recycling
//!
//! Builds an endless path out of catalog tiles. The generator keeps a cursor
//! (append point + heading), places one straight run followed by a single
//! turn tile, and on every committed turn throws away everything behind the
//! player before laying down the next run.
//!
//! Live sets are `BTreeMap`s keyed by monotonic ids, so iteration order is
//! spawn order and a seeded generator always produces the same layout.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::hash::{StateHash, StateHasher};
use crate::core::math::{look_rotation, snap_to_axis, world_extent, Aabb, FORWARD, UP};
use crate::core::rng::DeterministicRng;
use crate::game::catalog::{PickupKind, TileCatalog, TileDescriptor, TileKind};
use crate::game::config::TrackConfig;
use crate::game::error::TrackError;

/// Tile identifier (monotonic counter).
pub type TileId = u32;

/// Obstacle identifier (monotonic counter).
pub type ObstacleId = u32;

/// Pickup identifier (monotonic counter).
pub type PickupId = u32;

// =============================================================================
// INSTANCES
// =============================================================================

/// A spawned tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileInstance {
    /// Unique tile id
    pub id: TileId,
    /// Tile category
    pub kind: TileKind,
    /// World-space bounding size
    pub footprint: Vec3,
    /// World-space turn pivot (turn kinds only)
    pub pivot: Option<Vec3>,
    /// World-space turn trigger volume (turn kinds only)
    pub turn_trigger: Option<Aabb>,
    /// Spawn position; the floor surface passes through it
    pub position: Vec3,
    /// Spawn orientation
    pub rotation: Quat,
}

impl TileInstance {
    /// Floor height of this tile.
    #[inline]
    pub fn floor_height(&self) -> f32 {
        self.position.y
    }

    /// World bounds, with the top face on the floor.
    pub fn bounds(&self) -> Aabb {
        let center = self.position - UP * (self.footprint.y * 0.5);
        Aabb::from_center_size(center, self.footprint)
    }
}

/// A spawned blocking obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleInstance {
    /// Unique obstacle id
    pub id: ObstacleId,
    /// Index into the catalog's obstacle list
    pub catalog_index: usize,
    /// Spawn position (on the tile floor)
    pub position: Vec3,
    /// Spawn orientation
    pub rotation: Quat,
    /// World collision box
    pub bounds: Aabb,
}

/// A spawned pickup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupInstance {
    /// Unique pickup id
    pub id: PickupId,
    /// Pickup kind
    pub kind: PickupKind,
    /// Center of the pickup
    pub position: Vec3,
    /// Contact radius
    pub radius: f32,
}

/// Result of a turn proximity query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnTile {
    /// Tile the turn happens on
    pub tile_id: TileId,
    /// Which turns the tile accepts
    pub kind: TileKind,
    /// Point the runner snaps to
    pub pivot: Vec3,
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Owns every live tile, obstacle and pickup and extends the path.
#[derive(Clone, Debug)]
pub struct TrackGenerator {
    catalog: TileCatalog,
    config: TrackConfig,
    seed: u64,
    rng: DeterministicRng,

    tiles: BTreeMap<TileId, TileInstance>,
    obstacles: BTreeMap<ObstacleId, ObstacleInstance>,
    pickups: BTreeMap<PickupId, PickupInstance>,

    cursor_position: Vec3,
    cursor_direction: Vec3,

    next_tile_id: TileId,
    next_obstacle_id: ObstacleId,
    next_pickup_id: PickupId,

    /// Newest straight tile; obstacle and pickup rolls land on it
    last_straight: Option<TileId>,

    /// Tiles in the current run, ahead of the pending turn tile
    run_length: u32,
    /// Straight tiles in the current run
    straight_count: u32,
    initialized: bool,
}

impl TrackGenerator {
    /// Create an uninitialized generator.
    pub fn new(catalog: TileCatalog, config: TrackConfig, seed: u64) -> Self {
        Self {
            catalog,
            config,
            seed,
            rng: DeterministicRng::new(seed),
            tiles: BTreeMap::new(),
            obstacles: BTreeMap::new(),
            pickups: BTreeMap::new(),
            cursor_position: Vec3::ZERO,
            cursor_direction: FORWARD,
            next_tile_id: 0,
            next_obstacle_id: 0,
            next_pickup_id: 0,
            last_straight: None,
            run_length: 0,
            straight_count: 0,
            initialized: false,
        }
    }

    /// Lay down the starting track.
    ///
    /// Clears everything, reseeds, then spawns `straight_run_length` tiles of
    /// `starting_kind` and one random turn tile. Calling it again yields the
    /// identical starting layout.
    pub fn initialize(&mut self, starting_kind: TileKind, straight_run_length: u32) {
        self.rng = DeterministicRng::new(self.seed);
        self.tiles.clear();
        self.obstacles.clear();
        self.pickups.clear();
        self.cursor_position = Vec3::ZERO;
        self.cursor_direction = FORWARD;
        self.next_tile_id = 0;
        self.next_obstacle_id = 0;
        self.next_pickup_id = 0;
        self.last_straight = None;
        self.initialized = true;

        let starting = match self.catalog.descriptor(starting_kind) {
            Some(descriptor) if !descriptor.kind.is_turn() => descriptor.clone(),
            _ => {
                warn!("Starting tile {:?} is not a straight tile, using the catalog straight", starting_kind);
                self.catalog.straight.clone()
            }
        };

        for _ in 0..straight_run_length {
            self.place(&starting, false);
        }
        self.run_length = straight_run_length;
        self.straight_count = straight_run_length;
        self.spawn_random_turn();

        debug!(
            "Track initialized: {} tiles, cursor {:?}",
            self.tiles.len(),
            self.cursor_position
        );
    }

    /// Append one tile to the current run.
    ///
    /// Straight tiles roll for an obstacle when `obstacle_slot` is set and for
    /// a pickup when it is not, then advance the cursor by their depth. Turn
    /// tiles never advance the cursor; that happens on commit. Once a turn
    /// tile ends the run nothing more can be appended until `commit_turn`.
    pub fn spawn_tile(
        &mut self,
        kind: TileKind,
        obstacle_slot: bool,
    ) -> Result<TileInstance, TrackError> {
        self.ensure_initialized()?;
        if self.pending_turn().is_some() {
            return Err(TrackError::TurnPending);
        }
        let descriptor = self
            .catalog
            .descriptor(kind)
            .cloned()
            .ok_or(TrackError::UnknownTile(kind))?;

        let tile = self.place(&descriptor, obstacle_slot);
        if !tile.kind.is_turn() {
            self.run_length += 1;
            self.straight_count += 1;
        }
        Ok(tile)
    }

    /// Roll for a pickup on the newest straight tile.
    pub fn maybe_spawn_pickup(&mut self) -> Result<Option<PickupId>, TrackError> {
        self.ensure_initialized()?;
        Ok(self.roll_pickup())
    }

    /// Roll for an obstacle on the newest straight tile.
    pub fn maybe_spawn_obstacle(&mut self) -> Result<Option<ObstacleId>, TrackError> {
        self.ensure_initialized()?;
        Ok(self.roll_obstacle())
    }

    /// Extend the track after a validated turn.
    ///
    /// 1. Recycle: keep only the newest tile (the one being turned on),
    ///    drop every obstacle and pickup.
    /// 2. Move the cursor off the turn tile along `new_direction`.
    /// 3. Spawn a straight run of random length; its first tile is always clear.
    /// 4. Spawn the next turn tile.
    pub fn commit_turn(&mut self, new_direction: Vec3) -> Result<(), TrackError> {
        self.ensure_initialized()?;

        let turn_tile = match self.tiles.values().next_back() {
            Some(tile) if tile.kind.is_turn() => *tile,
            _ => return Err(TrackError::NoPendingTurn),
        };

        let direction = snap_to_axis(new_direction);
        self.cursor_direction = direction;
        self.recycle();

        // Turn meshes overlap the next run by a fixed margin; sideways tiles
        // are symmetric and have none.
        let base = Vec3::splat(self.catalog.straight_collider_depth * 0.5);
        let placement = if turn_tile.kind == TileKind::SidewaysTurn {
            turn_tile.footprint * 0.5 + base
        } else {
            turn_tile.footprint - Vec3::splat(self.catalog.turn_overlap_margin) + base
        };
        self.cursor_position += placement * direction;

        let length = self
            .rng
            .next_int_range(self.config.min_straight, self.config.max_straight);
        let straight = self.catalog.straight.clone();
        for i in 0..length {
            self.place(&straight, i != 0);
        }
        self.run_length = length + 1;
        self.straight_count = length;
        self.spawn_random_turn();

        debug!(
            "Turn committed toward {:?}: run of {} straights, cursor {:?}, {} live tiles",
            direction,
            length,
            self.cursor_position,
            self.tiles.len()
        );

        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Find the pending turn tile if its trigger touches the sphere.
    ///
    /// Only the newest tile can be the upcoming turn; the tile kept alive
    /// under the runner after a commit is never offered twice.
    pub fn turn_tile_near(&self, point: Vec3, radius: f32) -> Option<TurnTile> {
        let tile = self.pending_turn()?;
        let trigger = tile.turn_trigger?;
        let pivot = tile.pivot?;

        if trigger.intersects_sphere(point, radius) {
            Some(TurnTile {
                tile_id: tile.id,
                kind: tile.kind,
                pivot,
            })
        } else {
            None
        }
    }

    /// Floor height of the highest tile covering the horizontal point.
    pub fn ground_height_at(&self, point: Vec3) -> Option<f32> {
        self.tiles
            .values()
            .filter(|tile| tile.bounds().contains_xz(point))
            .map(|tile| tile.floor_height())
            .reduce(f32::max)
    }

    /// First obstacle overlapping the box.
    pub fn obstacle_hit(&self, bounds: &Aabb) -> Option<ObstacleId> {
        self.obstacles
            .values()
            .find(|obstacle| obstacle.bounds.intersects(bounds))
            .map(|obstacle| obstacle.id)
    }

    /// First pickup overlapping the box.
    pub fn pickup_hit(&self, bounds: &Aabb) -> Option<PickupId> {
        self.pickups
            .values()
            .find(|pickup| bounds.intersects_sphere(pickup.position, pickup.radius))
            .map(|pickup| pickup.id)
    }

    /// Remove a pickup the runner collected.
    pub fn take_pickup(&mut self, id: PickupId) -> Option<PickupInstance> {
        self.pickups.remove(&id)
    }

    /// Newest tile, if it is a turn tile.
    pub fn pending_turn(&self) -> Option<&TileInstance> {
        self.tiles.values().next_back().filter(|tile| tile.kind.is_turn())
    }

    /// Live tiles in spawn order.
    pub fn tiles(&self) -> impl Iterator<Item = &TileInstance> {
        self.tiles.values()
    }

    /// Live obstacles in spawn order.
    pub fn obstacles(&self) -> impl Iterator<Item = &ObstacleInstance> {
        self.obstacles.values()
    }

    /// Live pickups in spawn order.
    pub fn pickups(&self) -> impl Iterator<Item = &PickupInstance> {
        self.pickups.values()
    }

    /// Number of live tiles.
    pub fn live_tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles in the current run ahead of the pending turn tile.
    ///
    /// After a commit the run starts at the tile being turned on, so the live
    /// set is always exactly this plus the pending turn tile.
    pub fn current_run_length(&self) -> u32 {
        self.run_length
    }

    /// Straight tiles in the current run.
    pub fn straight_run_length(&self) -> u32 {
        self.straight_count
    }

    /// Append point and heading.
    pub fn cursor(&self) -> (Vec3, Vec3) {
        (self.cursor_position, self.cursor_direction)
    }

    /// Hash of the live layout and cursor.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_track_layout();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }

    /// Feed the live layout into a hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for tile in self.tiles.values() {
            hasher.update_u32(tile.id);
            hasher.update_u8(tile.kind as u8);
            hasher.update_vec3(tile.position);
            hasher.update_quat(tile.rotation);
            hasher.update_vec3(tile.footprint);
        }
        for obstacle in self.obstacles.values() {
            hasher.update_u32(obstacle.id);
            hasher.update_u32(obstacle.catalog_index as u32);
            hasher.update_vec3(obstacle.position);
        }
        for pickup in self.pickups.values() {
            hasher.update_u32(pickup.id);
            hasher.update_vec3(pickup.position);
        }
        hasher.update_vec3(self.cursor_position);
        hasher.update_vec3(self.cursor_direction);
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn ensure_initialized(&self) -> Result<(), TrackError> {
        if self.initialized {
            Ok(())
        } else {
            Err(TrackError::NotInitialized)
        }
    }

    fn place(&mut self, descriptor: &TileDescriptor, obstacle_slot: bool) -> TileInstance {
        let rotation = look_rotation(self.cursor_direction);
        let position = self.cursor_position;
        let footprint = world_extent(descriptor.size, rotation);

        let pivot = descriptor
            .pivot
            .filter(|_| descriptor.kind.is_turn())
            .map(|offset| position + rotation * offset);
        let turn_trigger = pivot.map(|p| {
            let size = world_extent(descriptor.turn_trigger, rotation);
            Aabb::from_center_size(p + UP * (size.y * 0.5), size)
        });

        let id = self.next_tile_id;
        self.next_tile_id += 1;
        let tile = TileInstance {
            id,
            kind: descriptor.kind,
            footprint,
            pivot,
            turn_trigger,
            position,
            rotation,
        };
        self.tiles.insert(id, tile);

        if !descriptor.kind.is_turn() {
            self.last_straight = Some(id);
            if obstacle_slot {
                self.roll_obstacle();
            } else {
                self.roll_pickup();
            }
            self.cursor_position += footprint * self.cursor_direction;
        }

        tile
    }

    fn spawn_random_turn(&mut self) -> Option<TileInstance> {
        let descriptor = self.rng.choose(&self.catalog.turn_tiles)?.clone();
        Some(self.place(&descriptor, false))
    }

    fn slot_tile(&self) -> Option<TileInstance> {
        self.last_straight.and_then(|id| self.tiles.get(&id)).copied()
    }

    fn roll_obstacle(&mut self) -> Option<ObstacleId> {
        let tile = self.slot_tile()?;
        if !self.rng.chance(self.config.obstacle_chance) {
            return None;
        }
        if self.catalog.obstacles.is_empty() {
            return None;
        }
        let catalog_index = self.rng.next_int(self.catalog.obstacles.len() as u32) as usize;
        let descriptor = &self.catalog.obstacles[catalog_index];

        let rotation = tile.rotation;
        let position = tile.position;
        let size = world_extent(descriptor.size, rotation);
        let center = position + UP * (descriptor.elevation + size.y * 0.5);

        let id = self.next_obstacle_id;
        self.next_obstacle_id += 1;
        self.obstacles.insert(
            id,
            ObstacleInstance {
                id,
                catalog_index,
                position,
                rotation,
                bounds: Aabb::from_center_size(center, size),
            },
        );
        Some(id)
    }

    fn roll_pickup(&mut self) -> Option<PickupId> {
        let tile = self.slot_tile()?;
        if !self.rng.chance(self.config.pickup_chance) {
            return None;
        }
        let descriptor = self.catalog.pickup.as_ref()?;

        let id = self.next_pickup_id;
        self.next_pickup_id += 1;
        self.pickups.insert(
            id,
            PickupInstance {
                id,
                kind: descriptor.kind,
                position: tile.position + UP * descriptor.lift,
                radius: descriptor.radius,
            },
        );
        Some(id)
    }

    fn recycle(&mut self) {
        let dropped_tiles = self.tiles.len().saturating_sub(1);
        if let Some((id, newest)) = self.tiles.pop_last() {
            self.tiles.clear();
            self.tiles.insert(id, newest);
        }
        self.last_straight = None;
        let dropped_obstacles = self.obstacles.len();
        let dropped_pickups = self.pickups.len();
        self.obstacles.clear();
        self.pickups.clear();

        debug!(
            "Recycled {} tiles, {} obstacles, {} pickups",
            dropped_tiles, dropped_obstacles, dropped_pickups
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
