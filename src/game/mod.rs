//! Game Logic Module
//!
//! All run simulation code. Deterministic for a given seed and input stream.
//!
//! ## Module Structure
//!
//! - `catalog`: Tile, obstacle and pickup descriptors
//! - `config`: Movement and track tunables
//! - `track`: Track generation and recycling
//! - `state`: Runner state and capsule
//! - `collision`: Capsule-vs-track contact tests
//! - `movement`: Runner movement state machine
//! - `input`: Input frames and recording
//! - `events`: Run events and the event bus
//! - `run`: Per-tick composition of all of the above
//! - `error`: Error types

pub mod catalog;
pub mod config;
pub mod error;
pub mod track;
pub mod state;
pub mod collision;
pub mod movement;
pub mod input;
pub mod events;
pub mod run;

// Re-export key types
pub use catalog::{TileCatalog, TileDescriptor, TileKind};
pub use config::{MovementConfig, RunConfig, TrackConfig};
pub use error::{ConfigError, RunError, TrackError};
pub use events::{AudioCue, EventBus, RunEvent, RunEventData, RunListener};
pub use input::{InputFrame, PlayerInputBuffer};
pub use movement::RunnerMovementController;
pub use run::{replay_run, Run, TickResult};
pub use state::PlayerState;
pub use track::{TrackGenerator, TurnTile};
