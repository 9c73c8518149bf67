//! # Jumping Jack Runtime Core
//!
//! Deterministic simulation of an endless runner: a procedurally generated
//! track of tiles and a runner that jumps, slides and turns along it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    JUMPING JACK CORE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── math.rs     - Headings, rotations, boxes (glam)         │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Run logic                                 │
//! │  ├── catalog.rs  - Tile, obstacle and pickup descriptors     │
//! │  ├── config.rs   - Movement and track tunables               │
//! │  ├── track.rs    - Track generation and recycling            │
//! │  ├── state.rs    - Runner state and capsule                  │
//! │  ├── collision.rs- Capsule-vs-track contacts                 │
//! │  ├── movement.rs - Runner movement state machine             │
//! │  ├── input.rs    - Input frames and recording                │
//! │  ├── events.rs   - Run events and listeners                  │
//! │  └── run.rs      - Per-tick composition root                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! - No HashMap (uses BTreeMap for spawn-order iteration)
//! - No system time dependencies inside the simulation
//! - All randomness from seeded Xorshift128+
//! - Fixed tick rate for recorded runs
//!
//! Given identical inputs and seed, a run replays to the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use game::catalog::{TileCatalog, TileKind};
pub use game::config::RunConfig;
pub use game::input::{InputFrame, PlayerInputBuffer};
pub use game::run::{replay_run, Run, TickResult};
pub use game::state::PlayerState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the fixed rate
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;
