//! Core primitives.
//!
//! Seeded randomness, state hashing and the small amount of geometry the
//! simulation needs. Nothing here knows about tiles or runners.

pub mod math;
pub mod rng;
pub mod hash;

// Re-export core types
pub use math::Aabb;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
