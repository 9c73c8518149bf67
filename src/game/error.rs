//! Error types.
//!
//! Only structural misuse and bad configuration are errors. Falling off the
//! track or hitting an obstacle ends the run through the event bus instead.

use crate::game::catalog::TileKind;

/// Misuse of the track generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    /// A mutating operation ran before `initialize`.
    #[error("Track generator used before initialize")]
    NotInitialized,

    /// `commit_turn` ran while the newest tile is not a turn tile.
    #[error("No pending turn tile to commit")]
    NoPendingTurn,

    /// `spawn_tile` ran after a turn tile already ended the run.
    #[error("Run already ends in a turn tile; commit the turn first")]
    TurnPending,

    /// The catalog has no descriptor for the requested kind.
    #[error("Catalog has no {0:?} tile")]
    UnknownTile(TileKind),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config document is not valid JSON for the schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config value {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// Errors surfaced by a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Track generator misuse.
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
