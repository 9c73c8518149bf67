//! Run configuration.
//!
//! Every tunable of the movement controller and the track generator, with
//! the design defaults. Loadable from JSON; missing fields keep defaults.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::game::error::ConfigError;

/// Tunables of the runner movement controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Forward speed at the start of a run
    pub initial_speed: f32,
    /// Forward speed cap
    pub max_speed: f32,
    /// Forward speed gained per second
    pub speed_increase_rate: f32,
    /// Apex height of a jump
    pub jump_height: f32,
    /// Gravity at initial speed; also the launch gravity for jumps
    pub initial_gravity: f32,
    /// Gravity at max speed
    pub max_gravity: f32,
    /// Gravity multiplier while descending
    pub fall_multiplier: f32,
    /// Radius of the turn eligibility sphere
    pub turn_snap_radius: f32,
    /// Rate of the facing interpolation (per second)
    pub turn_speed: f32,
    /// Length of the slide animation clip at animation rate 1
    pub slide_clip_length: f32,
    /// Score gained per second alive
    pub score_multiplier: f32,
    /// Continuous falling time before the run ends
    pub fall_tolerance: f32,
    /// Vertical velocity held while standing on the floor
    pub ground_stick: f32,
    /// Forward speed granted by a pickup (0 disables)
    pub pickup_speed_boost: f32,
    /// Standing capsule height
    pub capsule_height: f32,
    /// Capsule radius
    pub capsule_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            initial_speed: 4.0,
            max_speed: 30.0,
            speed_increase_rate: 0.1,
            jump_height: 2.0,
            initial_gravity: 9.81,
            max_gravity: 25.0,
            fall_multiplier: 2.5,
            turn_snap_radius: 0.1,
            turn_speed: 15.0,
            slide_clip_length: 1.0,
            score_multiplier: 10.0,
            fall_tolerance: 0.5,
            ground_stick: -2.0,
            pickup_speed_boost: 0.0,
            capsule_height: 2.0,
            capsule_radius: 0.4,
        }
    }
}

/// Tunables of the track generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Straight tiles before the first turn
    pub initial_straight_count: u32,
    /// Shortest straight run between turns
    pub min_straight: u32,
    /// Longest straight run between turns (inclusive)
    pub max_straight: u32,
    /// Chance of a pickup on an obstacle-free straight
    pub pickup_chance: f32,
    /// Chance that an obstacle slot is filled
    pub obstacle_chance: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            initial_straight_count: 10,
            min_straight: 3,
            max_straight: 15,
            pickup_chance: 0.6,
            obstacle_chance: 0.3,
        }
    }
}

/// Complete run configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Movement tunables
    pub movement: MovementConfig,
    /// Track tunables
    pub track: TrackConfig,
}

impl RunConfig {
    /// Parse from a JSON document and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        let t = &self.track;

        // Written as negated comparisons so NaN fails every check
        if !(m.initial_speed > 0.0) {
            return Err(ConfigError::invalid("movement.initial_speed", "must be positive"));
        }
        if !(m.max_speed >= m.initial_speed) {
            return Err(ConfigError::invalid("movement.max_speed", "must be >= initial_speed"));
        }
        if !(m.speed_increase_rate >= 0.0) {
            return Err(ConfigError::invalid("movement.speed_increase_rate", "must not be negative"));
        }
        if !m.jump_height.is_finite() {
            return Err(ConfigError::invalid("movement.jump_height", "must be finite"));
        }
        if !(m.initial_gravity > 0.0 && m.max_gravity >= m.initial_gravity) {
            return Err(ConfigError::invalid("movement.max_gravity", "gravity must be positive and max >= initial"));
        }
        if !(m.fall_multiplier > 0.0) {
            return Err(ConfigError::invalid("movement.fall_multiplier", "must be positive"));
        }
        if !(m.turn_snap_radius >= 0.0) {
            return Err(ConfigError::invalid("movement.turn_snap_radius", "must not be negative"));
        }
        if !(m.turn_speed >= 0.0) {
            return Err(ConfigError::invalid("movement.turn_speed", "must not be negative"));
        }
        if !(m.slide_clip_length > 0.0) {
            return Err(ConfigError::invalid("movement.slide_clip_length", "must be positive"));
        }
        if !m.score_multiplier.is_finite() {
            return Err(ConfigError::invalid("movement.score_multiplier", "must be finite"));
        }
        if !(m.fall_tolerance > 0.0) {
            return Err(ConfigError::invalid("movement.fall_tolerance", "must be positive"));
        }
        if !(m.ground_stick <= 0.0) {
            return Err(ConfigError::invalid("movement.ground_stick", "must not point upward"));
        }
        if !(m.pickup_speed_boost >= 0.0) {
            return Err(ConfigError::invalid("movement.pickup_speed_boost", "must not be negative"));
        }
        if !(m.capsule_height > 0.0 && m.capsule_radius > 0.0) {
            return Err(ConfigError::invalid("movement.capsule_height", "capsule must have positive size"));
        }
        if t.min_straight == 0 {
            return Err(ConfigError::invalid("track.min_straight", "runs need at least one straight tile"));
        }
        if t.max_straight < t.min_straight {
            return Err(ConfigError::invalid("track.max_straight", "must be >= min_straight"));
        }
        for (field, p) in [("track.pickup_chance", t.pickup_chance), ("track.obstacle_chance", t.obstacle_chance)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(field, "probability must be within [0, 1]"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RunConfig::from_json_str(r#"{ "movement": { "max_speed": 40.0 } }"#).unwrap();

        assert_eq!(config.movement.max_speed, 40.0);
        assert_eq!(config.movement.initial_speed, 4.0);
        assert_eq!(config.track, TrackConfig::default());
    }

    #[test]
    fn test_rejects_inverted_run_lengths() {
        let err = RunConfig::from_json_str(r#"{ "track": { "min_straight": 9, "max_straight": 2 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "track.max_straight", .. }));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = RunConfig::default();
        config.track.obstacle_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let cases: [fn(&mut RunConfig); 5] = [
            |c| c.movement.fall_tolerance = f32::NAN,
            |c| c.movement.max_speed = f32::NAN,
            |c| c.movement.max_gravity = f32::NAN,
            |c| c.movement.ground_stick = f32::NAN,
            |c| c.movement.capsule_radius = f32::NAN,
        ];

        for set_nan in cases {
            let mut config = RunConfig::default();
            set_nan(&mut config);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "{config:?}"
            );
        }

        let mut config = RunConfig::default();
        config.track.pickup_chance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(RunConfig::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
    }
}
