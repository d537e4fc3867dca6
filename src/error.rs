//! Configuration errors
//!
//! Invalid parameters are rejected at `initialize`/`set_config` instead of
//! being clamped into range.

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected session or guidance configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena must have positive finite size, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },

    #[error("{entity} radius must be positive and finite, got {value}")]
    InvalidRadius { entity: &'static str, value: f32 },

    #[error("{entity} speed must be positive and finite, got {value}")]
    InvalidSpeed { entity: &'static str, value: f32 },

    #[error("{entity} with radius {radius} does not fit in a {width}x{height} arena")]
    EntityTooLarge {
        entity: &'static str,
        radius: f32,
        width: f32,
        height: f32,
    },

    #[error("{entity} spawn at ({x}, {y}) is outside the arena")]
    SpawnOutsideArena { entity: &'static str, x: f32, y: f32 },

    #[error("{spawns} obstacle spawns given for a pool of {count}")]
    TooManySpawns { spawns: usize, count: usize },

    #[error("angle error range must be within [0, {max}] degrees, got {value}")]
    AngleErrorOutOfRange { value: f32, max: f32 },

    #[error("redirect interval must be within [{min}, {max}] ms, got {value}")]
    RedirectIntervalOutOfRange { value: u64, min: u64, max: u64 },
}
