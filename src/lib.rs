//! Rocket Field - a guided rocket crossing a field of bouncing obstacles
//!
//! Core modules:
//! - `sim`: Simulation engine (motion, containment, collisions, guidance)
//! - `session`: Owned session object driving the simulation
//! - `snapshot`: Read-only views for rendering collaborators
//! - `runtime`: Threaded driver serializing frame and guidance activations
//! - `settings`: Session parameters and guidance tunables

pub mod error;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use error::{ConfigError, ConfigResult};
pub use session::{ReachedEvent, Session};
pub use settings::{
    CollisionPolicy, GuidanceSettings, ObstacleParams, PlanetParams, RocketParams, SessionParams,
    Spawn,
};
pub use snapshot::Snapshot;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    use std::time::Duration;

    /// Nominal frame interval of the display refresh callback (~60 Hz)
    pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 1500.0;
    pub const ARENA_HEIGHT: f32 = 1000.0;

    /// Rocket defaults (speed in arena units per tick)
    pub const ROCKET_RADIUS: f32 = 20.0;
    pub const ROCKET_SPEED: f32 = 2.0;
    /// Trail points kept for rendering
    pub const TRAIL_CAPACITY: usize = 2000;

    /// Planet defaults
    pub const PLANET_RADIUS: f32 = 30.0;

    /// Obstacle pool defaults
    pub const OBSTACLE_COUNT: usize = 350;
    pub const OBSTACLE_RADIUS: f32 = 13.0;
    pub const OBSTACLE_SPEED: f32 = 1.0;

    /// Guidance defaults
    pub const REDIRECT_INTERVAL_MS: u64 = 2000;
    pub const ANGLE_ERROR_DEG: f32 = 30.0;

    /// Accepted tunable ranges
    pub const MIN_REDIRECT_INTERVAL_MS: u64 = 100;
    pub const MAX_REDIRECT_INTERVAL_MS: u64 = 2000;
    pub const MAX_ANGLE_ERROR_DEG: f32 = 180.0;

    /// Extra distance added when pushing a colliding pair apart
    pub const SEPARATION_MARGIN: f32 = 0.5;
    /// Half-width of the heading jitter used by the swap policy (±15°)
    pub const SWAP_JITTER: f32 = std::f32::consts::PI / 12.0;

    /// Random rocket placement retries before accepting an overlap with the planet
    pub const MAX_SPAWN_ATTEMPTS: u32 = 32;
}

/// Normalize a heading to [0, 2π)
#[inline]
pub fn normalize_heading(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Angle of the vector from `a` to `b`, in (-π, π]
#[inline]
pub fn bearing(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}
