//! Session parameters and guidance tunables
//!
//! `SessionParams` is fixed for a session's lifetime. `GuidanceSettings` may
//! be changed at any time by the configuration collaborator.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};

/// Explicit placement for an entity (position plus initial heading)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub position: Vec2,
    /// Radians; normalized on use
    pub heading: f32,
}

impl Spawn {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// How symmetric collisions reassign headings.
///
/// A session uses exactly one policy for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Specular reflection about the collision angle
    #[default]
    Reflect,
    /// Swap headings, then jitter each by up to ±15°
    SwapJitter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketParams {
    pub radius: f32,
    /// Arena units per tick
    pub speed: f32,
    /// Fixed start; random when `None`
    pub spawn: Option<Spawn>,
    /// Maximum trail points kept (`None` = unbounded)
    pub trail_capacity: Option<usize>,
}

impl Default for RocketParams {
    fn default() -> Self {
        Self {
            radius: ROCKET_RADIUS,
            speed: ROCKET_SPEED,
            spawn: None,
            trail_capacity: Some(TRAIL_CAPACITY),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetParams {
    pub radius: f32,
    /// Fixed position; random when `None`
    pub position: Option<Vec2>,
}

impl Default for PlanetParams {
    fn default() -> Self {
        Self {
            radius: PLANET_RADIUS,
            position: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleParams {
    /// Pool size, constant for the session
    pub count: usize,
    pub radius: f32,
    pub speed: f32,
    /// Explicit placements for the first `spawns.len()` obstacles; the rest are random
    #[serde(default)]
    pub spawns: Vec<Spawn>,
}

impl Default for ObstacleParams {
    fn default() -> Self {
        Self {
            count: OBSTACLE_COUNT,
            radius: OBSTACLE_RADIUS,
            speed: OBSTACLE_SPEED,
            spawns: Vec::new(),
        }
    }
}

/// Guidance tunables, read fresh at every activation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSettings {
    /// Full width of the random heading perturbation (radians)
    pub angle_error_range: f32,
    /// Time between guidance activations
    pub redirect_interval: Duration,
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            angle_error_range: ANGLE_ERROR_DEG.to_radians(),
            redirect_interval: Duration::from_millis(REDIRECT_INTERVAL_MS),
        }
    }
}

impl GuidanceSettings {
    /// Build from the collaborator's units (degrees, milliseconds)
    pub fn from_units(angle_error_deg: f32, redirect_interval_ms: u64) -> ConfigResult<Self> {
        Ok(Self {
            angle_error_range: angle_error_from_degrees(angle_error_deg)?,
            redirect_interval: redirect_interval_from_millis(redirect_interval_ms)?,
        })
    }

    /// Error range in degrees, as shown on parameter controls
    pub fn angle_error_deg(&self) -> f32 {
        self.angle_error_range.to_degrees()
    }

    /// Apply optional updates; nothing changes if either value is rejected
    pub fn with_updates(
        &self,
        angle_error_deg: Option<f32>,
        redirect_interval_ms: Option<u64>,
    ) -> ConfigResult<Self> {
        let mut next = *self;
        if let Some(deg) = angle_error_deg {
            next.angle_error_range = angle_error_from_degrees(deg)?;
        }
        if let Some(ms) = redirect_interval_ms {
            next.redirect_interval = redirect_interval_from_millis(ms)?;
        }
        Ok(next)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        angle_error_from_degrees(self.angle_error_deg())?;
        let ms = self.redirect_interval.as_millis() as u64;
        redirect_interval_from_millis(ms)?;
        Ok(())
    }
}

fn angle_error_from_degrees(deg: f32) -> ConfigResult<f32> {
    // Small slack so a radians -> degrees round trip of 180° still validates
    if !deg.is_finite() || deg < 0.0 || deg > MAX_ANGLE_ERROR_DEG + 1e-3 {
        return Err(ConfigError::AngleErrorOutOfRange {
            value: deg,
            max: MAX_ANGLE_ERROR_DEG,
        });
    }
    Ok(deg.min(MAX_ANGLE_ERROR_DEG).to_radians())
}

fn redirect_interval_from_millis(ms: u64) -> ConfigResult<Duration> {
    if !(MIN_REDIRECT_INTERVAL_MS..=MAX_REDIRECT_INTERVAL_MS).contains(&ms) {
        return Err(ConfigError::RedirectIntervalOutOfRange {
            value: ms,
            min: MIN_REDIRECT_INTERVAL_MS,
            max: MAX_REDIRECT_INTERVAL_MS,
        });
    }
    Ok(Duration::from_millis(ms))
}

/// Everything needed to initialize a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionParams {
    pub arena: ArenaParams,
    pub rocket: RocketParams,
    pub planet: PlanetParams,
    pub obstacles: ObstacleParams,
    pub guidance: GuidanceSettings,
    pub collision_policy: CollisionPolicy,
    /// RNG seed; drawn from the OS when `None`
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArenaParams {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl SessionParams {
    /// Defaults with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_arena(mut self, width: f32, height: f32) -> Self {
        self.arena = ArenaParams { width, height };
        self
    }

    pub fn with_obstacle_count(mut self, count: usize) -> Self {
        self.obstacles.count = count;
        self
    }

    pub fn with_guidance(mut self, guidance: GuidanceSettings) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Reject anything that would produce a meaningless session
    pub fn validate(&self) -> ConfigResult<()> {
        let ArenaParams { width, height } = self.arena;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidArena { width, height });
        }

        check_radius("rocket", self.rocket.radius, width, height)?;
        check_speed("rocket", self.rocket.speed)?;
        check_radius("planet", self.planet.radius, width, height)?;
        check_radius("obstacle", self.obstacles.radius, width, height)?;
        check_speed("obstacle", self.obstacles.speed)?;

        if let Some(spawn) = self.rocket.spawn {
            check_spawn("rocket", spawn.position, self.rocket.radius, width, height)?;
        }
        if let Some(position) = self.planet.position {
            check_spawn("planet", position, self.planet.radius, width, height)?;
        }
        if self.obstacles.spawns.len() > self.obstacles.count {
            return Err(ConfigError::TooManySpawns {
                spawns: self.obstacles.spawns.len(),
                count: self.obstacles.count,
            });
        }
        for spawn in &self.obstacles.spawns {
            check_spawn(
                "obstacle",
                spawn.position,
                self.obstacles.radius,
                width,
                height,
            )?;
        }

        self.guidance.validate()
    }
}

fn check_radius(entity: &'static str, radius: f32, width: f32, height: f32) -> ConfigResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ConfigError::InvalidRadius {
            entity,
            value: radius,
        });
    }
    if 2.0 * radius > width || 2.0 * radius > height {
        return Err(ConfigError::EntityTooLarge {
            entity,
            radius,
            width,
            height,
        });
    }
    Ok(())
}

fn check_speed(entity: &'static str, speed: f32) -> ConfigResult<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(ConfigError::InvalidSpeed {
            entity,
            value: speed,
        });
    }
    Ok(())
}

fn check_spawn(
    entity: &'static str,
    position: Vec2,
    radius: f32,
    width: f32,
    height: f32,
) -> ConfigResult<()> {
    let inside = position.is_finite()
        && position.x >= radius
        && position.x <= width - radius
        && position.y >= radius
        && position.y <= height - radius;
    if !inside {
        return Err(ConfigError::SpawnOutsideArena {
            entity,
            x: position.x,
            y: position.y,
        });
    }
    Ok(())
}
