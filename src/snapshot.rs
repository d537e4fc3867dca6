//! Read-only views of a session for rendering collaborators
//!
//! A snapshot is a detached copy: holding one never blocks the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bearing;
use crate::settings::GuidanceSettings;
use crate::sim::{Arena, Body, SessionPhase, World};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketView {
    pub position: Vec2,
    pub radius: f32,
    pub heading: f32,
    /// Last guidance commit (direction indicator)
    pub intended_heading: f32,
    /// Live bearing to the planet (center of the range indicator)
    pub target_bearing: f32,
    /// Past positions, oldest first
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetView {
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
    pub heading: f32,
}

/// Guidance tunables in the collaborator's units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceView {
    /// Full width of the range indicator (radians)
    pub angle_error_range: f32,
    pub redirect_interval_ms: u64,
}

impl From<&GuidanceSettings> for GuidanceView {
    fn from(settings: &GuidanceSettings) -> Self {
        Self {
            angle_error_range: settings.angle_error_range,
            redirect_interval_ms: settings.redirect_interval.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub arena: Arena,
    pub rocket: RocketView,
    pub planet: PlanetView,
    pub obstacles: Vec<ObstacleView>,
    pub phase: SessionPhase,
    pub time_ticks: u64,
    pub elapsed_secs: f32,
    pub guidance: GuidanceView,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Copy the renderable state out of a world
pub fn build_snapshot(
    world: &World,
    phase: SessionPhase,
    time_ticks: u64,
    elapsed_secs: f32,
    guidance: &GuidanceSettings,
) -> Snapshot {
    let rocket = &world.rocket;
    Snapshot {
        arena: world.arena,
        rocket: RocketView {
            position: rocket.position,
            radius: rocket.radius(),
            heading: rocket.heading(),
            intended_heading: rocket.intended_heading(),
            target_bearing: bearing(rocket.position, world.planet.position),
            trail: rocket.trail().iter().copied().collect(),
        },
        planet: PlanetView {
            position: world.planet.position,
            radius: world.planet.radius(),
        },
        obstacles: world
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                id: o.id,
                position: o.position,
                radius: o.radius(),
                heading: o.heading(),
            })
            .collect(),
        phase,
        time_ticks,
        elapsed_secs,
        guidance: GuidanceView::from(guidance),
    }
}
