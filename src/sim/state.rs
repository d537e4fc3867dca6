//! Entity model: rocket, planet, obstacle pool, arena
//!
//! Radius and speed are private so they cannot change after creation.
//! Headings go through `set_heading`, which keeps them in [0, 2π).

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{normalize_heading, polar_to_cartesian};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Entities placed, waiting for `start`
    #[default]
    Idle,
    /// Ticks and guidance are live
    Running,
    /// Frozen by the collaborator's pause signal
    Paused,
    /// Rocket touched the planet; frozen until reset
    Reached,
}

/// Axis-aligned arena `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if a circle lies fully inside the arena
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        pos.x - radius >= 0.0
            && pos.x + radius <= self.width
            && pos.y - radius >= 0.0
            && pos.y + radius <= self.height
    }
}

/// A moving circle that collides with others
pub trait Body {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    fn radius(&self) -> f32;
    fn speed(&self) -> f32;
    fn heading(&self) -> f32;
    /// Store a heading, normalized to [0, 2π)
    fn set_heading(&mut self, heading: f32);

    /// Displacement for one tick along the current heading
    fn velocity(&self) -> Vec2 {
        polar_to_cartesian(self.speed(), self.heading())
    }
}

/// The guided projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub position: Vec2,
    radius: f32,
    heading: f32,
    speed: f32,
    /// Last heading committed by guidance (display only)
    intended_heading: f32,
    /// Past positions, oldest first
    trail: VecDeque<Vec2>,
    trail_capacity: Option<usize>,
}

impl Rocket {
    pub fn new(
        position: Vec2,
        radius: f32,
        speed: f32,
        heading: f32,
        trail_capacity: Option<usize>,
    ) -> Self {
        let heading = normalize_heading(heading);
        Self {
            position,
            radius,
            heading,
            speed,
            intended_heading: heading,
            trail: VecDeque::new(),
            trail_capacity,
        }
    }

    pub fn intended_heading(&self) -> f32 {
        self.intended_heading
    }

    /// Guidance commit: steer and remember the intent
    pub fn commit_heading(&mut self, heading: f32) {
        self.set_heading(heading);
        self.intended_heading = self.heading;
    }

    pub fn trail(&self) -> &VecDeque<Vec2> {
        &self.trail
    }

    /// Append the current position to the trail (call once per tick)
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.position);
        if let Some(cap) = self.trail_capacity {
            while self.trail.len() > cap {
                self.trail.pop_front();
            }
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }
}

impl Body for Rocket {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn heading(&self) -> f32 {
        self.heading
    }

    fn set_heading(&mut self, heading: f32) {
        self.heading = normalize_heading(heading);
    }
}

/// The stationary target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub position: Vec2,
    radius: f32,
}

impl Planet {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// A member of the obstacle pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Stable identity (index in the pool)
    pub id: u32,
    pub position: Vec2,
    radius: f32,
    heading: f32,
    speed: f32,
}

impl Obstacle {
    pub fn new(id: u32, position: Vec2, radius: f32, speed: f32, heading: f32) -> Self {
        Self {
            id,
            position,
            radius,
            heading: normalize_heading(heading),
            speed,
        }
    }
}

impl Body for Obstacle {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn heading(&self) -> f32 {
        self.heading
    }

    fn set_heading(&mut self, heading: f32) {
        self.heading = normalize_heading(heading);
    }
}

/// The full mutable entity set of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub arena: Arena,
    pub rocket: Rocket,
    pub planet: Planet,
    /// Fixed-size pool, ordered by id
    pub obstacles: Vec<Obstacle>,
}

impl World {
    /// True if the rocket currently touches the planet
    pub fn rocket_reached_planet(&self) -> bool {
        crate::sim::collision::circles_overlap(
            self.rocket.position,
            self.rocket.radius(),
            self.planet.position,
            self.planet.radius(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_headings_normalized_on_construction() {
        let rocket = Rocket::new(Vec2::ZERO, 10.0, 1.0, -PI / 2.0, None);
        assert!((rocket.heading() - 1.5 * PI).abs() < 1e-5);

        let obstacle = Obstacle::new(0, Vec2::ZERO, 5.0, 1.0, 3.0 * TAU + 0.5);
        assert!((obstacle.heading() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_commit_heading_updates_intent() {
        let mut rocket = Rocket::new(Vec2::ZERO, 10.0, 1.0, 0.0, None);
        rocket.commit_heading(-PI);
        assert!((rocket.heading() - PI).abs() < 1e-5);
        assert_eq!(rocket.heading(), rocket.intended_heading());
    }

    #[test]
    fn test_trail_capacity() {
        let mut rocket = Rocket::new(Vec2::ZERO, 10.0, 1.0, 0.0, Some(3));
        for i in 0..5 {
            rocket.position = Vec2::new(i as f32, 0.0);
            rocket.record_trail();
        }
        let xs: Vec<f32> = rocket.trail().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);

        rocket.clear_trail();
        assert!(rocket.trail().is_empty());
    }

    #[test]
    fn test_unbounded_trail() {
        let mut rocket = Rocket::new(Vec2::ZERO, 10.0, 1.0, 0.0, None);
        for _ in 0..5000 {
            rocket.record_trail();
        }
        assert_eq!(rocket.trail().len(), 5000);
    }

    #[test]
    fn test_velocity_follows_heading() {
        let obstacle = Obstacle::new(0, Vec2::ZERO, 5.0, 2.0, PI / 2.0);
        let v = obstacle.velocity();
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_arena_contains_circle() {
        let arena = Arena::new(100.0, 50.0);
        assert!(arena.contains_circle(Vec2::new(10.0, 10.0), 10.0));
        assert!(!arena.contains_circle(Vec2::new(9.0, 10.0), 10.0));
        assert!(!arena.contains_circle(Vec2::new(50.0, 45.0), 10.0));
    }
}
