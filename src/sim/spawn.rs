//! Entity placement at session start and reset
//!
//! Entities without an explicit `Spawn` are placed uniformly so that their
//! circle lies inside the arena, with a uniform random heading.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision::circles_overlap;
use super::state::{Arena, Obstacle, Planet, Rocket, World};
use crate::bearing;
use crate::consts::MAX_SPAWN_ATTEMPTS;
use crate::settings::SessionParams;

/// Uniform position keeping a circle of `radius` inside the arena
pub fn random_position<R: Rng>(arena: &Arena, radius: f32, rng: &mut R) -> Vec2 {
    Vec2::new(
        sample_axis(radius, arena.width - radius, rng),
        sample_axis(radius, arena.height - radius, rng),
    )
}

fn sample_axis<R: Rng>(lo: f32, hi: f32, rng: &mut R) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

pub fn random_heading<R: Rng>(rng: &mut R) -> f32 {
    rng.random_range(0.0..TAU)
}

/// Build a fresh entity set from validated parameters
pub fn populate<R: Rng>(params: &SessionParams, rng: &mut R) -> World {
    let arena = Arena::new(params.arena.width, params.arena.height);

    let planet_position = params
        .planet
        .position
        .unwrap_or_else(|| random_position(&arena, params.planet.radius, rng));
    let planet = Planet::new(planet_position, params.planet.radius);

    let rocket = spawn_rocket(params, &arena, &planet, rng);

    let obstacle_params = &params.obstacles;
    let obstacles = (0..obstacle_params.count)
        .map(|i| {
            let (position, heading) = match obstacle_params.spawns.get(i) {
                Some(spawn) => (spawn.position, spawn.heading),
                None => (
                    random_position(&arena, obstacle_params.radius, rng),
                    random_heading(rng),
                ),
            };
            Obstacle::new(
                i as u32,
                position,
                obstacle_params.radius,
                obstacle_params.speed,
                heading,
            )
        })
        .collect();

    World {
        arena,
        rocket,
        planet,
        obstacles,
    }
}

fn spawn_rocket<R: Rng>(params: &SessionParams, arena: &Arena, planet: &Planet, rng: &mut R) -> Rocket {
    let rp = &params.rocket;
    let (position, heading) = match rp.spawn {
        Some(spawn) => (spawn.position, spawn.heading),
        None => {
            let mut position = random_position(arena, rp.radius, rng);
            let mut attempts = 1;
            while attempts < MAX_SPAWN_ATTEMPTS
                && circles_overlap(position, rp.radius, planet.position, planet.radius())
            {
                position = random_position(arena, rp.radius, rng);
                attempts += 1;
            }
            if circles_overlap(position, rp.radius, planet.position, planet.radius()) {
                log::warn!("Rocket spawned touching the planet after {} attempts", attempts);
            }
            // Start out pointing at the planet; guidance takes over from here
            (position, bearing(position, planet.position))
        }
    };

    Rocket::new(position, rp.radius, rp.speed, heading, rp.trail_capacity)
}
