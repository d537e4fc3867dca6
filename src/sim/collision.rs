//! Circle collision detection and response
//!
//! Symmetric pairs (obstacle/obstacle, obstacle/rocket) are pushed apart
//! along the line of centers and get new headings from the session's
//! `CollisionPolicy`. The planet never moves: an obstacle that touches it is
//! reflected and snapped onto the planet's exclusion circle.

use glam::Vec2;
use rand::Rng;

use super::state::{Body, Obstacle, Planet, World};
use crate::consts::{SEPARATION_MARGIN, SWAP_JITTER};
use crate::settings::CollisionPolicy;
use crate::{bearing, distance, polar_to_cartesian};

/// Overlap test for two circles (touching is not a collision)
#[inline]
pub fn circles_overlap(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> bool {
    distance(p1, p2) < r1 + r2
}

/// True if two bodies overlap
#[inline]
pub fn bodies_overlap<A: Body + ?Sized, B: Body + ?Sized>(a: &A, b: &B) -> bool {
    circles_overlap(a.position(), a.radius(), b.position(), b.radius())
}

/// Specular reflection of a heading about the collision angle
#[inline]
pub fn reflect_heading(heading: f32, collision_angle: f32) -> f32 {
    2.0 * collision_angle - heading - std::f32::consts::PI
}

/// Push two overlapping bodies apart and reassign their headings.
///
/// Only positions and headings change; speed and radius are untouched.
pub fn resolve_pair<A, B, R>(a: &mut A, b: &mut B, policy: CollisionPolicy, rng: &mut R)
where
    A: Body + ?Sized,
    B: Body + ?Sized,
    R: Rng,
{
    let angle = bearing(a.position(), b.position());
    let overlap = a.radius() + b.radius() - distance(a.position(), b.position()) + SEPARATION_MARGIN;
    let push = polar_to_cartesian(overlap / 2.0, angle);

    a.set_position(a.position() - push);
    b.set_position(b.position() + push);

    match policy {
        CollisionPolicy::Reflect => {
            a.set_heading(reflect_heading(a.heading(), angle));
            b.set_heading(reflect_heading(b.heading(), angle));
        }
        CollisionPolicy::SwapJitter => {
            let (ha, hb) = (a.heading(), b.heading());
            a.set_heading(hb + rng.random_range(-SWAP_JITTER..=SWAP_JITTER));
            b.set_heading(ha + rng.random_range(-SWAP_JITTER..=SWAP_JITTER));
        }
    }
}

/// Bounce an obstacle off the immobile planet
pub fn resolve_planet(planet: &Planet, obstacle: &mut Obstacle) {
    let angle = bearing(planet.position, obstacle.position);
    obstacle.set_heading(reflect_heading(obstacle.heading(), angle));
    obstacle.position =
        planet.position + polar_to_cartesian(planet.radius() + obstacle.radius(), angle);
}

/// Resolve every overlapping pair in the world, in the fixed order:
/// obstacle pairs, then obstacles vs rocket, then obstacles vs planet.
///
/// Returns the number of resolutions applied.
pub fn resolve_collisions<R: Rng>(
    world: &mut World,
    policy: CollisionPolicy,
    rng: &mut R,
) -> usize {
    let mut resolved = 0;

    // Each unordered pair exactly once (i < j)
    let n = world.obstacles.len();
    for i in 0..n {
        let (head, tail) = world.obstacles.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if bodies_overlap(&*a, &*b) {
                resolve_pair(a, b, policy, rng);
                resolved += 1;
            }
        }
    }

    for obstacle in world.obstacles.iter_mut() {
        if bodies_overlap(&world.rocket, &*obstacle) {
            resolve_pair(&mut world.rocket, obstacle, policy, rng);
            resolved += 1;
        }
    }

    for obstacle in world.obstacles.iter_mut() {
        if circles_overlap(
            world.planet.position,
            world.planet.radius(),
            obstacle.position,
            obstacle.radius(),
        ) {
            resolve_planet(&world.planet, obstacle);
            resolved += 1;
        }
    }

    resolved
}
