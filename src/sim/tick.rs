//! One simulation step
//!
//! Motion -> containment -> collisions -> win check. Phase handling lives in
//! `Session`; this module only advances the entity set.

use rand::Rng;

use super::boundary::contain;
use super::collision::resolve_collisions;
use super::state::{Body, World};
use crate::settings::CollisionPolicy;

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub wall_hits: usize,
    pub collisions: usize,
    /// Rocket touched the planet
    pub reached: bool,
}

/// Move a body one step along its heading
#[inline]
pub fn integrate<B: Body + ?Sized>(body: &mut B) {
    let next = body.position() + body.velocity();
    body.set_position(next);
}

/// Advance the rocket and every obstacle; the planet never moves
pub fn integrate_motion(world: &mut World) {
    integrate(&mut world.rocket);
    world.rocket.record_trail();
    for obstacle in world.obstacles.iter_mut() {
        integrate(obstacle);
    }
}

/// Keep every movable entity inside the arena; returns the number of bodies clamped
pub fn contain_all(world: &mut World) -> usize {
    let arena = world.arena;
    let mut hits = usize::from(contain(&mut world.rocket, &arena).any());
    for obstacle in world.obstacles.iter_mut() {
        if contain(obstacle, &arena).any() {
            hits += 1;
        }
    }
    hits
}

/// Advance the world by one tick
pub fn tick<R: Rng>(world: &mut World, policy: CollisionPolicy, rng: &mut R) -> TickReport {
    integrate_motion(world);
    let wall_hits = contain_all(world);
    let collisions = resolve_collisions(world, policy, rng);
    let reached = world.rocket_reached_planet();

    TickReport {
        wall_hits,
        collisions,
        reached,
    }
}
