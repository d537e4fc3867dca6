//! Simulation engine
//!
//! All entity motion and interaction lives here:
//! - Discrete fixed steps only (speed is per tick)
//! - Randomness only through the caller's seeded RNG
//! - Stable iteration order (by obstacle id)
//! - No rendering or platform dependencies

pub mod boundary;
pub mod collision;
pub mod guidance;
pub mod spawn;
pub mod state;
pub mod tick;

pub use boundary::{WallHit, contain};
pub use collision::{circles_overlap, reflect_heading, resolve_collisions, resolve_pair, resolve_planet};
pub use guidance::{GuidanceTimer, redirect};
pub use state::{Arena, Body, Obstacle, Planet, Rocket, SessionPhase, World};
pub use tick::{TickReport, tick};
