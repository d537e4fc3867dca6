//! Periodic rocket guidance
//!
//! Every `redirect_interval` the rocket is pointed at the planet with a
//! uniform random error. Between activations it flies straight.

use std::time::Duration;

use rand::Rng;

use super::state::{Planet, Rocket};
use crate::bearing;

/// Accumulates elapsed wall time and reports due activations.
///
/// The interval is passed in on every call so configuration changes take
/// effect at the next activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidanceTimer {
    accumulated: Duration,
}

impl GuidanceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elapsed` and return how many activations fell due
    pub fn advance(&mut self, elapsed: Duration, interval: Duration) -> u32 {
        if interval.is_zero() {
            return 0;
        }
        self.accumulated += elapsed;
        let mut due = 0;
        while self.accumulated >= interval {
            self.accumulated -= interval;
            due += 1;
        }
        due
    }

    /// Time carried toward the next activation
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// Heading toward the planet perturbed by `uniform(-1, 1) * range / 2`
pub fn intended_heading<R: Rng>(
    rocket: &Rocket,
    planet: &Planet,
    angle_error_range: f32,
    rng: &mut R,
) -> f32 {
    let target = bearing(rocket.position, planet.position);
    if angle_error_range <= 0.0 {
        return target;
    }
    let error = rng.random_range(-1.0f32..1.0) * (angle_error_range / 2.0);
    target + error
}

/// Recompute and commit the rocket's heading; returns the committed heading
pub fn redirect<R: Rng>(
    rocket: &mut Rocket,
    planet: &Planet,
    angle_error_range: f32,
    rng: &mut R,
) -> f32 {
    let heading = intended_heading(rocket, planet, angle_error_range, rng);
    rocket.commit_heading(heading);
    log::debug!(
        "Guidance commit: heading {:.1}° (error range {:.1}°)",
        rocket.intended_heading().to_degrees(),
        angle_error_range.to_degrees()
    );
    rocket.intended_heading()
}
