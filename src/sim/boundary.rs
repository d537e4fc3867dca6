//! Arena wall containment
//!
//! A hard clamp: the heading is mirrored on the violated axis and the
//! position is pulled back so the circle lies inside the arena.

use std::f32::consts::PI;

use super::state::{Arena, Body};

/// Which walls were hit this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub horizontal: bool,
    pub vertical: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

/// Reflect and clamp a body that crosses the arena edges.
///
/// Both axes are checked independently, so a corner applies both corrections.
pub fn contain<B: Body + ?Sized>(body: &mut B, arena: &Arena) -> WallHit {
    let r = body.radius();
    let mut pos = body.position();
    let mut hit = WallHit::default();

    if pos.x - r < 0.0 || pos.x + r > arena.width {
        body.set_heading(PI - body.heading());
        pos.x = pos.x.clamp(r, arena.width - r);
        hit.horizontal = true;
    }
    if pos.y - r < 0.0 || pos.y + r > arena.height {
        body.set_heading(-body.heading());
        pos.y = pos.y.clamp(r, arena.height - r);
        hit.vertical = true;
    }

    if hit.any() {
        body.set_position(pos);
    }
    hit
}
