//! Owned simulation session
//!
//! `Session` owns the entity set, the RNG and the guidance timer. Every
//! activation (tick, guidance, config or lifecycle change) takes `&mut self`
//! and runs to completion, so callers serialize access by construction.

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::FRAME_INTERVAL;
use crate::error::ConfigResult;
use crate::settings::{CollisionPolicy, GuidanceSettings, SessionParams};
use crate::sim::{self, GuidanceTimer, SessionPhase, TickReport, World, spawn};
use crate::snapshot::{Snapshot, build_snapshot};

/// Emitted once per `Running -> Reached` transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachedEvent {
    pub time_ticks: u64,
    pub elapsed_secs: f32,
    pub rocket_position: Vec2,
    pub planet_position: Vec2,
}

type ReachedListener = Box<dyn FnMut(&ReachedEvent) + Send>;

pub struct Session {
    params: SessionParams,
    seed: u64,
    rng: Pcg32,
    world: World,
    phase: SessionPhase,
    guidance: GuidanceSettings,
    timer: GuidanceTimer,
    time_ticks: u64,
    reached_listeners: Vec<ReachedListener>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("time_ticks", &self.time_ticks)
            .field("obstacles", &self.world.obstacles.len())
            .field("guidance", &self.guidance)
            .finish()
    }
}

impl Session {
    /// Validate parameters and place every entity. The session starts `Idle`.
    pub fn initialize(params: SessionParams) -> ConfigResult<Self> {
        if let Err(e) = params.validate() {
            log::warn!("Rejected session parameters: {}", e);
            return Err(e);
        }

        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = spawn::populate(&params, &mut rng);
        log::info!(
            "Session initialized with seed {} ({}x{} arena, {} obstacles)",
            seed,
            params.arena.width,
            params.arena.height,
            params.obstacles.count
        );

        Ok(Self {
            guidance: params.guidance,
            params,
            seed,
            rng,
            world,
            phase: SessionPhase::Idle,
            timer: GuidanceTimer::new(),
            time_ticks: 0,
            reached_listeners: Vec::new(),
        })
    }

    /// `Idle -> Running`
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Running;
            log::info!("Session started");
        }
    }

    /// Freeze or resume a running session
    pub fn set_paused(&mut self, paused: bool) {
        match (self.phase, paused) {
            (SessionPhase::Running, true) => {
                self.phase = SessionPhase::Paused;
                log::info!("Session paused at tick {}", self.time_ticks);
            }
            (SessionPhase::Paused, false) => {
                self.phase = SessionPhase::Running;
                log::info!("Session resumed");
            }
            _ => {}
        }
    }

    /// Fresh placement for every entity and back to `Running`
    pub fn reset(&mut self) {
        self.world = spawn::populate(&self.params, &mut self.rng);
        self.timer.reset();
        self.time_ticks = 0;
        self.phase = SessionPhase::Running;
        log::info!("Session reset");
    }

    /// Advance one step. Inert unless `Running`.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.phase != SessionPhase::Running {
            return None;
        }

        let report = sim::tick(&mut self.world, self.params.collision_policy, &mut self.rng);
        self.time_ticks += 1;

        if report.reached {
            self.phase = SessionPhase::Reached;
            let event = ReachedEvent {
                time_ticks: self.time_ticks,
                elapsed_secs: self.elapsed().as_secs_f32(),
                rocket_position: self.world.rocket.position,
                planet_position: self.world.planet.position,
            };
            log::info!(
                "Rocket reached the planet after {} ticks ({:.1}s)",
                event.time_ticks,
                event.elapsed_secs
            );
            for listener in self.reached_listeners.iter_mut() {
                listener(&event);
            }
        }

        Some(report)
    }

    /// One guidance activation. Inert unless `Running`.
    pub fn redirect(&mut self) -> Option<f32> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        Some(sim::redirect(
            &mut self.world.rocket,
            &self.world.planet,
            self.guidance.angle_error_range,
            &mut self.rng,
        ))
    }

    /// Single-threaded driver: fire every guidance activation due within
    /// `frame_dt`, then run one tick.
    pub fn advance(&mut self, frame_dt: Duration) -> Option<TickReport> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        let due = self.timer.advance(frame_dt, self.guidance.redirect_interval);
        for _ in 0..due {
            self.redirect();
        }
        self.tick()
    }

    /// Update guidance tunables (degrees, milliseconds).
    ///
    /// Rejected values leave the current settings untouched.
    pub fn set_config(
        &mut self,
        angle_error_deg: Option<f32>,
        redirect_interval_ms: Option<u64>,
    ) -> ConfigResult<()> {
        match self.guidance.with_updates(angle_error_deg, redirect_interval_ms) {
            Ok(next) => {
                self.guidance = next;
                log::debug!(
                    "Guidance updated: error range {:.1}°, interval {:?}",
                    next.angle_error_deg(),
                    next.redirect_interval
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected guidance update: {}", e);
                Err(e)
            }
        }
    }

    /// Replace guidance tunables wholesale
    pub fn set_guidance(&mut self, guidance: GuidanceSettings) -> ConfigResult<()> {
        guidance.validate()?;
        self.guidance = guidance;
        Ok(())
    }

    /// Register a callback fired once per `Running -> Reached` transition
    pub fn on_reached<F>(&mut self, callback: F)
    where
        F: FnMut(&ReachedEvent) + Send + 'static,
    {
        self.reached_listeners.push(Box::new(callback));
    }

    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(
            &self.world,
            self.phase,
            self.time_ticks,
            self.elapsed().as_secs_f32(),
            &self.guidance,
        )
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn guidance(&self) -> &GuidanceSettings {
        &self.guidance
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.params.collision_policy
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulated time at the nominal frame rate
    pub fn elapsed(&self) -> Duration {
        FRAME_INTERVAL.mul_f64(self.time_ticks as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::settings::Spawn;
    use crate::sim::Body;
    use crate::{bearing, normalize_heading};
    use std::f32::consts::{PI, TAU};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 1000x600 arena, rocket at (200, 300) aimed at a planet at (800, 300)
    fn straight_line_params(obstacles: usize) -> SessionParams {
        let rocket_pos = Vec2::new(200.0, 300.0);
        let planet_pos = Vec2::new(800.0, 300.0);
        let mut params = SessionParams::seeded(2024)
            .with_arena(1000.0, 600.0)
            .with_obstacle_count(obstacles)
            .with_guidance(GuidanceSettings::from_units(0.0, 100).unwrap());
        params.rocket.radius = 30.0;
        params.rocket.speed = 1.8;
        params.rocket.spawn = Some(Spawn::new(rocket_pos, bearing(rocket_pos, planet_pos)));
        params.planet.radius = 50.0;
        params.planet.position = Some(planet_pos);
        params
    }

    fn running(params: SessionParams) -> Session {
        let mut session = Session::initialize(params).unwrap();
        session.start();
        session
    }

    #[test]
    fn test_idle_until_started() {
        let mut session = Session::initialize(straight_line_params(0)).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.tick().is_none());
        assert!(session.redirect().is_none());
        assert_eq!(session.world().rocket.position, Vec2::new(200.0, 300.0));

        session.start();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert!(session.tick().is_some());
    }

    #[test]
    fn test_straight_line_reaches_in_computed_ticks() {
        let mut session = running(straight_line_params(0));
        let gap = 600.0f32 - 30.0 - 50.0;
        let expected = (gap / 1.8).ceil() as u64;

        let mut ticks = 0;
        while session.phase() == SessionPhase::Running && ticks < 10_000 {
            session.advance(FRAME_INTERVAL);
            ticks += 1;
            assert!((session.world().rocket.position.y - 300.0).abs() < 1e-3);
        }

        assert_eq!(session.phase(), SessionPhase::Reached);
        assert_eq!(session.time_ticks(), expected);
    }

    #[test]
    fn test_reached_is_frozen() {
        let mut session = running(straight_line_params(10));
        while session.phase() == SessionPhase::Running && session.time_ticks() < 10_000 {
            session.advance(FRAME_INTERVAL);
        }
        // Obstacles may deflect the rocket, but it keeps being steered home
        assert_eq!(session.phase(), SessionPhase::Reached);

        let before = session.snapshot();
        for _ in 0..20 {
            assert!(session.tick().is_none());
            assert!(session.redirect().is_none());
            assert!(session.advance(Duration::from_secs(1)).is_none());
        }
        let after = session.snapshot();
        assert_eq!(before, after);
    }

    #[test]
    fn test_on_reached_fires_once_per_transition() {
        let mut session = running(straight_line_params(0));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        session.on_reached(move |event| {
            assert!(event.time_ticks > 0);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..1000 {
            session.tick();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);

        session.reset();
        for _ in 0..1000 {
            session.tick();
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_error_guidance_targets_planet() {
        let mut params = straight_line_params(0);
        params.rocket.spawn = Some(Spawn::new(Vec2::new(200.0, 100.0), 0.0));
        let mut session = running(params);

        let committed = session.redirect().unwrap();
        let world = session.world();
        let expected = normalize_heading(bearing(world.rocket.position, world.planet.position));
        assert_eq!(committed, expected);
        assert_eq!(world.rocket.heading(), expected);
    }

    #[test]
    fn test_guidance_error_bounded_by_half_range() {
        let mut params = straight_line_params(0);
        params.guidance = GuidanceSettings::from_units(90.0, 100).unwrap();
        let mut session = running(params);

        for _ in 0..200 {
            let heading = session.redirect().unwrap();
            // Target bearing is 0, so the heading lies within ±45° of it
            let offset = if heading > PI { heading - TAU } else { heading };
            assert!(offset.abs() <= PI / 4.0 + 1e-5);
        }
    }

    #[test]
    fn test_head_on_scenario() {
        let mut params = straight_line_params(1);
        params.obstacles.radius = 30.0;
        params.obstacles.spawns = vec![Spawn::new(Vec2::new(250.0, 300.0), PI)];
        let mut session = running(params);
        let rocket_heading = session.world().rocket.heading();
        let obstacle_heading = session.world().obstacles[0].heading();

        let report = session.tick().unwrap();

        let world = session.world();
        assert_eq!(report.collisions, 1);
        let d = world.rocket.position.distance(world.obstacles[0].position);
        assert!((d - 60.0).abs() <= crate::consts::SEPARATION_MARGIN + 1e-3);
        assert_ne!(world.rocket.heading(), rocket_heading);
        assert_ne!(world.obstacles[0].heading(), obstacle_heading);
        assert_eq!(world.rocket.speed(), 1.8);
        assert_eq!(world.obstacles[0].speed(), crate::consts::OBSTACLE_SPEED);
    }

    #[test]
    fn test_pause_freezes() {
        let mut session = running(straight_line_params(5));
        session.tick();
        session.set_paused(true);
        assert_eq!(session.phase(), SessionPhase::Paused);
        let before = session.snapshot();
        assert!(session.advance(Duration::from_secs(3)).is_none());
        assert_eq!(before, session.snapshot());

        session.set_paused(false);
        assert_eq!(session.phase(), SessionPhase::Running);
        assert!(session.tick().is_some());
    }

    #[test]
    fn test_reset_keeps_pool_and_clears_trail() {
        let mut session = running(SessionParams::seeded(8).with_obstacle_count(20));
        for _ in 0..30 {
            session.tick();
        }
        assert!(!session.world().rocket.trail().is_empty());
        let before: Vec<Vec2> = session.world().obstacles.iter().map(|o| o.position).collect();

        session.reset();

        let world = session.world();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.time_ticks(), 0);
        assert!(world.rocket.trail().is_empty());
        assert_eq!(world.obstacles.len(), 20);
        for (i, o) in world.obstacles.iter().enumerate() {
            assert_eq!(o.id, i as u32);
            assert_eq!(o.radius(), crate::consts::OBSTACLE_RADIUS);
        }
        let after: Vec<Vec2> = world.obstacles.iter().map(|o| o.position).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_set_config_validates() {
        let mut session = running(SessionParams::seeded(1));
        assert!(session.set_config(Some(45.0), Some(500)).is_ok());
        assert!((session.guidance().angle_error_deg() - 45.0).abs() < 1e-3);
        assert_eq!(session.guidance().redirect_interval, Duration::from_millis(500));

        let err = session.set_config(Some(10.0), Some(50)).unwrap_err();
        assert!(matches!(err, ConfigError::RedirectIntervalOutOfRange { .. }));
        // Nothing applied
        assert!((session.guidance().angle_error_deg() - 45.0).abs() < 1e-3);
        assert_eq!(session.guidance().redirect_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_initialize_rejects_invalid() {
        let params = SessionParams::seeded(1).with_arena(0.0, 0.0);
        assert!(matches!(
            Session::initialize(params),
            Err(ConfigError::InvalidArena { .. })
        ));
    }

    #[test]
    fn test_seeded_sessions_are_deterministic() {
        let params = SessionParams::seeded(77)
            .with_obstacle_count(60)
            .with_collision_policy(CollisionPolicy::SwapJitter);
        let mut a = running(params.clone());
        let mut b = running(params);
        for _ in 0..300 {
            a.advance(FRAME_INTERVAL);
            b.advance(FRAME_INTERVAL);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_elapsed_tracks_ticks() {
        let mut session = running(SessionParams::seeded(3).with_obstacle_count(0));
        for _ in 0..60 {
            session.tick();
        }
        let snap = session.snapshot();
        assert_eq!(snap.time_ticks, session.time_ticks());
        assert!((snap.elapsed_secs - 1.0).abs() < 0.01);
    }
}
