//! Threaded driver: two producers, one serialized update path.
//!
//! A consumer thread owns the `Session` and drains a single `mpsc` queue.
//! A frame producer (~60 Hz) and a guidance producer (redirect interval,
//! re-read every cycle) feed it `Activation`s, as do configuration and
//! lifecycle calls on the handle. Each activation runs to completion before
//! the next is taken, so ticks and guidance commits never interleave
//! mid-computation.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::consts::FRAME_INTERVAL;
use crate::error::ConfigResult;
use crate::session::Session;
use crate::settings::GuidanceSettings;
use crate::sim::SessionPhase;
use crate::snapshot::Snapshot;

/// Work items for the consumer thread
#[derive(Debug, Clone)]
pub enum Activation {
    /// One simulation tick
    Frame,
    /// One guidance activation
    Redirect,
    /// Replace guidance tunables (already validated)
    Configure(GuidanceSettings),
    Reset,
    Pause(bool),
    /// Stop the consumer
    Shutdown,
}

/// Owner of the running simulation threads.
///
/// Dropping the handle shuts everything down.
pub struct SimulationHandle {
    command_tx: mpsc::Sender<Activation>,
    latest_snapshot: Arc<Mutex<Option<Snapshot>>>,
    guidance: GuidanceSettings,
    redirect_interval_ms: Arc<AtomicU64>,
    frame_interval: Duration,
    /// Dropping these wakes and stops the producers
    stop_txs: Vec<mpsc::Sender<()>>,
    threads: Vec<JoinHandle<()>>,
}

impl SimulationHandle {
    /// Start the session and its threads at the nominal frame rate
    pub fn spawn(session: Session) -> io::Result<Self> {
        Self::spawn_with_frame_interval(session, FRAME_INTERVAL)
    }

    pub fn spawn_with_frame_interval(
        mut session: Session,
        frame_interval: Duration,
    ) -> io::Result<Self> {
        session.start();
        let guidance = *session.guidance();
        let redirect_interval_ms = Arc::new(AtomicU64::new(
            guidance.redirect_interval.as_millis() as u64,
        ));
        let latest_snapshot = Arc::new(Mutex::new(Some(session.snapshot())));
        let (command_tx, command_rx) = mpsc::channel::<Activation>();

        let mut threads = Vec::with_capacity(3);
        let snapshot_slot = Arc::clone(&latest_snapshot);
        threads.push(
            thread::Builder::new()
                .name("rocket-field-sim".into())
                .spawn(move || run_consumer(session, command_rx, &snapshot_slot))?,
        );

        let (frame_stop_tx, frame_stop_rx) = mpsc::channel::<()>();
        let frame_tx = command_tx.clone();
        threads.push(
            thread::Builder::new()
                .name("rocket-field-frames".into())
                .spawn(move || {
                    run_producer(&frame_tx, &frame_stop_rx, || frame_interval, Activation::Frame)
                })?,
        );

        let (guidance_stop_tx, guidance_stop_rx) = mpsc::channel::<()>();
        let guidance_tx = command_tx.clone();
        let interval = Arc::clone(&redirect_interval_ms);
        threads.push(
            thread::Builder::new()
                .name("rocket-field-guidance".into())
                .spawn(move || {
                    run_producer(
                        &guidance_tx,
                        &guidance_stop_rx,
                        || Duration::from_millis(interval.load(Ordering::Relaxed)),
                        Activation::Redirect,
                    )
                })?,
        );

        log::info!("Simulation threads started (frame interval {:?})", frame_interval);

        Ok(Self {
            command_tx,
            latest_snapshot,
            guidance,
            redirect_interval_ms,
            frame_interval,
            stop_txs: vec![frame_stop_tx, guidance_stop_tx],
            threads,
        })
    }

    /// Validate on the caller's thread, then queue the change
    pub fn set_config(
        &mut self,
        angle_error_deg: Option<f32>,
        redirect_interval_ms: Option<u64>,
    ) -> ConfigResult<()> {
        let next = self
            .guidance
            .with_updates(angle_error_deg, redirect_interval_ms)?;
        self.guidance = next;
        self.redirect_interval_ms
            .store(next.redirect_interval.as_millis() as u64, Ordering::Relaxed);
        self.send(Activation::Configure(next));
        Ok(())
    }

    pub fn reset(&self) {
        self.send(Activation::Reset);
    }

    pub fn pause(&self, paused: bool) {
        self.send(Activation::Pause(paused));
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }

    /// Phase from the latest snapshot
    pub fn phase(&self) -> Option<SessionPhase> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|s| s.phase))
    }

    pub fn guidance(&self) -> &GuidanceSettings {
        &self.guidance
    }

    pub fn is_running(&self) -> bool {
        !self.threads.is_empty()
    }

    /// Stop producers and consumer, then join all threads. Idempotent.
    pub fn shutdown(&mut self) {
        if self.threads.is_empty() {
            return;
        }
        self.stop_txs.clear();
        let _ = self.command_tx.send(Activation::Shutdown);
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::error!("Simulation thread panicked");
            }
        }
        log::info!("Simulation threads stopped");
    }

    /// Stop the current threads before starting `session` on new ones
    pub fn restart(&mut self, session: Session) -> io::Result<()> {
        self.shutdown();
        *self = Self::spawn_with_frame_interval(session, self.frame_interval)?;
        Ok(())
    }

    fn send(&self, activation: Activation) {
        if self.command_tx.send(activation).is_err() {
            log::warn!("Simulation thread is gone; activation dropped");
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The consumer. Runs until `Shutdown` or every sender is gone.
fn run_consumer(
    mut session: Session,
    command_rx: mpsc::Receiver<Activation>,
    latest_snapshot: &Mutex<Option<Snapshot>>,
) {
    while let Ok(activation) = command_rx.recv() {
        match activation {
            Activation::Frame => {
                if session.tick().is_none() {
                    // Frozen: nothing changed, nothing to publish
                    continue;
                }
            }
            Activation::Redirect => {
                if session.redirect().is_none() {
                    continue;
                }
            }
            Activation::Configure(guidance) => {
                if let Err(e) = session.set_guidance(guidance) {
                    log::warn!("Ignoring guidance update: {}", e);
                }
            }
            Activation::Reset => session.reset(),
            Activation::Pause(paused) => session.set_paused(paused),
            Activation::Shutdown => return,
        }

        if let Ok(mut slot) = latest_snapshot.lock() {
            *slot = Some(session.snapshot());
        }
    }
}

/// Emit `activation` every `period()` until the stop channel closes
fn run_producer(
    command_tx: &mpsc::Sender<Activation>,
    stop_rx: &mpsc::Receiver<()>,
    period: impl Fn() -> Duration,
    activation: Activation,
) {
    loop {
        match stop_rx.recv_timeout(period()) {
            Err(RecvTimeoutError::Timeout) => {
                if command_tx.send(activation.clone()).is_err() {
                    return;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SessionParams, Spawn};
    use crate::{ConfigError, bearing};
    use glam::Vec2;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn straight_line_session(seed: u64) -> Session {
        let rocket_pos = Vec2::new(200.0, 300.0);
        let planet_pos = Vec2::new(800.0, 300.0);
        let mut params = SessionParams::seeded(seed)
            .with_arena(1000.0, 600.0)
            .with_obstacle_count(0)
            .with_guidance(GuidanceSettings::from_units(0.0, 100).unwrap());
        params.rocket.radius = 30.0;
        params.rocket.speed = 1.8;
        params.rocket.spawn = Some(Spawn::new(rocket_pos, bearing(rocket_pos, planet_pos)));
        params.planet.radius = 50.0;
        params.planet.position = Some(planet_pos);
        Session::initialize(params).unwrap()
    }

    fn wait_for(handle: &SimulationHandle, phase: SessionPhase, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if handle.phase() == Some(phase) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_runs_to_reached_and_freezes() {
        let mut session = straight_line_session(1);
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&fired);
        session.on_reached(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let mut handle =
            SimulationHandle::spawn_with_frame_interval(session, Duration::from_micros(200))
                .unwrap();
        assert!(wait_for(&handle, SessionPhase::Reached, Duration::from_secs(10)));

        let frozen = handle.snapshot().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.snapshot().unwrap(), frozen);
        assert_eq!(frozen.time_ticks, 289);

        handle.shutdown();
        assert!(!handle.is_running());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_and_pause_go_through_queue() {
        let mut handle =
            SimulationHandle::spawn_with_frame_interval(straight_line_session(2), Duration::from_micros(200))
                .unwrap();
        assert!(wait_for(&handle, SessionPhase::Reached, Duration::from_secs(10)));

        handle.reset();
        handle.pause(true);
        assert!(wait_for(&handle, SessionPhase::Paused, Duration::from_secs(2)));
        let paused = handle.snapshot().unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(handle.snapshot().unwrap(), paused);

        handle.pause(false);
        assert!(wait_for(&handle, SessionPhase::Reached, Duration::from_secs(10)));
        handle.shutdown();
    }

    #[test]
    fn test_set_config_rejected_synchronously() {
        let mut handle = SimulationHandle::spawn(straight_line_session(3)).unwrap();
        assert!(matches!(
            handle.set_config(Some(200.0), None),
            Err(ConfigError::AngleErrorOutOfRange { .. })
        ));
        assert!(handle.set_config(Some(20.0), Some(1000)).is_ok());
        assert_eq!(handle.guidance().redirect_interval, Duration::from_millis(1000));
        handle.shutdown();
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut handle =
            SimulationHandle::spawn_with_frame_interval(straight_line_session(4), Duration::from_micros(200))
                .unwrap();
        assert!(wait_for(&handle, SessionPhase::Reached, Duration::from_secs(10)));

        handle.restart(straight_line_session(5)).unwrap();
        assert!(handle.is_running());
        assert!(wait_for(&handle, SessionPhase::Reached, Duration::from_secs(10)));

        handle.shutdown();
        handle.shutdown();
        assert!(!handle.is_running());
    }
}
