//! Rocket Field entry point
//!
//! Runs a headless session with the default parameters through the
//! single-threaded driver and logs the outcome. Pass a seed as the first
//! argument to replay a run. Rendering is left to external collaborators.

use std::process::ExitCode;

use rocket_field::consts::FRAME_INTERVAL;
use rocket_field::sim::SessionPhase;
use rocket_field::{Session, SessionParams};

/// Give up after ten simulated minutes
const MAX_TICKS: u64 = 60 * 60 * 10;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Rocket Field (headless) starting...");

    let mut params = SessionParams::default();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse::<u64>() {
            Ok(seed) => params.seed = Some(seed),
            Err(_) => {
                log::error!("Seed must be an unsigned integer, got {:?}", arg);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut session = match Session::initialize(params) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    session.on_reached(|event| {
        println!(
            "Rocket reached the planet after {} ticks ({:.1}s simulated)",
            event.time_ticks, event.elapsed_secs
        );
    });
    session.start();

    while session.phase() == SessionPhase::Running && session.time_ticks() < MAX_TICKS {
        let Some(report) = session.advance(FRAME_INTERVAL) else {
            break;
        };
        if session.time_ticks().is_multiple_of(600) {
            let snap = session.snapshot();
            log::info!(
                "t={:.0}s rocket=({:.0}, {:.0}) collisions this tick={}",
                snap.elapsed_secs,
                snap.rocket.position.x,
                snap.rocket.position.y,
                report.collisions
            );
        }
    }

    if session.phase() != SessionPhase::Reached {
        println!(
            "Rocket did not reach the planet within {} ticks (seed {})",
            MAX_TICKS,
            session.seed()
        );
    }
    ExitCode::SUCCESS
}
