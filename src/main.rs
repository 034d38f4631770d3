//! Souls of the Beneath entry point
//!
//! Headless session runner: drives the deterministic core with the demo
//! autoplayer at a fixed timestep. Rendering, audio and UI are external
//! consumers of `GameState` and are not part of this crate; the runner
//! narrates the session through the log instead.

use std::path::Path;
use std::time::{Duration, Instant};

use souls_beneath::consts::{MAX_SUBSTEPS, SIM_DT};
use souls_beneath::sim::{tick, GameEvent, GamePhase, GameState, Realm, TickInput};
use souls_beneath::Tuning;

/// Presentation-side frame pacing; the sim itself runs on SIM_DT
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xBEEB);
    let max_seconds: f32 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(120.0);

    let tuning = Tuning::load_or_default(Path::new("tuning.json"));
    let mut state = GameState::with_tuning(seed, tuning);
    let input = TickInput {
        demo: true,
        ..Default::default()
    };

    log::info!("demo session starting (seed {seed}, up to {max_seconds:.0}s)");

    let frame = Duration::from_secs_f32(FRAME_DT);
    let mut accumulator = 0.0_f32;
    let mut last = Instant::now();
    let mut running = true;

    while running {
        let now = Instant::now();
        let dt = (now - last).as_secs_f32().min(0.1);
        last = now;

        accumulator += dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            narrate_events(&state);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        // Coarse cancellation: checked once per outer iteration.
        if state.phase == GamePhase::GameOver {
            running = false;
        }
        if state.time_ticks as f32 * SIM_DT >= max_seconds {
            log::info!("time limit reached");
            running = false;
        }

        std::thread::sleep(frame.saturating_sub(now.elapsed()));
    }

    let realm = match state.player.realm {
        Realm::Alive => "alive on the surface",
        Realm::Soul => "a soul in the under-realm",
    };
    log::info!(
        "session over: {:.1}s survived, level {}, {} pending echoes, player {}",
        state.time_survived,
        state.level,
        state.pending_echoes.len(),
        realm
    );
}

/// Turn this tick's event pulses into log lines. A real front end would
/// feed these to particles, screen shake and the mixer instead.
fn narrate_events(state: &GameState) {
    for event in &state.events {
        match event {
            GameEvent::EnemyDied { pos, kind } => {
                log::debug!("{kind:?} fell at x {:.0}", pos.x);
            }
            GameEvent::EchoDied {
                pos, harvested, ..
            } => {
                if *harvested {
                    log::debug!("echo harvested at x {:.0}", pos.x);
                } else {
                    log::debug!("echo spent itself at x {:.0}", pos.x);
                }
            }
            GameEvent::MeleeHit { pos } => log::trace!("melee hit at x {:.0}", pos.x),
            GameEvent::PlayerHurt { damage, .. } => {
                log::debug!(
                    "player hurt for {damage:.0} ({:.0} health left)",
                    state.player.health
                );
            }
            GameEvent::SoulDrained { amount, .. } => {
                log::debug!(
                    "soul drained by {amount:.0} ({:.0} left)",
                    state.player.soul_energy
                );
            }
            GameEvent::Shattered { pos } => {
                log::info!("SHATTER at x {:.0} - the under-realm opens", pos.x);
            }
            GameEvent::Resurrected { pos } => {
                log::info!("RESURRECTION at x {:.0} - back to the surface", pos.x);
            }
            GameEvent::SessionEnded => log::info!("soul extinguished"),
        }
    }
}
