//! Bl0cks headless entry point
//!
//! Runs the built-in campaign with a greedy mover at a fixed 16ms frame and
//! prints the final snapshot as JSON. An optional argument names a tuning
//! JSON file.

#[cfg(not(target_arch = "wasm32"))]
use bl0cks::sim::{LevelRegistry, World, intent_toward_exit};
#[cfg(not(target_arch = "wasm32"))]
use bl0cks::{SimError, Tuning};

#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: u64 = 16;
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 60 * 60 * 10;
/// Input edges are accepted at most this often
#[cfg(not(target_arch = "wasm32"))]
const MOVE_EVERY_FRAMES: u32 = 6;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bl0cks (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), SimError> {
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json)?,
            Err(err) => {
                log::warn!("Cannot read {path}: {err}; using default tuning");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut world = World::new(LevelRegistry::builtin()?, tuning);
    world.initialize_game()?;

    let mut frames = 0;
    while frames < MAX_FRAMES && !world.state().is_victorious() {
        world.advance(FRAME_MS);
        if frames % MOVE_EVERY_FRAMES == 0 {
            if let Some(intent) = intent_toward_exit(&world) {
                world.move_player(intent);
            }
        }
        frames += 1;
    }

    log::info!(
        "Stopped after {} frames on level {} (score {})",
        frames,
        world.state().current_level,
        world.state().score
    );

    println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
