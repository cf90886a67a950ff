//! Bl0cks - A grid-based isometric arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacle patterns, enemies, level state machine)
//! - `tuning`: Data-driven timing and clock settings
//! - `error`: Error taxonomy shared by the simulation

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    /// Grid is always GRID_SIZE x GRID_SIZE tiles; the border is implicit wall
    pub const GRID_SIZE: i32 = 20;

    /// Points awarded per collectible
    pub const COLLECTIBLE_POINTS: u32 = 10;
    /// Points lost on an obstacle or enemy hit (score floors at 0)
    pub const HIT_PENALTY: u32 = 5;

    /// Spawn used when a level has neither a pending portal nor a spawn point
    pub const FALLBACK_SPAWN: IVec2 = IVec2::new(10, 10);

    /// Step hunters advance on every Nth accepted player step
    pub const STEP_HUNTER_CADENCE: u32 = 2;

    /// Level loaded by `World::initialize_game`
    pub const FIRST_LEVEL: u32 = 1;
}

/// Round half toward positive infinity (-2.5 -> -2, 2.5 -> 3).
///
/// `f64::round` rounds half away from zero, which shifts pattern cells that
/// land exactly on a negative half-tile.
#[inline]
pub fn js_round(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
