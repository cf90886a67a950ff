//! Data-driven timing settings
//!
//! Everything the simulation clocks need that isn't a scoring rule. Loaded
//! from JSON by the host; missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Clock and cache tuning for a play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Length of the post-transition cooldown (ms)
    pub transition_ms: u64,
    /// Lower bound on the obstacle animator interval (ms)
    pub min_frame_interval_ms: u64,
    /// Period of the roaming-enemy clock (ms)
    pub enemy_clock_ms: u64,
    /// Animator interval for patterns that omit `animationSpeed` (ms)
    pub default_animation_speed_ms: u64,
    /// Pattern cache ceiling before the oldest entry is evicted
    pub pattern_cache_capacity: usize,
    /// Seed for enemy randomness (teleporters)
    pub seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            transition_ms: 600,
            min_frame_interval_ms: 16,
            enemy_clock_ms: 50,
            default_animation_speed_ms: 500,
            pattern_cache_capacity: 1000,
            seed: 0x0b10_c5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON (unknown fields are ignored)
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::debug!("Loaded tuning: {:?}", tuning);
        Ok(tuning)
    }

    /// Effective animator interval for a pattern's authored speed
    pub fn frame_interval(&self, animation_speed_ms: Option<u64>) -> u64 {
        animation_speed_ms
            .unwrap_or(self.default_animation_speed_ms)
            .max(self.min_frame_interval_ms)
            .max(1)
    }
}
