//! Fixed-interval clocks driven by the host's elapsed time
//!
//! Nothing here owns a real timer. The world feeds elapsed milliseconds in,
//! and each clock reports how many of its intervals have fired. Every
//! `start`/`stop` bumps a generation counter; a handle from an earlier
//! generation can no longer advance the clock, so a level's clock cannot
//! leak into the next level.

use serde::{Deserialize, Serialize};

use super::pattern::PatternSpec;
use crate::tuning::Tuning;

/// Proof of ownership for one started run of a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimatorHandle {
    generation: u64,
}

/// Accumulates elapsed time and fires once per `interval_ms`
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    interval_ms: u64,
    elapsed_ms: u64,
    running: bool,
    generation: u64,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start from zero; previously issued handles go stale
    pub fn start(&mut self, interval_ms: u64) -> AnimatorHandle {
        self.generation += 1;
        self.interval_ms = interval_ms.max(1);
        self.elapsed_ms = 0;
        self.running = true;
        AnimatorHandle {
            generation: self.generation,
        }
    }

    /// Halt and invalidate every outstanding handle
    pub fn stop(&mut self) {
        self.generation += 1;
        self.running = false;
        self.elapsed_ms = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Does this handle belong to the current run
    pub fn owns(&self, handle: AnimatorHandle) -> bool {
        self.running && handle.generation == self.generation
    }

    /// Feed elapsed time; returns how many intervals fired (0 for stale handles)
    pub fn advance(&mut self, handle: AnimatorHandle, dt_ms: u64) -> u64 {
        if !self.owns(handle) {
            return 0;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let fired = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;
        fired
    }
}

/// Shared step counter for a level's obstacle patterns
#[derive(Debug, Clone, Default)]
pub struct ObstacleAnimator {
    timer: IntervalTimer,
    step: u32,
    rotation_steps: u32,
}

impl ObstacleAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to step 0 and tick at the pattern's speed (clamped by tuning)
    pub fn start(&mut self, pattern: &PatternSpec, tuning: &Tuning) -> AnimatorHandle {
        self.step = 0;
        self.rotation_steps = pattern.cycle();
        let interval = tuning.frame_interval(pattern.animation_speed);
        log::debug!(
            "Animator start: {} ({} steps every {}ms)",
            pattern.kind,
            self.rotation_steps,
            interval
        );
        self.timer.start(interval)
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_animating(&self) -> bool {
        self.timer.is_running()
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn interval_ms(&self) -> u64 {
        self.timer.interval_ms()
    }

    /// Advance the clock; returns the new step if at least one interval fired
    pub fn advance(&mut self, handle: AnimatorHandle, dt_ms: u64) -> Option<u32> {
        let fired = self.timer.advance(handle, dt_ms);
        if fired == 0 {
            return None;
        }
        let cycle = u64::from(self.rotation_steps.max(1));
        self.step = ((u64::from(self.step) + fired % cycle) % cycle) as u32;
        Some(self.step)
    }
}
