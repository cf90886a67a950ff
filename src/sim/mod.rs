//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only enters through `World::advance`
//! - Seeded RNG only
//! - Level data is read-only after load
//! - No rendering, audio or platform dependencies

pub mod animator;
pub mod enemy;
pub mod grid;
pub mod level;
pub mod pattern;
pub mod state;
pub mod world;

pub use animator::{AnimatorHandle, IntervalTimer, ObstacleAnimator};
pub use enemy::{Behavior, Enemy, EnemyContext, EnemyKind, EnemySpec, step_toward};
pub use grid::{AuthoredCell, Cell, Direction, MoveIntent, WallMap, in_bounds, manhattan};
pub use level::{Destination, Level, LevelId, LevelRegistry, OneOrMany};
pub use pattern::{PatternCache, PatternKind, PatternSpec, generate, generator, theta};
pub use state::{CollectedKey, EnemyView, GamePhase, PortalMarker, Snapshot, WorldState};
pub use world::{World, intent_toward_exit};
