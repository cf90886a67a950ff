//! Simulation errors
//!
//! Nothing here is fatal: every variant leaves the world in its previous
//! good state and is surfaced as an ordinary return value.

use glam::IVec2;

use crate::sim::level::LevelId;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Requested level id is not in the registry
    #[error("level {0} not found")]
    LevelNotFound(LevelId),

    /// Consecutive patrol path cells are not Manhattan-adjacent
    #[error("invalid patrol path: ({}, {}) -> ({}, {}) is not adjacent", .from.x, .from.y, .to.x, .to.y)]
    InvalidPatrolPath { from: IVec2, to: IVec2 },

    /// Level table or tuning JSON failed to parse
    #[error("failed to parse game data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Level table parsed but holds no levels
    #[error("level table is empty")]
    EmptyRegistry,
}
