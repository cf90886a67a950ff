//! World state and the read-only snapshot handed to presentation layers
//!
//! Everything a session needs to resume lives in `WorldState`. The
//! per-level sets (collectibles, obstacles, enemies) are rebuilt on every
//! level load; `collected` survives reloads for the whole session.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::enemy::{Behavior, Enemy, EnemyKind};
use super::grid::Cell;
use super::level::LevelId;
use crate::consts::{COLLECTIBLE_POINTS, FALLBACK_SPAWN, HIT_PENALTY};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting input, hazards live
    #[default]
    Playing,
    /// Cooldown after a level change; no input, no new transitions
    Transitioning,
    /// Run won
    Victorious,
}

/// Session-wide identity of a collectible
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectedKey {
    pub level: LevelId,
    pub cell: Cell,
}

impl CollectedKey {
    pub fn new(level: LevelId, cell: Cell) -> Self {
        Self { level, cell }
    }
}

impl fmt::Display for CollectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.level, self.cell.x, self.cell.y)
    }
}

/// Down-portal cell the player used, tied to the hidden level it leads to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalMarker {
    pub level: LevelId,
    pub cell: Cell,
}

/// Complete mutable state of a play session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub current_level: LevelId,
    pub player: Cell,
    pub score: u32,
    pub collected: HashSet<CollectedKey>,
    pub collectibles: Vec<Cell>,
    /// Obstacle cells at the current animation step
    pub obstacles: Vec<Cell>,
    pub enemies: Vec<Enemy>,
    pub phase: GamePhase,
    pub transition_remaining_ms: u64,
    /// Set while the player is in a hidden level entered through a down portal
    pub last_portal: Option<PortalMarker>,
    /// Accepted moves since the level was loaded
    pub player_steps: u32,
    pub obstacle_step: u32,
    /// Session clock (ms)
    pub now_ms: u64,
}

impl WorldState {
    pub fn new(level: LevelId) -> Self {
        Self {
            current_level: level,
            player: FALLBACK_SPAWN,
            score: 0,
            collected: HashSet::new(),
            collectibles: Vec::new(),
            obstacles: Vec::new(),
            enemies: Vec::new(),
            phase: GamePhase::Playing,
            transition_remaining_ms: 0,
            last_portal: None,
            player_steps: 0,
            obstacle_step: 0,
            now_ms: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == GamePhase::Transitioning
    }

    pub fn is_victorious(&self) -> bool {
        self.phase == GamePhase::Victorious
    }

    /// Pick up the collectible under the player, if any
    pub fn collect_at_player(&mut self) -> bool {
        let Some(index) = self.collectibles.iter().position(|c| *c == self.player) else {
            return false;
        };
        let cell = self.collectibles.remove(index);
        self.collected
            .insert(CollectedKey::new(self.current_level.clone(), cell));
        self.score += COLLECTIBLE_POINTS;
        true
    }

    /// Apply the hit penalty; score never drops below zero
    pub fn penalize(&mut self) {
        self.score = self.score.saturating_sub(HIT_PENALTY);
    }

    pub fn is_collected(&self, level: &LevelId, cell: Cell) -> bool {
        self.collected
            .contains(&CollectedKey::new(level.clone(), cell))
    }

    /// Enemy (head or body) on the player's cell
    pub fn enemy_at_player(&self) -> bool {
        self.enemies.iter().any(|e| e.occupies(self.player))
    }

    pub fn obstacle_at_player(&self) -> bool {
        self.obstacles.contains(&self.player)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_level: self.current_level.clone(),
            player_position: self.player,
            collectibles: self.collectibles.clone(),
            obstacles: self.obstacles.clone(),
            enemies: self.enemies.iter().map(EnemyView::from).collect(),
            score: self.score,
            is_transitioning: self.is_transitioning(),
            is_victorious: self.is_victorious(),
        }
    }
}

/// Enemy as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub x: i32,
    pub y: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Cell>,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        let segments = match &enemy.behavior {
            Behavior::Snake { segments, .. } => segments.clone(),
            _ => Vec::new(),
        };
        Self {
            kind: enemy.kind(),
            x: enemy.pos.x,
            y: enemy.pos.y,
            segments,
        }
    }
}

/// Immutable view of the observable state after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_level: LevelId,
    pub player_position: Cell,
    pub collectibles: Vec<Cell>,
    pub obstacles: Vec<Cell>,
    pub enemies: Vec<EnemyView>,
    pub score: u32,
    pub is_transitioning: bool,
    pub is_victorious: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemySpec;
    use glam::IVec2;
    use proptest::prelude::*;

    #[test]
    fn test_collect_scores_and_records_key() {
        let mut state = WorldState::new(LevelId::from(3));
        state.collectibles = vec![IVec2::new(2, 2), IVec2::new(4, 4)];
        state.player = IVec2::new(4, 4);

        assert!(state.collect_at_player());
        assert_eq!(state.score, COLLECTIBLE_POINTS);
        assert_eq!(state.collectibles, vec![IVec2::new(2, 2)]);
        assert!(state.is_collected(&LevelId::from(3), IVec2::new(4, 4)));
        assert!(!state.is_collected(&LevelId::from(4), IVec2::new(4, 4)));

        assert!(!state.collect_at_player());
        assert_eq!(state.score, COLLECTIBLE_POINTS);
    }

    #[test]
    fn test_collected_key_format() {
        let key = CollectedKey::new(LevelId::from("11b"), IVec2::new(3, 16));
        assert_eq!(key.to_string(), "11b-3-16");
    }

    #[test]
    fn test_snake_body_counts_as_hit() {
        let mut state = WorldState::new(LevelId::from(1));
        let mut spec = EnemySpec::new(EnemyKind::Snake, IVec2::new(5, 5));
        spec.length = Some(3);
        state.enemies.push(Enemy::spawn(&spec));
        state.player = IVec2::new(4, 5);
        assert!(state.enemy_at_player());
        state.player = IVec2::new(5, 6);
        assert!(!state.enemy_at_player());
    }

    #[test]
    fn test_snapshot_serializes_observable_fields() {
        let mut state = WorldState::new(LevelId::from(2));
        state.player = IVec2::new(1, 1);
        state.phase = GamePhase::Transitioning;
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["currentLevel"], 2);
        assert_eq!(json["playerPosition"], serde_json::json!([1, 1]));
        assert_eq!(json["isTransitioning"], true);
        assert_eq!(json["isVictorious"], false);
    }

    #[test]
    fn test_enemy_view_exposes_coordinates() {
        let mut state = WorldState::new(LevelId::from(1));
        state
            .enemies
            .push(Enemy::spawn(&EnemySpec::new(EnemyKind::Hunter, IVec2::new(7, 3))));
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(
            json["enemies"][0],
            serde_json::json!({ "type": "hunter", "x": 7, "y": 3 })
        );
    }

    proptest! {
        #[test]
        fn prop_score_never_underflows(events in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut state = WorldState::new(LevelId::from(1));
            let mut expected: i64 = 0;
            for pickup in events {
                if pickup {
                    state.collectibles.push(state.player);
                    prop_assert!(state.collect_at_player());
                    expected += i64::from(COLLECTIBLE_POINTS);
                } else {
                    state.penalize();
                    expected = (expected - i64::from(HIT_PENALTY)).max(0);
                }
                prop_assert_eq!(i64::from(state.score), expected);
            }
        }
    }
}
