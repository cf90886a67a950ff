//! Level state machine
//!
//! `World` owns the session: the level table, the clocks and the live
//! `WorldState`. Hosts drive it with two calls: `move_player` on accepted
//! input edges and `advance` with elapsed milliseconds. Every level change
//! goes through `load_level`, which rebuilds the per-level state and
//! restarts both clocks with fresh handles before returning.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::animator::{AnimatorHandle, IntervalTimer, ObstacleAnimator};
use super::enemy::{Enemy, EnemyContext};
use super::grid::{Cell, MoveIntent, WallMap};
use super::level::{Destination, Level, LevelId, LevelRegistry};
use super::pattern::PatternCache;
use super::state::{GamePhase, PortalMarker, Snapshot, WorldState};
use crate::consts::{FALLBACK_SPAWN, FIRST_LEVEL, STEP_HUNTER_CADENCE};
use crate::error::SimError;
use crate::tuning::Tuning;

/// A play session over one level table
#[derive(Debug, Clone)]
pub struct World {
    registry: LevelRegistry,
    tuning: Tuning,
    state: WorldState,
    walls: WallMap,
    animator: ObstacleAnimator,
    animator_handle: Option<AnimatorHandle>,
    enemy_clock: IntervalTimer,
    enemy_handle: Option<AnimatorHandle>,
    cache: PatternCache,
    rng: Pcg32,
}

impl World {
    /// Create a world; nothing is loaded until `initialize_game`
    pub fn new(registry: LevelRegistry, tuning: Tuning) -> Self {
        Self {
            cache: PatternCache::new(tuning.pattern_cache_capacity),
            rng: Pcg32::seed_from_u64(tuning.seed),
            state: WorldState::new(LevelId::from(FIRST_LEVEL)),
            walls: WallMap::default(),
            animator: ObstacleAnimator::new(),
            animator_handle: None,
            enemy_clock: IntervalTimer::new(),
            enemy_handle: None,
            registry,
            tuning,
        }
    }

    /// World over the built-in campaign with default tuning
    pub fn builtin() -> Result<Self, SimError> {
        Ok(Self::new(LevelRegistry::builtin()?, Tuning::default()))
    }

    /// Reset the session: first level, zero score, nothing collected
    pub fn initialize_game(&mut self) -> Result<(), SimError> {
        let first = LevelId::from(FIRST_LEVEL);
        if !self.registry.contains(&first) {
            log::warn!("Cannot start: level {first} not found");
            return Err(SimError::LevelNotFound(first));
        }
        self.state = WorldState::new(first.clone());
        self.rng = Pcg32::seed_from_u64(self.tuning.seed);
        log::info!("New game");
        self.load_level(&first)
    }

    /// Make `id` the active level and rebuild everything derived from it.
    ///
    /// On `LevelNotFound` the world is left untouched.
    pub fn load_level(&mut self, id: &LevelId) -> Result<(), SimError> {
        let Some(level) = self.registry.get(id) else {
            log::warn!("Level {id} not found");
            return Err(SimError::LevelNotFound(id.clone()));
        };

        let walls = level.wall_map();
        let collectibles = level
            .collectibles
            .iter()
            .copied()
            .filter(|cell| !self.state.is_collected(id, *cell))
            .collect();

        self.animator.stop();
        self.animator_handle = level
            .obstacle_specs()
            .first()
            .map(|spec| self.animator.start(spec, &self.tuning));
        self.state.obstacle_step = 0;
        self.state.obstacles = self.cache.cells_for_all(level.obstacle_specs(), 0);

        // The marker only applies to the level it was recorded for
        if self.state.last_portal.as_ref().is_some_and(|m| m.level != *id) {
            self.state.last_portal = None;
        }
        let spawn = self
            .state
            .last_portal
            .as_ref()
            .map(|m| m.cell)
            .filter(|cell| !walls.is_wall(*cell))
            .or(level.spawn_point)
            .unwrap_or(FALLBACK_SPAWN);

        let now = self.state.now_ms;
        self.state.enemies = level
            .enemies
            .iter()
            .map(|spec| Enemy {
                last_move_ms: now,
                ..Enemy::spawn(spec)
            })
            .collect();

        self.enemy_clock.stop();
        self.enemy_handle = self
            .state
            .enemies
            .iter()
            .any(Enemy::is_roaming)
            .then(|| self.enemy_clock.start(self.tuning.enemy_clock_ms));

        self.state.collectibles = collectibles;
        self.state.player = spawn;
        self.state.player_steps = 0;
        self.state.current_level = id.clone();
        self.walls = walls;

        log::info!(
            "Loaded level {id}: spawn ({}, {}), {} walls, {} collectibles, {} obstacle cells, {} enemies",
            spawn.x,
            spawn.y,
            self.walls.len(),
            self.state.collectibles.len(),
            self.state.obstacles.len(),
            self.state.enemies.len()
        );
        log::debug!("Pattern cache holds {} entries", self.cache.len());
        Ok(())
    }

    /// Apply one input edge. Returns whether the player moved.
    pub fn move_player(&mut self, intent: MoveIntent) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        let delta = intent.delta();
        if delta == IVec2::ZERO {
            return false;
        }
        let target = self.state.player + delta;
        if self.walls.is_wall(target) {
            return false;
        }

        self.state.player = target;
        self.state.player_steps += 1;
        if self.state.player_steps % STEP_HUNTER_CADENCE == 0 {
            self.move_enemies(|enemy| !enemy.is_roaming());
        }
        self.check_collisions();
        true
    }

    /// Resolve what the player is standing on, in fixed order: portals,
    /// finish tile, collectible, enemy, obstacle.
    ///
    /// Returns whether the level changed, was reloaded, or the game was won.
    pub fn check_collisions(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        if self.check_portals() || self.check_finish() {
            return true;
        }
        if self.state.collect_at_player() {
            log::debug!(
                "Collected ({}, {}) on level {}; score {}",
                self.state.player.x,
                self.state.player.y,
                self.state.current_level,
                self.state.score
            );
        }
        self.check_hazards()
    }

    /// Take an up or down portal under the player, if any
    pub fn check_portals(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        let player = self.state.player;
        let Some(level) = self.registry.get(&self.state.current_level) else {
            return false;
        };

        let on_up = level.up_portals().contains(&player);
        let up_destination = level
            .return_level
            .clone()
            .map(Destination::Level)
            .or_else(|| level.next_level.clone());
        let down_destination = level
            .down_portals()
            .iter()
            .position(|cell| *cell == player)
            .map(|index| level.hidden_level_for(index));

        if on_up {
            if self.state.last_portal.take().is_some() {
                log::debug!("Arrival portal suppressed at ({}, {})", player.x, player.y);
                return false;
            }
            match up_destination {
                Some(Destination::Victory) => {
                    self.win();
                    return true;
                }
                Some(Destination::Level(id)) => return self.transition(&id),
                None => {}
            }
        }

        if let Some(hidden) = down_destination {
            let previous = self.state.last_portal.replace(PortalMarker {
                level: hidden.clone(),
                cell: player,
            });
            if self.transition(&hidden) {
                return true;
            }
            self.state.last_portal = previous;
        }
        false
    }

    /// Feed elapsed host time to the session clock, the transition
    /// cooldown, the obstacle animator and the roaming-enemy clock.
    pub fn advance(&mut self, dt_ms: u64) {
        self.state.now_ms = self.state.now_ms.saturating_add(dt_ms);

        if self.state.is_transitioning() {
            self.state.transition_remaining_ms =
                self.state.transition_remaining_ms.saturating_sub(dt_ms);
            if self.state.transition_remaining_ms == 0 {
                self.state.phase = GamePhase::Playing;
                log::debug!("Transition into level {} finished", self.state.current_level);
            }
        }

        let mut hazards_moved = false;

        if let Some(handle) = self.animator_handle {
            if let Some(step) = self.animator.advance(handle, dt_ms) {
                self.state.obstacle_step = step;
                if let Some(level) = self.registry.get(&self.state.current_level) {
                    self.state.obstacles = self.cache.cells_for_all(level.obstacle_specs(), step);
                }
                hazards_moved = true;
            }
        }

        if let Some(handle) = self.enemy_handle {
            if self.enemy_clock.advance(handle, dt_ms) > 0 {
                let now = self.state.now_ms;
                hazards_moved |= self.move_enemies(|enemy| enemy.is_roaming() && enemy.is_due(now));
            }
        }

        if hazards_moved && self.state.is_playing() {
            self.check_hazards();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Authored data for the active level
    pub fn level(&self) -> Option<&Level> {
        self.registry.get(&self.state.current_level)
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    /// Handle of the running obstacle clock, if the level has obstacles
    pub fn animator_handle(&self) -> Option<AnimatorHandle> {
        self.animator_handle
    }

    fn transition(&mut self, id: &LevelId) -> bool {
        let from = self.state.current_level.clone();
        if let Err(err) = self.load_level(id) {
            log::warn!("Transition from level {from} ignored: {err}");
            return false;
        }
        if self.tuning.transition_ms > 0 {
            self.state.phase = GamePhase::Transitioning;
            self.state.transition_remaining_ms = self.tuning.transition_ms;
        }
        log::info!("Level {from} -> {id}");
        true
    }

    fn check_finish(&mut self) -> bool {
        let on_finish = self
            .level()
            .and_then(|level| level.finish)
            .is_some_and(|cell| cell == self.state.player);
        if on_finish {
            self.win();
        }
        on_finish
    }

    fn win(&mut self) {
        self.state.phase = GamePhase::Victorious;
        log::info!(
            "Victory on level {} with score {}",
            self.state.current_level,
            self.state.score
        );
    }

    /// Enemy first, then obstacle; a hit reloads the level
    fn check_hazards(&mut self) -> bool {
        let cause = if self.state.enemy_at_player() {
            "enemy"
        } else if self.state.obstacle_at_player() {
            "obstacle"
        } else {
            return false;
        };

        self.state.penalize();
        let id = self.state.current_level.clone();
        log::info!(
            "Hit by {cause} at ({}, {}); score {}",
            self.state.player.x,
            self.state.player.y,
            self.state.score
        );
        if let Err(err) = self.load_level(&id) {
            log::warn!("Reload failed: {err}");
        }
        true
    }

    /// Step every selected enemy once. Returns whether any of them changed.
    fn move_enemies(&mut self, select: impl Fn(&Enemy) -> bool) -> bool {
        let ctx = EnemyContext {
            walls: &self.walls,
            player: self.state.player,
        };
        let now = self.state.now_ms;
        let mut changed = false;

        for enemy in self.state.enemies.iter_mut().filter(|e| select(&**e)) {
            match enemy.next(&ctx, &mut self.rng) {
                Ok(Some(next)) => {
                    *enemy = next;
                    changed = true;
                }
                Ok(None) => {}
                Err(err) => log::warn!(
                    "{:?} at ({}, {}) holds position: {err}",
                    enemy.kind(),
                    enemy.pos.x,
                    enemy.pos.y
                ),
            }
            enemy.last_move_ms = now;
        }
        changed
    }
}

/// Greedy intent toward the active level's exit, for autoplay drivers
pub fn intent_toward_exit(world: &World) -> Option<MoveIntent> {
    let level = world.level()?;
    let player = world.state().player;
    let goal: Cell = level
        .finish
        .or_else(|| level.up_portals().first().copied())?;
    let intent = MoveIntent::toward(player, goal);
    (intent.delta() != IVec2::ZERO).then_some(intent)
}
