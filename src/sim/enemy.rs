//! Enemy behaviors
//!
//! Each enemy carries a `Behavior` variant holding its type-specific state.
//! A move is a pure function of the enemy and an `EnemyContext`: it returns
//! the enemy's next state, or `None` when nothing changes. The world decides
//! *when* to call it (roaming clock or player steps).

use glam::{DVec2, IVec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{AuthoredCell, Cell, Direction, WallMap, in_bounds, manhattan};
use crate::consts::GRID_SIZE;
use crate::error::SimError;
use crate::js_round;

/// Authored enemy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    Patroller,
    WallHugger,
    Hunter,
    StepHunter,
    Snake,
    Teleporter,
    Spinner,
}

fn default_enemy_speed() -> u64 {
    300
}

/// Enemy as written in the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEnemySpec")]
pub struct EnemySpec {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub pos: Cell,
    /// Minimum milliseconds between moves
    #[serde(default = "default_enemy_speed")]
    pub animation_speed: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Snake length including the head
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teleport_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Spinner speed in degrees per move
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<f64>,
}

/// Loose authored form: the position is either `pos` or separate `x`/`y`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnemySpec {
    #[serde(rename = "type")]
    kind: EnemyKind,
    #[serde(default)]
    pos: Option<AuthoredCell>,
    #[serde(default)]
    x: Option<i32>,
    #[serde(default)]
    y: Option<i32>,
    #[serde(default = "default_enemy_speed")]
    animation_speed: u64,
    #[serde(default)]
    path: Vec<AuthoredCell>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    length: Option<usize>,
    #[serde(default)]
    teleport_frequency: Option<u32>,
    #[serde(default)]
    center: Option<AuthoredCell>,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    rotation_speed: Option<f64>,
}

impl TryFrom<RawEnemySpec> for EnemySpec {
    type Error = String;

    fn try_from(raw: RawEnemySpec) -> Result<Self, Self::Error> {
        let pos = match (raw.pos, raw.x, raw.y) {
            (Some(pos), _, _) => Cell::from(pos),
            (None, Some(x), Some(y)) => IVec2::new(x, y),
            _ => return Err(format!("{:?} enemy has no position", raw.kind)),
        };
        Ok(Self {
            kind: raw.kind,
            pos,
            animation_speed: raw.animation_speed,
            path: raw.path.into_iter().map(Cell::from).collect(),
            direction: raw.direction,
            length: raw.length,
            teleport_frequency: raw.teleport_frequency,
            center: raw.center.map(Cell::from),
            radius: raw.radius,
            rotation_speed: raw.rotation_speed,
        })
    }
}

impl EnemySpec {
    pub fn new(kind: EnemyKind, pos: Cell) -> Self {
        Self {
            kind,
            pos,
            animation_speed: default_enemy_speed(),
            path: Vec::new(),
            direction: None,
            length: None,
            teleport_frequency: None,
            center: None,
            radius: None,
            rotation_speed: None,
        }
    }
}

/// Per-type movement state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Behavior {
    /// Ping-pong along an ordered path of adjacent cells
    Patroller {
        path: Vec<Cell>,
        path_index: usize,
        is_reversed: bool,
    },
    /// Right-hand wall follower
    WallHugger { direction: Direction },
    /// Chases the player on the roaming clock
    Hunter,
    /// Chases the player, advanced by player steps only
    StepHunter,
    /// Head plus trailing body, most recent segment first
    Snake {
        direction: Direction,
        length: usize,
        segments: Vec<Cell>,
    },
    /// Jumps to a random open cell every `frequency` moves
    Teleporter { frequency: u32, move_count: u32 },
    /// Orbits `center` at `radius`
    Spinner {
        center: Cell,
        radius: f64,
        rotation_speed: f64,
        angle: f64,
    },
}

/// A live enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub pos: Cell,
    pub animation_speed: u64,
    pub last_move_ms: u64,
    #[serde(flatten)]
    pub behavior: Behavior,
}

/// What an enemy may look at when deciding its move
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub walls: &'a WallMap,
    pub player: Cell,
}

impl Enemy {
    /// Instantiate from authored data, filling type-specific defaults
    pub fn spawn(spec: &EnemySpec) -> Self {
        let behavior = match spec.kind {
            EnemyKind::Patroller => Behavior::Patroller {
                path: spec.path.clone(),
                path_index: 0,
                is_reversed: false,
            },
            EnemyKind::WallHugger => Behavior::WallHugger {
                direction: spec.direction.unwrap_or_default(),
            },
            EnemyKind::Hunter => Behavior::Hunter,
            EnemyKind::StepHunter => Behavior::StepHunter,
            EnemyKind::Snake => {
                let direction = spec.direction.unwrap_or_default();
                let length = spec.length.unwrap_or(3).max(1);
                // Body starts straight behind the head
                let back = direction.opposite().delta();
                let segments = (1..length as i32)
                    .map(|i| spec.pos + back * i)
                    .filter(|c| in_bounds(*c))
                    .collect();
                Behavior::Snake {
                    direction,
                    length,
                    segments,
                }
            }
            EnemyKind::Teleporter => Behavior::Teleporter {
                frequency: spec.teleport_frequency.unwrap_or(5).max(1),
                move_count: 0,
            },
            EnemyKind::Spinner => Behavior::Spinner {
                center: spec.center.unwrap_or(spec.pos),
                radius: spec.radius.unwrap_or(2.0),
                rotation_speed: spec.rotation_speed.unwrap_or(45.0),
                angle: 0.0,
            },
        };
        Self {
            pos: spec.pos,
            animation_speed: spec.animation_speed,
            last_move_ms: 0,
            behavior,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Patroller { .. } => EnemyKind::Patroller,
            Behavior::WallHugger { .. } => EnemyKind::WallHugger,
            Behavior::Hunter => EnemyKind::Hunter,
            Behavior::StepHunter => EnemyKind::StepHunter,
            Behavior::Snake { .. } => EnemyKind::Snake,
            Behavior::Teleporter { .. } => EnemyKind::Teleporter,
            Behavior::Spinner { .. } => EnemyKind::Spinner,
        }
    }

    /// Moves on the roaming clock (everything except step hunters)
    pub fn is_roaming(&self) -> bool {
        !matches!(self.behavior, Behavior::StepHunter)
    }

    /// Enough time since the last move
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_move_ms) >= self.animation_speed
    }

    /// Every cell that counts as a hit: the head and any snake body
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let body: &[Cell] = match &self.behavior {
            Behavior::Snake { segments, .. } => segments,
            _ => &[],
        };
        std::iter::once(self.pos).chain(body.iter().copied())
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.cells().any(|c| c == cell)
    }

    /// Compute the next state. `Ok(None)` means the enemy stays as it is.
    pub fn next<R: Rng>(
        &self,
        ctx: &EnemyContext<'_>,
        rng: &mut R,
    ) -> Result<Option<Enemy>, SimError> {
        match &self.behavior {
            Behavior::Patroller {
                path,
                path_index,
                is_reversed,
            } => self.patrol(path, *path_index, *is_reversed),
            Behavior::WallHugger { direction } => Ok(Some(self.hug_wall(*direction, ctx.walls))),
            Behavior::Hunter | Behavior::StepHunter => Ok(self.chase(ctx.player)),
            Behavior::Snake {
                direction,
                length,
                segments,
            } => Ok(self.slither(*direction, *length, segments, ctx.walls)),
            Behavior::Teleporter {
                frequency,
                move_count,
            } => Ok(Some(self.teleport(*frequency, *move_count, ctx.walls, rng))),
            Behavior::Spinner {
                center,
                radius,
                rotation_speed,
                angle,
            } => Ok(Some(self.spin(*center, *radius, *rotation_speed, *angle))),
        }
    }

    fn with(&self, pos: Cell, behavior: Behavior) -> Enemy {
        Enemy {
            pos,
            animation_speed: self.animation_speed,
            last_move_ms: self.last_move_ms,
            behavior,
        }
    }

    fn patrol(
        &self,
        path: &[Cell],
        path_index: usize,
        is_reversed: bool,
    ) -> Result<Option<Enemy>, SimError> {
        if path.len() < 2 {
            return Ok(None);
        }

        let next_index = if is_reversed {
            path_index.checked_sub(1)
        } else {
            Some(path_index + 1).filter(|i| *i < path.len())
        };

        let Some(next_index) = next_index else {
            // End of the path: turn around in place
            return Ok(Some(self.with(
                self.pos,
                Behavior::Patroller {
                    path: path.to_vec(),
                    path_index: if is_reversed { 0 } else { path.len() - 1 },
                    is_reversed: !is_reversed,
                },
            )));
        };

        let next = path[next_index];
        if manhattan(self.pos, next) != 1 {
            return Err(SimError::InvalidPatrolPath {
                from: self.pos,
                to: next,
            });
        }

        Ok(Some(self.with(
            next,
            Behavior::Patroller {
                path: path.to_vec(),
                path_index: next_index,
                is_reversed,
            },
        )))
    }

    fn hug_wall(&self, direction: Direction, walls: &WallMap) -> Enemy {
        let turn = Behavior::WallHugger {
            direction: direction.clockwise(),
        };

        let ahead = self.pos + direction.delta();
        if walls.is_wall(ahead) {
            return self.with(self.pos, turn);
        }

        // Keep going only while the wall is still on the right-hand flank
        let flank = self.pos + direction.clockwise().delta();
        if walls.is_wall(flank) {
            self.with(ahead, Behavior::WallHugger { direction })
        } else {
            self.with(self.pos, turn)
        }
    }

    fn chase(&self, player: Cell) -> Option<Enemy> {
        let next = step_toward(self.pos, player);
        (next != self.pos).then(|| self.with(next, self.behavior.clone()))
    }

    fn slither(
        &self,
        direction: Direction,
        length: usize,
        segments: &[Cell],
        walls: &WallMap,
    ) -> Option<Enemy> {
        let (heading, next) = (0..4)
            .map(|turns| direction.turned(turns))
            .map(|d| (d, self.pos + d.delta()))
            .find(|(_, cell)| !walls.is_wall(*cell))?;

        let mut body = Vec::with_capacity(length);
        body.push(self.pos);
        body.extend_from_slice(segments);
        body.truncate(length.saturating_sub(1));

        Some(self.with(
            next,
            Behavior::Snake {
                direction: heading,
                length,
                segments: body,
            },
        ))
    }

    fn teleport<R: Rng>(
        &self,
        frequency: u32,
        move_count: u32,
        walls: &WallMap,
        rng: &mut R,
    ) -> Enemy {
        const MAX_ATTEMPTS: usize = 32;

        let move_count = move_count + 1;
        if move_count < frequency {
            return self.with(
                self.pos,
                Behavior::Teleporter {
                    frequency,
                    move_count,
                },
            );
        }

        let target = (0..MAX_ATTEMPTS)
            .map(|_| {
                IVec2::new(
                    rng.random_range(0..GRID_SIZE),
                    rng.random_range(0..GRID_SIZE),
                )
            })
            .find(|cell| !walls.is_wall(*cell))
            .unwrap_or(self.pos);

        self.with(
            target,
            Behavior::Teleporter {
                frequency,
                move_count: 0,
            },
        )
    }

    fn spin(&self, center: Cell, radius: f64, rotation_speed: f64, angle: f64) -> Enemy {
        let angle = (angle + rotation_speed) % 360.0;
        let p = center.as_dvec2() + DVec2::from_angle(angle.to_radians()) * radius;
        self.with(
            IVec2::new(js_round(p.x), js_round(p.y)),
            Behavior::Spinner {
                center,
                radius,
                rotation_speed,
                angle,
            },
        )
    }
}

/// One cell toward `target` along the axis with the larger gap (ties go horizontal)
pub fn step_toward(from: Cell, target: Cell) -> Cell {
    let d = target - from;
    if d == IVec2::ZERO {
        from
    } else if d.x.abs() >= d.y.abs() {
        from + IVec2::new(d.x.signum(), 0)
    } else {
        from + IVec2::new(0, d.y.signum())
    }
}
