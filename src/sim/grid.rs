//! Grid geometry shared by every simulation component
//!
//! The play field is a fixed `GRID_SIZE` square. Cells outside it are
//! treated as wall, so the border never needs to be authored.

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRID_SIZE;

/// A grid cell coordinate; serialized as `[x, y]`
pub type Cell = IVec2;

/// Is the cell inside the play field
#[inline]
pub fn in_bounds(cell: Cell) -> bool {
    cell.x >= 0 && cell.x < GRID_SIZE && cell.y >= 0 && cell.y < GRID_SIZE
}

/// Coordinate as written in level data: `[x, y]` or `{ "x": .., "y": .. }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AuthoredCell {
    Pair([i32; 2]),
    Point { x: i32, y: i32 },
}

impl From<AuthoredCell> for Cell {
    fn from(authored: AuthoredCell) -> Self {
        match authored {
            AuthoredCell::Pair([x, y]) | AuthoredCell::Point { x, y } => IVec2::new(x, y),
        }
    }
}

/// `deserialize_with` helpers accepting either coordinate form
pub mod authored {
    use serde::{Deserialize, Deserializer};

    use super::{AuthoredCell, Cell};

    pub fn cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cell, D::Error> {
        AuthoredCell::deserialize(deserializer).map(Cell::from)
    }

    pub fn opt_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Cell>, D::Error> {
        Ok(Option::<AuthoredCell>::deserialize(deserializer)?.map(Cell::from))
    }

    pub fn cells<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Cell>, D::Error> {
        Ok(Vec::<AuthoredCell>::deserialize(deserializer)?
            .into_iter()
            .map(Cell::from)
            .collect())
    }
}

/// Authored walls plus the implicit grid border
#[derive(Debug, Clone, Default)]
pub struct WallMap {
    cells: HashSet<Cell>,
}

impl WallMap {
    pub fn new(walls: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            cells: walls.into_iter().collect(),
        }
    }

    /// True for authored walls and anything off the grid
    #[inline]
    pub fn is_wall(&self, cell: Cell) -> bool {
        !in_bounds(cell) || self.cells.contains(&cell)
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Facing for wall huggers and snakes, listed clockwise (screen y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Unit offset for one step in this direction
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Up => IVec2::new(0, -1),
        }
    }

    /// Next direction after a 90 degree clockwise turn
    pub fn clockwise(self) -> Direction {
        self.turned(1)
    }

    /// Direction after `quarter_turns` clockwise turns
    pub fn turned(self, quarter_turns: usize) -> Direction {
        let index = Self::CLOCKWISE
            .iter()
            .position(|d| *d == self)
            .unwrap_or(0);
        Self::CLOCKWISE[(index + quarter_turns) % 4]
    }

    pub fn opposite(self) -> Direction {
        self.turned(2)
    }
}

/// Held direction flags for one accepted input edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub const UP: MoveIntent = MoveIntent { up: true, down: false, left: false, right: false };
    pub const DOWN: MoveIntent = MoveIntent { up: false, down: true, left: false, right: false };
    pub const LEFT: MoveIntent = MoveIntent { up: false, down: false, left: true, right: false };
    pub const RIGHT: MoveIntent = MoveIntent { up: false, down: false, left: false, right: true };

    /// Combined offset; opposing flags cancel, two axes make a diagonal
    pub fn delta(self) -> IVec2 {
        IVec2::new(
            self.right as i32 - self.left as i32,
            self.down as i32 - self.up as i32,
        )
    }

    /// Intent that steps one cell from `from` toward `to` on both axes
    pub fn toward(from: Cell, to: Cell) -> MoveIntent {
        let d = (to - from).signum();
        MoveIntent {
            up: d.y < 0,
            down: d.y > 0,
            left: d.x < 0,
            right: d.x > 0,
        }
    }
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_wall() {
        let walls = WallMap::default();
        assert!(walls.is_wall(IVec2::new(-1, 5)));
        assert!(walls.is_wall(IVec2::new(5, GRID_SIZE)));
        assert!(!walls.is_wall(IVec2::new(0, 0)));
        assert!(!walls.is_wall(IVec2::new(GRID_SIZE - 1, GRID_SIZE - 1)));
    }

    #[test]
    fn test_authored_wall() {
        let walls = WallMap::new([IVec2::new(3, 4)]);
        assert!(walls.is_wall(IVec2::new(3, 4)));
        assert!(!walls.is_wall(IVec2::new(4, 3)));
    }

    #[test]
    fn test_authored_cell_forms() {
        let pair: AuthoredCell = serde_json::from_str("[3, 4]").unwrap();
        let point: AuthoredCell = serde_json::from_str(r#"{ "x": 3, "y": 4 }"#).unwrap();
        assert_eq!(Cell::from(pair), IVec2::new(3, 4));
        assert_eq!(Cell::from(point), IVec2::new(3, 4));
        assert!(serde_json::from_str::<AuthoredCell>("[3]").is_err());
    }

    #[test]
    fn test_direction_turns() {
        assert_eq!(Direction::Right.clockwise(), Direction::Down);
        assert_eq!(Direction::Up.clockwise(), Direction::Right);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Down.turned(4), Direction::Down);
    }

    #[test]
    fn test_intent_delta() {
        let diag = MoveIntent { up: true, right: true, ..Default::default() };
        assert_eq!(diag.delta(), IVec2::new(1, -1));
        let cancel = MoveIntent { up: true, down: true, ..Default::default() };
        assert_eq!(cancel.delta(), IVec2::ZERO);
        assert_eq!(
            MoveIntent::toward(IVec2::new(1, 1), IVec2::new(18, 1)),
            MoveIntent::RIGHT
        );
    }
}
