//! Level table
//!
//! Levels are authored data, never behavior. The built-in table lives in
//! `assets/levels.json`; hosts may supply their own table in the same schema.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::enemy::EnemySpec;
use super::grid::{AuthoredCell, Cell, WallMap, authored};
use super::pattern::PatternSpec;
use crate::error::SimError;

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawLevelId {
    Number(u32),
    Name(String),
}

/// Level identifier: numbered main levels, named hidden levels ("11b")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLevelId", into = "RawLevelId")]
pub enum LevelId {
    Number(u32),
    Name(String),
}

impl From<RawLevelId> for LevelId {
    fn from(raw: RawLevelId) -> Self {
        match raw {
            RawLevelId::Number(n) => LevelId::Number(n),
            RawLevelId::Name(name) => LevelId::from(name.as_str()),
        }
    }
}

impl From<LevelId> for RawLevelId {
    fn from(id: LevelId) -> Self {
        match id {
            LevelId::Number(n) => RawLevelId::Number(n),
            LevelId::Name(name) => RawLevelId::Name(name),
        }
    }
}

impl From<u32> for LevelId {
    fn from(n: u32) -> Self {
        LevelId::Number(n)
    }
}

impl From<&str> for LevelId {
    /// Numeric strings collapse onto numbered ids so "12" and 12 agree
    fn from(name: &str) -> Self {
        match name.parse::<u32>() {
            Ok(n) => LevelId::Number(n),
            Err(_) => LevelId::Name(name.to_string()),
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelId::Number(n) => write!(f, "{n}"),
            LevelId::Name(name) => f.write_str(name),
        }
    }
}

/// Where an up-portal leads from a main level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LevelId", into = "LevelId")]
pub enum Destination {
    Level(LevelId),
    /// The `"victory"` sentinel: reaching the portal ends the game
    Victory,
}

impl From<LevelId> for Destination {
    fn from(id: LevelId) -> Self {
        match id {
            LevelId::Name(ref name) if name == "victory" => Destination::Victory,
            other => Destination::Level(other),
        }
    }
}

impl From<Destination> for LevelId {
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::Level(id) => id,
            Destination::Victory => LevelId::Name("victory".to_string()),
        }
    }
}

/// Authored fields that may hold one value or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OneOrMany<U> {
        match self {
            OneOrMany::One(value) => OneOrMany::One(f(value)),
            OneOrMany::Many(values) => OneOrMany::Many(values.into_iter().map(f).collect()),
        }
    }
}

/// Portal cells in either coordinate form, single or listed
fn portals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OneOrMany<Cell>>, D::Error> {
    Ok(Option::<OneOrMany<AuthoredCell>>::deserialize(deserializer)?
        .map(|portals| portals.map(Cell::from)))
}

/// One authored level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: LevelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_level: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_level: Option<LevelId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_levels: Vec<LevelId>,
    /// Set only on hidden levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_level: Option<LevelId>,
    #[serde(
        default,
        deserialize_with = "portals",
        skip_serializing_if = "Option::is_none"
    )]
    pub up: Option<OneOrMany<Cell>>,
    #[serde(
        default,
        deserialize_with = "portals",
        skip_serializing_if = "Option::is_none"
    )]
    pub down: Option<OneOrMany<Cell>>,
    /// Reaching this cell wins the game outright
    #[serde(
        default,
        deserialize_with = "authored::opt_cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish: Option<Cell>,
    #[serde(
        default,
        deserialize_with = "authored::opt_cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub spawn_point: Option<Cell>,
    #[serde(default, deserialize_with = "authored::cells")]
    pub collectibles: Vec<Cell>,
    #[serde(default, deserialize_with = "authored::cells")]
    pub walls: Vec<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacles: Option<OneOrMany<PatternSpec>>,
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
}

impl Level {
    /// Bare level with no content; handy for building tables in code
    pub fn new(id: impl Into<LevelId>) -> Self {
        Self {
            id: id.into(),
            next_level: None,
            hidden_level: None,
            hidden_levels: Vec::new(),
            return_level: None,
            up: None,
            down: None,
            finish: None,
            spawn_point: None,
            collectibles: Vec::new(),
            walls: Vec::new(),
            obstacles: None,
            enemies: Vec::new(),
        }
    }

    pub fn up_portals(&self) -> &[Cell] {
        match &self.up {
            Some(portals) => portals.as_slice(),
            None => &[],
        }
    }

    pub fn down_portals(&self) -> &[Cell] {
        match &self.down {
            Some(portals) => portals.as_slice(),
            None => &[],
        }
    }

    pub fn obstacle_specs(&self) -> &[PatternSpec] {
        match &self.obstacles {
            Some(specs) => specs.as_slice(),
            None => &[],
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.return_level.is_some()
    }

    pub fn wall_map(&self) -> WallMap {
        WallMap::new(self.walls.iter().copied())
    }

    /// Hidden level behind the down-portal at `index`, falling back to `<id>b`
    pub fn hidden_level_for(&self, index: usize) -> LevelId {
        self.hidden_levels
            .get(index)
            .cloned()
            .or_else(|| (index == 0).then(|| self.hidden_level.clone()).flatten())
            .unwrap_or_else(|| LevelId::Name(format!("{}b", self.id)))
    }
}

#[derive(Deserialize)]
struct LevelTable {
    #[serde(default)]
    version: u32,
    levels: Vec<Level>,
}

/// Lookup table of every level in a session
#[derive(Debug, Clone, Default)]
pub struct LevelRegistry {
    levels: HashMap<LevelId, Level>,
    order: Vec<LevelId>,
    version: u32,
}

impl LevelRegistry {
    pub fn from_levels(levels: impl IntoIterator<Item = Level>) -> Self {
        let mut registry = Self::default();
        for level in levels {
            registry.insert(level);
        }
        registry
    }

    /// Parse a `{ "version": n, "levels": [...] }` table
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let table: LevelTable = serde_json::from_str(json)?;
        let mut registry = Self::from_levels(table.levels);
        if registry.is_empty() {
            return Err(SimError::EmptyRegistry);
        }
        registry.version = table.version;
        log::info!(
            "Loaded {} levels (table v{})",
            registry.len(),
            registry.version
        );
        Ok(registry)
    }

    /// The authored campaign shipped with the crate
    pub fn builtin() -> Result<Self, SimError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    fn insert(&mut self, level: Level) {
        let id = level.id.clone();
        if self.levels.insert(id.clone(), level).is_some() {
            log::warn!("Duplicate level {id}; keeping the later entry");
        } else {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &LevelId) -> Option<&Level> {
        self.levels.get(id)
    }

    pub fn contains(&self, id: &LevelId) -> bool {
        self.levels.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Ids in authored order
    pub fn ids(&self) -> impl Iterator<Item = &LevelId> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::pattern::PatternKind;
    use glam::IVec2;

    fn builtin() -> LevelRegistry {
        LevelRegistry::builtin().expect("built-in level table parses")
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let registry = builtin();
        assert_eq!(registry.len(), 21);
        for n in 1..=15u32 {
            assert!(registry.contains(&LevelId::from(n)), "missing level {n}");
        }
        for name in ["11b", "12b", "13b", "14b", "15b", "15c"] {
            let level = registry.get(&LevelId::from(name)).unwrap();
            assert!(level.is_hidden(), "{name} should be hidden");
        }
    }

    #[test]
    fn test_level_one_fields() {
        let registry = builtin();
        let level = registry.get(&LevelId::from(1)).unwrap();
        assert_eq!(level.next_level, Some(Destination::Level(LevelId::from(2))));
        assert_eq!(level.up_portals(), &[IVec2::new(18, 18)]);
        assert_eq!(level.spawn_point, Some(IVec2::new(1, 1)));
        assert_eq!(level.obstacle_specs().len(), 1);
        assert_eq!(level.obstacle_specs()[0].kind, PatternKind::Windmill);
    }

    #[test]
    fn test_final_level_leads_to_victory() {
        let registry = builtin();
        let level = registry.get(&LevelId::from(15)).unwrap();
        assert_eq!(level.next_level, Some(Destination::Victory));
        assert_eq!(level.down_portals().len(), 2);
        assert_eq!(level.hidden_level_for(0), LevelId::from("15b"));
        assert_eq!(level.hidden_level_for(1), LevelId::from("15c"));
    }

    #[test]
    fn test_every_destination_exists() {
        let registry = builtin();
        for id in registry.ids() {
            let level = registry.get(id).unwrap();
            if let Some(Destination::Level(next)) = &level.next_level {
                assert!(registry.contains(next), "{id} -> {next}");
            }
            if let Some(back) = &level.return_level {
                assert!(registry.contains(back), "{id} returns to {back}");
            }
            for i in 0..level.down_portals().len() {
                let hidden = level.hidden_level_for(i);
                assert!(registry.contains(&hidden), "{id} down -> {hidden}");
            }
        }
    }

    #[test]
    fn test_enemies_parse() {
        let registry = builtin();
        let level = registry.get(&LevelId::from("14b")).unwrap();
        assert_eq!(level.enemies.len(), 2);
        assert!(level.enemies.iter().all(|e| e.kind == EnemyKind::StepHunter));
    }

    #[test]
    fn test_hidden_level_fallback_name() {
        let mut level = Level::new(7);
        level.down = Some(OneOrMany::One(IVec2::new(3, 3)));
        assert_eq!(level.hidden_level_for(0), LevelId::from("7b"));
        level.hidden_level = Some(LevelId::from("secret"));
        assert_eq!(level.hidden_level_for(0), LevelId::from("secret"));
        assert_eq!(level.hidden_level_for(1), LevelId::from("7b"));
    }

    #[test]
    fn test_level_id_normalizes_numeric_strings() {
        assert_eq!(LevelId::from("12"), LevelId::Number(12));
        assert_eq!(LevelId::from("12b"), LevelId::Name("12b".into()));
        let id: LevelId = serde_json::from_str(r#""3""#).unwrap();
        assert_eq!(id, LevelId::Number(3));
        assert_eq!(LevelId::from("11b").to_string(), "11b");
    }

    #[test]
    fn test_single_or_list_portals() {
        let json = r#"{ "version": 1, "levels": [
            { "id": 1, "up": [18, 18], "down": [[1, 2], [3, 4]] }
        ] }"#;
        let registry = LevelRegistry::from_json(json).unwrap();
        let level = registry.get(&LevelId::from(1)).unwrap();
        assert_eq!(level.up_portals(), &[IVec2::new(18, 18)]);
        assert_eq!(level.down_portals(), &[IVec2::new(1, 2), IVec2::new(3, 4)]);
        assert!(level.obstacle_specs().is_empty());
    }

    #[test]
    fn test_point_objects_are_accepted() {
        let json = r#"{ "version": 1, "levels": [
            { "id": 1, "spawnPoint": { "x": 1, "y": 1 }, "up": { "x": 18, "y": 18 },
              "down": [{ "x": 3, "y": 5 }, [15, 13]], "finish": { "x": 9, "y": 9 },
              "collectibles": [{ "x": 2, "y": 2 }, [4, 4]],
              "obstacles": { "type": "orbitingDots", "center": { "x": 10, "y": 10 }, "size": 4 },
              "enemies": [{ "type": "hunter", "x": 15, "y": 3 }] }
        ] }"#;
        let registry = LevelRegistry::from_json(json).unwrap();
        let level = registry.get(&LevelId::from(1)).unwrap();
        assert_eq!(level.spawn_point, Some(IVec2::new(1, 1)));
        assert_eq!(level.up_portals(), &[IVec2::new(18, 18)]);
        assert_eq!(level.down_portals(), &[IVec2::new(3, 5), IVec2::new(15, 13)]);
        assert_eq!(level.finish, Some(IVec2::new(9, 9)));
        assert_eq!(level.collectibles, vec![IVec2::new(2, 2), IVec2::new(4, 4)]);
        assert_eq!(level.obstacle_specs()[0].center, IVec2::new(10, 10));
        assert_eq!(level.enemies[0].pos, IVec2::new(15, 3));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let result = LevelRegistry::from_json(r#"{ "version": 1, "levels": [] }"#);
        assert!(matches!(result, Err(SimError::EmptyRegistry)));
    }
}
