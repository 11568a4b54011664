//! Level data model and the built-in stage set
//!
//! Level geometry is static data read once at level load. The built-in set
//! (ten stages plus the boss arena) ships as embedded JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::{EnemyKind, Platform, PlatformKind};

/// Player spawn position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

/// Platform as authored in level data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub kind: PlatformKind,
}

impl PlatformSpec {
    pub fn to_platform(&self) -> Platform {
        Platform::new(self.x, self.y, self.width, self.height, self.kind)
    }
}

/// Enemy placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub kind: EnemyKind,
}

/// One stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub number: u32,
    pub name: String,
    pub player_spawns: Vec<SpawnPoint>,
    pub platforms: Vec<PlatformSpec>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Boss arena: cleared by defeating the boss rather than the roster
    #[serde(default)]
    pub boss: bool,
}

impl LevelData {
    /// Spawn for player `num` (1-based), falling back to the first spawn
    pub fn spawn_for(&self, player_num: u8) -> SpawnPoint {
        let idx = player_num.saturating_sub(1) as usize;
        self.player_spawns
            .get(idx)
            .or_else(|| self.player_spawns.first())
            .copied()
            .unwrap_or(SpawnPoint { x: 32.0, y: 180.0 })
    }

    pub fn build_platforms(&self) -> Vec<Platform> {
        self.platforms.iter().map(PlatformSpec::to_platform).collect()
    }
}

/// Level data collaborator
pub trait LevelSource {
    /// Stage `n` (1-based), or `None` past the end of the game
    fn level(&self, number: u32) -> Option<LevelData>;
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    levels: Vec<LevelData>,
}

/// Levels parsed from a JSON document
#[derive(Debug, Clone, Default)]
pub struct LevelSet {
    levels: BTreeMap<u32, LevelData>,
}

const BUILTIN_LEVELS: &str = include_str!("../assets/levels.json");

impl LevelSet {
    /// Parse a `{ "levels": [...] }` document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: LevelFile = serde_json::from_str(json)?;
        let levels = file.levels.into_iter().map(|l| (l.number, l)).collect();
        Ok(Self { levels })
    }

    /// The shipped stage set. A broken embedded file yields an empty set,
    /// which the session treats as "no more levels".
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_LEVELS) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("Built-in level data unreadable: {}", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn insert(&mut self, level: LevelData) {
        self.levels.insert(level.number, level);
    }
}

impl LevelSource for LevelSet {
    fn level(&self, number: u32) -> Option<LevelData> {
        self.levels.get(&number).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOSS_LEVEL, LAST_REGULAR_LEVEL};

    #[test]
    fn test_builtin_levels_parse() {
        let set = LevelSet::builtin();
        assert_eq!(set.len(), 11);
        for n in 1..=LAST_REGULAR_LEVEL {
            let level = set.level(n).unwrap();
            assert!(!level.boss);
            assert!(!level.enemies.is_empty());
            assert!(!level.platforms.is_empty());
        }
        let boss = set.level(BOSS_LEVEL).unwrap();
        assert!(boss.boss);
        assert!(boss.enemies.is_empty());
        assert!(set.level(BOSS_LEVEL + 1).is_none());
    }

    #[test]
    fn test_level_one_layout() {
        let level = LevelSet::builtin().level(1).unwrap();
        assert_eq!(level.name, "First Steps");
        assert_eq!(level.enemies.len(), 2);
        assert!(level.enemies.iter().all(|e| e.kind == EnemyKind::RedDemon));
        assert_eq!(level.platforms[0].kind, PlatformKind::Solid);
        assert_eq!(level.platforms[1].kind, PlatformKind::Passthrough);
    }

    #[test]
    fn test_spawn_fallback() {
        let mut level = LevelSet::builtin().level(1).unwrap();
        level.player_spawns.truncate(1);
        assert_eq!(level.spawn_for(2), level.spawn_for(1));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(LevelSet::from_json("{ \"levels\": [ { \"number\": 1 } ] }").is_err());
    }
}
