//! Game state and core simulation types
//!
//! Everything a level needs to be resumed lives in [`World`]; the session
//! state machine in `tick` owns one and drives it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, PumpkinHead};
use super::entity::Entity;
use super::physics::Platform;
use super::pickup::{BonusKind, Pickup, PowerUpKind};
use super::player::Player;
use super::snowball::{BossProjectile, RollingSnowball, SnowProjectile};
use crate::audio::Sound;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, choosing one or two players
    Menu,
    /// Level name card before play starts
    StageIntro,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level cleared: title, time bonus count-up, then confirm
    LevelComplete,
    /// Every player is out of lives
    GameOver,
    /// Boss defeated
    Victory,
}

/// Something the frame driver forwards to the audio or effects collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(Sound),
    Explosion { pos: Vec2, count: u32 },
    ScorePopup { pos: Vec2, value: u64 },
}

/// Events raised during the current tick, in emission order
#[derive(Debug, Clone, Default)]
pub struct Events {
    queue: Vec<GameEvent>,
}

impl Events {
    pub fn push(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn sound(&mut self, sound: Sound) {
        self.queue.push(GameEvent::Sound(sound));
    }

    pub fn explosion(&mut self, pos: Vec2, count: u32) {
        self.queue.push(GameEvent::Explosion { pos, count });
    }

    pub fn score_popup(&mut self, pos: Vec2, value: u64) {
        self.queue.push(GameEvent::ScorePopup { pos, value });
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    /// Sound cues only
    pub fn sounds(&self) -> impl Iterator<Item = Sound> + '_ {
        self.queue.iter().filter_map(|e| match e {
            GameEvent::Sound(s) => Some(*s),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Hand over everything queued so far
    pub fn take(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }
}

/// A boss reward waiting for its turn to pop out
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingDrop {
    pub delay_ms: f32,
    pub kind: BonusKind,
    pub pos: Vec2,
}

/// Stages of the level-complete screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompleteStage {
    Title,
    /// Time bonus moving into the players' scores
    Counting,
    AwaitConfirm,
}

/// Level-complete screen progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelComplete {
    pub stage: CompleteStage,
    pub stage_ms: f32,
    /// Time bonus not yet paid out
    pub bonus_pool: u64,
    pub step_ms: f32,
}

impl LevelComplete {
    pub fn new(bonus_pool: u64) -> Self {
        Self {
            stage: CompleteStage::Title,
            stage_ms: 0.0,
            bonus_pool,
            step_ms: 0.0,
        }
    }
}

/// Game-over menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverChoice {
    Continue,
    Restart,
}

impl GameOverChoice {
    pub fn toggled(self) -> Self {
        match self {
            GameOverChoice::Continue => GameOverChoice::Restart,
            GameOverChoice::Restart => GameOverChoice::Continue,
        }
    }
}

/// All entities and timers of the level in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub level: u32,
    pub level_name: String,
    /// Boss arena: no clock, no Pumpkin Head, cleared by the boss only
    pub boss_level: bool,
    pub platforms: Vec<Platform>,
    /// Ordered by player number
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub pumpkin: Option<PumpkinHead>,
    pub boss: Option<Boss>,
    pub snowballs: Vec<RollingSnowball>,
    pub projectiles: Vec<SnowProjectile>,
    pub boss_projectiles: Vec<BossProjectile>,
    pub pickups: Vec<Pickup>,
    /// Level clock counting down
    pub time_left_ms: f32,
    pub hurry_triggered: bool,
    /// Remaining display time of the HURRY banner
    pub hurry_banner_ms: f32,
    pub pumpkin_spawned: bool,
    pub pending_drops: Vec<PendingDrop>,
    /// Countdown from boss defeat to the victory screen
    pub victory_delay_ms: Option<f32>,
    #[serde(skip)]
    pub events: Events,
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            level: 0,
            level_name: String::new(),
            boss_level: false,
            platforms: Vec::new(),
            players: Vec::new(),
            enemies: Vec::new(),
            pumpkin: None,
            boss: None,
            snowballs: Vec::new(),
            projectiles: Vec::new(),
            boss_projectiles: Vec::new(),
            pickups: Vec::new(),
            time_left_ms: 0.0,
            hurry_triggered: false,
            hurry_banner_ms: 0.0,
            pumpkin_spawned: false,
            pending_drops: Vec::new(),
            victory_delay_ms: None,
            events: Events::default(),
            next_id: 1,
        }
    }

    /// Get next entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player(&self, num: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.num == num)
    }

    pub fn player_mut(&mut self, num: u8) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.num == num)
    }

    /// Credit `points` to player `num`
    pub fn add_score(&mut self, num: u8, points: u64) {
        match self.player_mut(num) {
            Some(player) => player.add_score(points),
            None => log::warn!("Dropping {} points for absent player {}", points, num),
        }
    }

    /// Centers of players enemies may chase
    pub fn targets(&self) -> Vec<Vec2> {
        self.players
            .iter()
            .filter(|p| p.can_interact())
            .map(|p| p.center())
            .collect()
    }

    pub fn spawn_power_up(&mut self, x: f32, y: f32, kind: PowerUpKind) {
        let id = self.next_entity_id();
        self.pickups.push(Pickup::power_up(id, x, y, kind));
    }

    pub fn spawn_bonus(&mut self, x: f32, y: f32, kind: BonusKind, vx: f32) {
        let id = self.next_entity_id();
        self.pickups.push(Pickup::bonus(id, x, y, kind, vx));
    }

    /// Remove everything marked inactive this tick
    pub fn sweep(&mut self) {
        self.enemies.retain(|e| e.alive);
        self.snowballs.retain(|s| s.active);
        self.projectiles.retain(|p| p.active);
        self.boss_projectiles.retain(|p| p.active);
        self.pickups.retain(|p| p.active);
        if self.pumpkin.as_ref().is_some_and(|p| !p.active) {
            self.pumpkin = None;
        }
    }

    /// Drop every level-scoped entity; players and scores survive
    pub fn clear_level(&mut self) {
        self.platforms.clear();
        self.enemies.clear();
        self.pumpkin = None;
        self.boss = None;
        self.snowballs.clear();
        self.projectiles.clear();
        self.boss_projectiles.clear();
        self.pickups.clear();
        self.pending_drops.clear();
        self.victory_delay_ms = None;
        self.hurry_triggered = false;
        self.hurry_banner_ms = 0.0;
        self.pumpkin_spawned = false;
    }

    /// Non-boss level with every demon gone
    pub fn is_cleared(&self) -> bool {
        !self.boss_level && self.enemies.iter().all(|e| !e.alive)
    }

    /// Nobody has lives left and no death animation is still playing
    pub fn all_players_out(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| !p.in_play())
    }

    /// Sort entities by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.num);
        self.enemies.sort_by_key(|e| e.id);
        self.snowballs.sort_by_key(|s| s.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::coverage::SnowCoverage;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::rng::SequenceRng;

    fn world_with_enemy() -> World {
        let mut world = World::new();
        let mut rng = SequenceRng::constant(0.5);
        let id = world.next_entity_id();
        world.enemies.push(Enemy::new(
            id,
            EnemyKind::RedDemon,
            40.0,
            100.0,
            SnowCoverage::new(SNOW_HITS_TO_FREEZE, FREEZE_RELEASE_MS),
            &mut rng,
        ));
        world
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut world = World::new();
        let a = world.next_entity_id();
        let b = world.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_events_filter_sounds() {
        let mut events = Events::default();
        events.sound(Sound::Jump);
        events.explosion(Vec2::ZERO, 8);
        events.sound(Sound::Shoot);
        let sounds: Vec<Sound> = events.sounds().collect();
        assert_eq!(sounds, vec![Sound::Jump, Sound::Shoot]);
        assert_eq!(events.take().len(), 3);
        assert!(events.is_empty());
    }

    #[test]
    fn test_sweep_removes_dead() {
        let mut world = world_with_enemy();
        world.pumpkin = Some(PumpkinHead::new(0.0, 0.0));
        assert!(!world.is_cleared());

        world.enemies[0].alive = false;
        if let Some(p) = world.pumpkin.as_mut() {
            p.active = false;
        }
        world.sweep();
        assert!(world.enemies.is_empty());
        assert!(world.pumpkin.is_none());
        assert!(world.is_cleared());
    }

    #[test]
    fn test_boss_level_never_counts_as_cleared() {
        let mut world = World::new();
        world.boss_level = true;
        assert!(!world.is_cleared());
    }

    #[test]
    fn test_score_for_absent_player_is_dropped() {
        let mut world = World::new();
        world.players.push(Player::new(1, 20.0, 20.0, 3));
        world.add_score(2, 500);
        world.add_score(1, 500);
        assert_eq!(world.player(1).map(|p| p.score), Some(500));
    }

    #[test]
    fn test_all_players_out() {
        let mut world = World::new();
        assert!(!world.all_players_out());
        world.players.push(Player::new(1, 20.0, 20.0, 1));
        assert!(!world.all_players_out());
        world.players[0].lives = 0;
        world.players[0].life = crate::sim::player::LifeState::Out;
        assert!(world.all_players_out());
    }
}
