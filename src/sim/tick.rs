//! Session state machine and the fixed-order world tick
//!
//! A [`Session`] walks Menu → StageIntro → Playing ⇄ Paused →
//! LevelComplete / GameOver / Victory. While playing, each tick runs the
//! level clock, entity updates, spawn merge, interactions, boss rewards,
//! the sweep, then the end-of-level checks, always in that order.

use glam::Vec2;

use super::boss::Boss;
use super::coverage::SnowCoverage;
use super::enemy::{Enemy, PumpkinHead};
use super::entity::{Entity, Spawn, TickContext};
use super::interactions;
use super::pickup::BonusKind;
use super::player::{LifeState, Player};
use super::rng::{RandomSource, SimRng};
use super::state::{
    CompleteStage, GameEvent, GameOverChoice, GamePhase, LevelComplete, PendingDrop, World,
};
use crate::audio::Sound;
use crate::consts::*;
use crate::frames_to_ms;
use crate::input::{MenuInput, TickInput};
use crate::levels::{LevelSet, LevelSource};
use crate::settings::Settings;

/// Bonuses the boss leaves behind, released one after another
const BOSS_REWARDS: [BonusKind; 5] = [
    BonusKind::Diamond,
    BonusKind::Diamond,
    BonusKind::Cake,
    BonusKind::Cake,
    BonusKind::Cake,
];

/// Seed used when the settings do not pin one
pub const DEFAULT_SEED: u64 = 0x5eed_b105;

/// One game from title screen to game over or victory
pub struct Session {
    pub settings: Settings,
    pub phase: GamePhase,
    pub world: World,
    pub num_players: u8,
    /// Highlighted menu entry (1 or 2 players)
    pub menu_selection: u8,
    /// Time spent in the current phase
    pub phase_ms: f32,
    pub complete: LevelComplete,
    pub game_over_choice: GameOverChoice,
    rng: Box<dyn RandomSource>,
    levels: Box<dyn LevelSource>,
}

impl Session {
    pub fn new(
        settings: Settings,
        levels: Box<dyn LevelSource>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            settings,
            phase: GamePhase::Menu,
            world: World::new(),
            num_players: 1,
            menu_selection: 1,
            phase_ms: 0.0,
            complete: LevelComplete::new(0),
            game_over_choice: GameOverChoice::Continue,
            rng,
            levels,
        }
    }

    /// Built-in levels and a seeded RNG
    pub fn with_settings(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or(DEFAULT_SEED);
        Self::new(
            settings,
            Box::new(LevelSet::builtin()),
            Box::new(SimRng::new(seed)),
        )
    }

    /// Hand over the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.events.take()
    }

    /// Advance the session by one frame. `dt` is frame-normalized and
    /// clamped to the configured stall limit.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.settings.max_dt_multiplier)
        } else {
            0.0
        };
        let elapsed_ms = frames_to_ms(dt);

        match self.phase {
            GamePhase::Menu => self.tick_menu(&input.menu),
            GamePhase::StageIntro => {
                self.phase_ms += elapsed_ms;
                if self.phase_ms >= self.settings.stage_intro_ms || input.menu.confirm {
                    self.enter_phase(GamePhase::Playing);
                }
            }
            GamePhase::Playing => {
                if input.pause {
                    self.world.events.sound(Sound::Pause);
                    self.enter_phase(GamePhase::Paused);
                } else {
                    self.tick_playing(input, dt);
                }
            }
            GamePhase::Paused => {
                if input.pause {
                    self.world.events.sound(Sound::Pause);
                    self.enter_phase(GamePhase::Playing);
                }
            }
            GamePhase::LevelComplete => self.tick_level_complete(&input.menu, elapsed_ms),
            GamePhase::GameOver => self.tick_game_over(&input.menu),
            GamePhase::Victory => {
                if input.menu.confirm {
                    self.return_to_menu();
                }
            }
        }
    }

    fn enter_phase(&mut self, phase: GamePhase) {
        log::info!("Phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.phase_ms = 0.0;
    }

    fn tick_menu(&mut self, menu: &MenuInput) {
        if menu.select_one {
            self.start_game(1);
        } else if menu.select_two {
            self.start_game(2);
        } else if menu.up || menu.down {
            self.menu_selection = if self.menu_selection == 1 { 2 } else { 1 };
            self.world.events.sound(Sound::Menu);
        } else if menu.confirm {
            self.start_game(self.menu_selection);
        }
    }

    /// Fresh game with `num_players` players, starting at level 1
    pub fn start_game(&mut self, num_players: u8) {
        let num_players = num_players.clamp(1, 2);
        self.num_players = num_players;
        self.world = World::new();
        for num in 1..=num_players {
            self.world
                .players
                .push(Player::new(num, 0.0, 0.0, self.settings.starting_lives));
        }
        self.world.events.sound(Sound::Start);
        log::info!("Starting {}-player game", num_players);
        self.begin_level(1);
    }

    /// Load `number` behind its stage card; no such level means the game is won
    fn begin_level(&mut self, number: u32) {
        if self.load_level(number) {
            self.enter_phase(GamePhase::StageIntro);
        } else {
            self.win();
        }
    }

    /// Jump straight into a level (debug/testing)
    pub fn skip_to_level(&mut self, number: u32) -> bool {
        let loaded = self.load_level(number);
        if loaded {
            self.enter_phase(GamePhase::Playing);
        }
        loaded
    }

    /// Build the world for `number`. Returns false if the level source has no such level.
    fn load_level(&mut self, number: u32) -> bool {
        let Some(data) = self.levels.level(number) else {
            log::warn!("Level {} not found", number);
            return false;
        };

        let world = &mut self.world;
        world.clear_level();
        world.level = number;
        world.level_name = data.name.clone();
        world.boss_level = data.boss;
        world.platforms = data.build_platforms();
        world.time_left_ms = if data.boss {
            0.0
        } else {
            self.settings.level_time_ms
        };

        for spawn in &data.enemies {
            let id = world.next_entity_id();
            let coverage =
                SnowCoverage::new(self.settings.hits_to_freeze, self.settings.freeze_release_ms);
            world.enemies.push(Enemy::new(
                id,
                spawn.kind,
                spawn.x,
                spawn.y,
                coverage,
                self.rng.as_mut(),
            ));
        }
        if data.boss {
            world.boss = Some(Boss::arena_entry());
        }

        for player in world.players.iter_mut() {
            if player.lives > 0 {
                let spawn = data.spawn_for(player.num);
                player.respawn(spawn.x, spawn.y);
            } else {
                player.life = LifeState::Out;
            }
        }
        world.normalize_order();

        log::info!(
            "Level {} \"{}\": {} enemies{}",
            number,
            data.name,
            world.enemies.len(),
            if data.boss { ", boss" } else { "" }
        );
        true
    }

    fn tick_playing(&mut self, input: &TickInput, dt: f32) {
        let elapsed_ms = frames_to_ms(dt);
        self.update_level_clock(elapsed_ms);

        for player in self.world.players.iter_mut() {
            player.input = input.player(player.num);
        }
        update_entities(&mut self.world, self.rng.as_mut(), dt, elapsed_ms);
        interactions::resolve(&mut self.world, self.rng.as_mut(), &self.settings);

        self.handle_boss_defeat();
        self.release_pending_drops(elapsed_ms);
        self.world.sweep();

        if let Some(remaining) = self.world.victory_delay_ms {
            let remaining = remaining - elapsed_ms;
            if remaining <= 0.0 {
                self.world.victory_delay_ms = None;
                self.win();
                return;
            }
            self.world.victory_delay_ms = Some(remaining);
        }

        if self.world.is_cleared() {
            self.begin_level_complete();
        } else if self.world.all_players_out() {
            self.world.events.sound(Sound::GameOver);
            self.game_over_choice = GameOverChoice::Continue;
            log::info!("Game over on level {}", self.world.level);
            self.enter_phase(GamePhase::GameOver);
        }
    }

    /// Countdown, HURRY warning and the Pumpkin Head release
    fn update_level_clock(&mut self, elapsed_ms: f32) {
        let world = &mut self.world;
        if world.boss_level {
            return;
        }

        world.time_left_ms = (world.time_left_ms - elapsed_ms).max(0.0);
        if world.hurry_banner_ms > 0.0 {
            world.hurry_banner_ms = (world.hurry_banner_ms - elapsed_ms).max(0.0);
        }

        if !world.hurry_triggered && world.time_left_ms <= self.settings.hurry_time_ms {
            world.hurry_triggered = true;
            world.hurry_banner_ms = HURRY_BANNER_MS;
            world.events.sound(Sound::Hurry);
            log::debug!("Hurry up! {:.0}s left", world.time_left_ms / 1000.0);
        }

        if world.time_left_ms <= 0.0 && !world.pumpkin_spawned {
            let avoid_x = world
                .player(1)
                .or_else(|| world.players.first())
                .map(|p| p.center().x)
                .unwrap_or(CANVAS_WIDTH / 2.0);
            let x = PumpkinHead::spawn_x(avoid_x);
            world.pumpkin = Some(PumpkinHead::new(x, 16.0));
            world.pumpkin_spawned = true;
            world.events.sound(Sound::PumpkinHead);
            log::info!("Time up: Pumpkin Head released at x={:.0}", x);
        }
    }

    /// Award the boss bonus and queue the reward drops, once
    fn handle_boss_defeat(&mut self) {
        let Some(boss) = self.world.boss.as_mut() else {
            return;
        };
        if !boss.take_defeat() {
            return;
        }
        let origin = boss.body.pos;
        let width = boss.body.size.x;
        let center = boss.center();

        let world = &mut self.world;
        for player in world.players.iter_mut() {
            player.add_score(BOSS_DEFEAT_BONUS);
        }
        world.events.score_popup(center, BOSS_DEFEAT_BONUS);

        for (i, kind) in BOSS_REWARDS.iter().enumerate() {
            let x = origin.x + self.rng.range(0.0, width);
            world.pending_drops.push(PendingDrop {
                delay_ms: i as f32 * REWARD_DROP_SPACING_MS,
                kind: *kind,
                pos: Vec2::new(x, origin.y),
            });
        }
        world.victory_delay_ms = Some(VICTORY_DELAY_MS);
        log::info!("Boss down: rewards queued");
    }

    fn release_pending_drops(&mut self, elapsed_ms: f32) {
        let mut ready = Vec::new();
        self.world.pending_drops.retain_mut(|pending| {
            pending.delay_ms -= elapsed_ms;
            if pending.delay_ms <= 0.0 {
                ready.push(*pending);
                false
            } else {
                true
            }
        });
        for pending in ready {
            let vx = self.rng.range(-1.0, 1.0);
            self.world
                .spawn_bonus(pending.pos.x, pending.pos.y, pending.kind, vx);
        }
    }

    fn begin_level_complete(&mut self) {
        let seconds = (self.world.time_left_ms / 1000.0).floor() as u64;
        self.complete = LevelComplete::new(seconds * TIME_BONUS_PER_SECOND);
        self.world.events.sound(Sound::LevelComplete);
        log::info!(
            "Level {} complete, time bonus {}",
            self.world.level,
            self.complete.bonus_pool
        );
        self.enter_phase(GamePhase::LevelComplete);
    }

    fn tick_level_complete(&mut self, menu: &MenuInput, elapsed_ms: f32) {
        self.complete.stage_ms += elapsed_ms;
        match self.complete.stage {
            CompleteStage::Title => {
                if self.complete.stage_ms >= LEVEL_TITLE_MS {
                    self.complete.stage = CompleteStage::Counting;
                    self.complete.stage_ms = 0.0;
                }
            }
            CompleteStage::Counting => {
                if menu.confirm {
                    let rest = std::mem::take(&mut self.complete.bonus_pool);
                    self.award_time_bonus(rest);
                } else {
                    self.complete.step_ms += elapsed_ms;
                    while self.complete.step_ms >= TIME_BONUS_STEP_MS && self.complete.bonus_pool > 0
                    {
                        self.complete.step_ms -= TIME_BONUS_STEP_MS;
                        let amount = self.complete.bonus_pool.min(TIME_BONUS_PER_SECOND);
                        self.complete.bonus_pool -= amount;
                        self.award_time_bonus(amount);
                        self.world.events.sound(Sound::BonusTick);
                    }
                }
                if self.complete.bonus_pool == 0 {
                    self.complete.stage = CompleteStage::AwaitConfirm;
                    self.complete.stage_ms = 0.0;
                }
            }
            CompleteStage::AwaitConfirm => {
                if menu.confirm
                    || self.complete.stage_ms >= self.settings.level_complete_auto_advance_ms
                {
                    let next = self.world.level + 1;
                    self.begin_level(next);
                }
            }
        }
    }

    /// Split `amount` evenly between players with lives left; the remainder
    /// goes to the lowest-numbered of them
    fn award_time_bonus(&mut self, amount: u64) {
        let mut recipients: Vec<&mut Player> = self
            .world
            .players
            .iter_mut()
            .filter(|p| p.lives > 0)
            .collect();
        if recipients.is_empty() || amount == 0 {
            return;
        }
        let count = recipients.len() as u64;
        let share = amount / count;
        let remainder = amount % count;
        for player in recipients.iter_mut() {
            player.add_score(share);
        }
        if let Some(first) = recipients.first_mut() {
            first.add_score(remainder);
        }
    }

    fn tick_game_over(&mut self, menu: &MenuInput) {
        if menu.up || menu.down {
            self.game_over_choice = self.game_over_choice.toggled();
            self.world.events.sound(Sound::Menu);
        } else if menu.back {
            self.return_to_menu();
        } else if menu.confirm {
            match self.game_over_choice {
                GameOverChoice::Continue => self.continue_game(),
                GameOverChoice::Restart => self.return_to_menu(),
            }
        }
    }

    /// Same level again with full lives; scores carry over
    fn continue_game(&mut self) {
        for player in self.world.players.iter_mut() {
            player.lives = self.settings.starting_lives;
            player.powerups.clear();
        }
        let level = self.world.level;
        if self.load_level(level) {
            self.world.events.sound(Sound::Start);
            log::info!("Continuing level {}", level);
            self.enter_phase(GamePhase::Playing);
        } else {
            self.return_to_menu();
        }
    }

    fn return_to_menu(&mut self) {
        self.world = World::new();
        self.menu_selection = 1;
        self.enter_phase(GamePhase::Menu);
    }

    fn win(&mut self) {
        self.world.events.sound(Sound::Victory);
        log::info!(
            "Victory! Scores: {:?}",
            self.world.players.iter().map(|p| p.score).collect::<Vec<_>>()
        );
        self.enter_phase(GamePhase::Victory);
    }
}

/// Move every entity one step and merge what they spawned
fn update_entities(world: &mut World, rng: &mut dyn RandomSource, dt: f32, elapsed_ms: f32) {
    let targets = world.targets();
    let mut spawns = Vec::new();
    let World {
        platforms,
        players,
        enemies,
        pumpkin,
        boss,
        snowballs,
        projectiles,
        boss_projectiles,
        pickups,
        events,
        ..
    } = world;

    let mut ctx = TickContext {
        dt,
        elapsed_ms,
        platforms: platforms.as_slice(),
        targets: &targets,
        rng,
        events,
        spawns: &mut spawns,
    };
    for player in players.iter_mut() {
        player.update(&mut ctx);
    }
    for enemy in enemies.iter_mut() {
        enemy.update(&mut ctx);
    }
    if let Some(pumpkin) = pumpkin.as_mut() {
        pumpkin.update(&mut ctx);
    }
    if let Some(boss) = boss.as_mut() {
        boss.update(&mut ctx);
    }
    for ball in snowballs.iter_mut() {
        ball.update(&mut ctx);
    }
    for shot in projectiles.iter_mut() {
        shot.update(&mut ctx);
    }
    for shot in boss_projectiles.iter_mut() {
        shot.update(&mut ctx);
    }
    for pickup in pickups.iter_mut() {
        pickup.update(&mut ctx);
    }

    for spawn in spawns {
        match spawn {
            Spawn::Snow(shot) => projectiles.push(shot),
            Spawn::BossShot(shot) => boss_projectiles.push(shot),
        }
    }
}
