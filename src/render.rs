//! Render hook
//!
//! The simulation never draws. Each frame the session is walked in paint
//! order and every visible object is handed to a [`Renderer`] as a borrowed
//! [`Drawable`]; sprites, animation and blinking are the renderer's business.

use std::collections::BTreeMap;

use crate::sim::state::{CompleteStage, GameOverChoice, GamePhase};
use crate::sim::{
    Boss, BossProjectile, Enemy, Entity, Pickup, Platform, Player, PumpkinHead, RollingSnowball,
    Session, SnowProjectile,
};

/// Per-player HUD line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerHud {
    pub num: u8,
    pub score: u64,
    pub lives: u8,
}

/// Heads-up display contents
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub level: u32,
    pub players: Vec<PlayerHud>,
    /// Whole seconds left on the level clock (none in the boss arena)
    pub seconds_left: Option<u32>,
    /// Boss health bar fill in `[0, 1]`
    pub boss_health: Option<f32>,
}

/// Full-screen overlays
#[derive(Debug, Clone, PartialEq)]
pub enum Banner<'a> {
    Title { selection: u8 },
    StageIntro { level: u32, name: &'a str },
    Hurry,
    Paused,
    LevelComplete { stage: CompleteStage, bonus_left: u64 },
    GameOver { choice: GameOverChoice },
    Victory,
}

/// One thing to draw this frame
#[derive(Debug, Clone)]
pub enum Drawable<'a> {
    Platform(&'a Platform),
    Pickup(&'a Pickup),
    Enemy(&'a Enemy),
    PumpkinHead(&'a PumpkinHead),
    Boss(&'a Boss),
    Snowball(&'a RollingSnowball),
    SnowShot(&'a SnowProjectile),
    BossShot(&'a BossProjectile),
    Player(&'a Player),
    Hud(Hud),
    Banner(Banner<'a>),
}

impl Drawable<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Drawable::Platform(_) => "platform",
            Drawable::Pickup(_) => "pickup",
            Drawable::Enemy(_) => "enemy",
            Drawable::PumpkinHead(_) => "pumpkin",
            Drawable::Boss(_) => "boss",
            Drawable::Snowball(_) => "snowball",
            Drawable::SnowShot(_) => "snow",
            Drawable::BossShot(_) => "boss_shot",
            Drawable::Player(_) => "player",
            Drawable::Hud(_) => "hud",
            Drawable::Banner(_) => "banner",
        }
    }
}

/// Renderer collaborator: consumes views, returns nothing to the core
pub trait Renderer {
    fn draw(&mut self, item: Drawable<'_>);
}

/// Counts draw calls per kind (headless runs, tests)
#[derive(Debug, Default)]
pub struct DrawCounter {
    pub counts: BTreeMap<&'static str, usize>,
}

impl DrawCounter {
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl Renderer for DrawCounter {
    fn draw(&mut self, item: Drawable<'_>) {
        *self.counts.entry(item.label()).or_default() += 1;
    }
}

/// Walk the session in paint order
pub fn render_session(session: &Session, renderer: &mut dyn Renderer) {
    let world = &session.world;

    if session.phase == GamePhase::Menu {
        renderer.draw(Drawable::Banner(Banner::Title {
            selection: session.menu_selection,
        }));
        return;
    }

    for platform in &world.platforms {
        renderer.draw(Drawable::Platform(platform));
    }
    for pickup in world.pickups.iter().filter(|p| p.active) {
        renderer.draw(Drawable::Pickup(pickup));
    }
    for enemy in world.enemies.iter().filter(|e| e.alive) {
        renderer.draw(Drawable::Enemy(enemy));
    }
    if let Some(pumpkin) = world.pumpkin.as_ref().filter(|p| p.active) {
        renderer.draw(Drawable::PumpkinHead(pumpkin));
    }
    if let Some(boss) = world.boss.as_ref().filter(|b| b.is_active()) {
        renderer.draw(Drawable::Boss(boss));
    }
    for ball in world.snowballs.iter().filter(|b| b.active) {
        renderer.draw(Drawable::Snowball(ball));
    }
    for shot in world.projectiles.iter().filter(|p| p.active) {
        renderer.draw(Drawable::SnowShot(shot));
    }
    for shot in world.boss_projectiles.iter().filter(|p| p.active) {
        renderer.draw(Drawable::BossShot(shot));
    }
    for player in world.players.iter().filter(|p| p.in_play()) {
        renderer.draw(Drawable::Player(player));
    }

    renderer.draw(Drawable::Hud(Hud {
        level: world.level,
        players: world
            .players
            .iter()
            .map(|p| PlayerHud {
                num: p.num,
                score: p.score,
                lives: p.lives,
            })
            .collect(),
        seconds_left: (!world.boss_level).then(|| (world.time_left_ms / 1000.0).ceil() as u32),
        boss_health: world.boss.as_ref().map(|b| b.health_ratio()),
    }));

    let banner = match session.phase {
        GamePhase::StageIntro => Some(Banner::StageIntro {
            level: world.level,
            name: &world.level_name,
        }),
        GamePhase::Playing if world.hurry_banner_ms > 0.0 => Some(Banner::Hurry),
        GamePhase::Paused => Some(Banner::Paused),
        GamePhase::LevelComplete => Some(Banner::LevelComplete {
            stage: session.complete.stage,
            bonus_left: session.complete.bonus_pool,
        }),
        GamePhase::GameOver => Some(Banner::GameOver {
            choice: session.game_over_choice,
        }),
        GamePhase::Victory => Some(Banner::Victory),
        _ => None,
    };
    if let Some(banner) = banner {
        renderer.draw(Drawable::Banner(banner));
    }
}
