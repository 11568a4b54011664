//! Snow Brothers - a two-player snowball platform arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, snow coverage, collisions, session state)
//! - `input`: Per-tick input snapshots and the input collaborator
//! - `audio`: Semantic sound cues and the audio collaborator
//! - `render`: Render hook for an external renderer
//! - `levels`: Level data model and built-in level set
//! - `settings`: Game configuration
//! - `frame`: Frame clock and per-frame driver

pub mod audio;
pub mod frame;
pub mod input;
pub mod levels;
pub mod render;
pub mod settings;
pub mod sim;

pub use frame::{FrameClock, Game};
pub use settings::Settings;

/// Game configuration constants
///
/// Velocities are in pixels per 60 Hz frame; timers are in milliseconds.
pub mod consts {
    /// Logical screen size
    pub const CANVAS_WIDTH: f32 = 256.0;
    pub const CANVAS_HEIGHT: f32 = 224.0;
    /// Floor line (the bottom 8px strip is never walkable space)
    pub const FLOOR_Y: f32 = CANVAS_HEIGHT - 8.0;

    /// Target frame rate the physics constants are tuned for
    pub const TARGET_FPS: f32 = 60.0;
    pub const FRAME_TIME_MS: f32 = 1000.0 / TARGET_FPS;
    /// Largest delta multiplier accepted after a stall
    pub const MAX_DT_MULTIPLIER: f32 = 3.0;

    /// Physics
    pub const GRAVITY: f32 = 0.35;
    pub const MAX_FALL_SPEED: f32 = 6.0;
    pub const FRICTION: f32 = 0.85;
    /// Horizontal speed below which friction snaps to zero
    pub const STOP_EPSILON: f32 = 0.1;

    /// Player
    pub const PLAYER_SPEED: f32 = 1.8;
    pub const PLAYER_ACCEL_FACTOR: f32 = 0.3;
    pub const PLAYER_JUMP_FORCE: f32 = -5.5;
    pub const PLAYER_WIDTH: f32 = 14.0;
    pub const PLAYER_HEIGHT: f32 = 16.0;
    pub const PLAYER_LIVES: u8 = 3;
    pub const INVINCIBILITY_MS: f32 = 2000.0;
    pub const SPAWN_ANIM_MS: f32 = 750.0;
    pub const DEATH_ANIM_MS: f32 = 1000.0;
    pub const SHOOT_DELAY_MS: f32 = 200.0;
    /// Power-up multipliers
    pub const SPEED_BOOST: f32 = 1.5;
    pub const RANGE_BOOST: f32 = 1.5;
    pub const FIRE_RATE_FACTOR: f32 = 0.5;
    pub const FLY_JUMP_FACTOR: f32 = 0.5;

    /// Snow
    pub const SNOW_SPEED: f32 = 4.0;
    pub const SNOW_RANGE: f32 = 60.0;
    pub const SNOW_SIZE: f32 = 8.0;
    pub const SNOW_HITS_TO_FREEZE: u32 = 3;
    pub const FREEZE_RELEASE_MS: f32 = 5000.0;

    /// Rolling snowball
    pub const SNOWBALL_SIZE: f32 = 12.0;
    pub const SNOWBALL_ROLL_SPEED: f32 = 3.0;
    pub const SNOWBALL_BOUNCE_DECAY: f32 = 0.7;
    pub const SNOWBALL_MAX_BOUNCES: u32 = 5;
    pub const SNOWBALL_LIFETIME_MS: f32 = 10_000.0;
    pub const SNOWBALL_BASE_SCORE: u64 = 500;
    pub const PUSH_SCORE: u64 = 100;

    /// Enemies
    pub const ENEMY_SPEED: f32 = 0.8;
    pub const ENEMY_WIDTH: f32 = 14.0;
    pub const ENEMY_HEIGHT: f32 = 16.0;
    pub const BLUE_DEMON_SPEED_FACTOR: f32 = 1.2;
    pub const BLUE_DEMON_JUMP_CHANCE: f32 = 0.02;
    pub const ENEMY_JUMP_FACTOR: f32 = 0.8;
    pub const POWERUP_DROP_CHANCE: f32 = 0.3;

    /// Pumpkin Head
    pub const PUMPKIN_SPEED: f32 = 1.0;
    pub const PUMPKIN_DEADZONE: f32 = 4.0;
    pub const PUMPKIN_JUMP_CHANCE: f32 = 0.03;
    pub const PUMPKIN_SIZE: f32 = 16.0;

    /// Boss
    pub const BOSS_SIZE: f32 = 32.0;
    pub const BOSS_MAX_HEALTH: i32 = 30;
    pub const BOSS_BASE_SPEED: f32 = 1.2;
    pub const BOSS_PHASE2_SPEED_FACTOR: f32 = 1.5;
    pub const BOSS_ATTACK_DELAY_MS: f32 = 2000.0;
    pub const BOSS_PHASE2_ATTACK_DELAY_MS: f32 = 1500.0;
    pub const BOSS_IDLE_MS: f32 = 1000.0;
    pub const BOSS_ATTACK_MS: f32 = 500.0;
    pub const BOSS_HIT_FLASH_MS: f32 = 200.0;
    pub const BOSS_PHASE_CHANGE_MS: f32 = 2000.0;
    pub const BOSS_DYING_MS: f32 = 3000.0;
    pub const BOSS_DEFEAT_BONUS: u64 = 10_000;
    pub const BOSS_ENTRY_Y: f32 = 60.0;
    pub const BOSS_PROJECTILE_SIZE: f32 = 8.0;
    pub const VICTORY_DELAY_MS: f32 = 1000.0;
    pub const REWARD_DROP_SPACING_MS: f32 = 200.0;

    /// Pickups
    pub const POWERUP_DURATION_MS: f32 = 10_000.0;
    pub const POWERUP_FALL_SPEED: f32 = 1.5;
    pub const POWERUP_LIFETIME_MS: f32 = 10_000.0;
    pub const POWERUP_BLINK_MS: f32 = 3000.0;
    pub const BONUS_LIFETIME_MS: f32 = 8000.0;
    pub const BONUS_BLINK_MS: f32 = 2000.0;

    /// Level timer and transitions
    pub const LEVEL_TIME_MS: f32 = 90_000.0;
    pub const HURRY_TIME_MS: f32 = 20_000.0;
    pub const HURRY_BANNER_MS: f32 = 2000.0;
    pub const STAGE_INTRO_MS: f32 = 2500.0;
    pub const LEVEL_TITLE_MS: f32 = 1500.0;
    pub const TIME_BONUS_PER_SECOND: u64 = 100;
    pub const TIME_BONUS_STEP_MS: f32 = 50.0;
    pub const LEVEL_COMPLETE_AUTO_ADVANCE_MS: f32 = 3000.0;
    /// Number of regular stages; the boss arena follows the last one
    pub const LAST_REGULAR_LEVEL: u32 = 10;
    pub const BOSS_LEVEL: u32 = LAST_REGULAR_LEVEL + 1;
}

/// Convert a frame-normalized delta into elapsed milliseconds
#[inline]
pub fn frames_to_ms(dt: f32) -> f32 {
    dt * consts::FRAME_TIME_MS
}

/// Horizontal sign helper that never returns zero
#[inline]
pub fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}
