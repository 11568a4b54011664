//! Player characters (Nick and Tom)
//!
//! A player is created once per session and never removed: losing a life
//! only changes its [`LifeState`]. Lives, score and power-ups carry over
//! from level to level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Spawn, TickContext};
use super::physics::{Body, EdgeMode, check_screen_bounds, collide_with_platforms};
use super::pickup::PowerUpKind;
use super::snowball::SnowProjectile;
use super::state::Events;
use crate::audio::Sound;
use crate::consts::*;
use crate::input::PlayerInput;

/// Mutually exclusive life-cycle states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    /// Scripted entrance; input and physics suspended
    Spawning { remaining_ms: f32 },
    Alive,
    /// Scripted death fall after the last life is lost
    Dying { remaining_ms: f32 },
    /// Out of lives, waiting for Continue
    Out,
}

/// One timed power-up effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSlot {
    pub active: bool,
    pub remaining_ms: f32,
}

impl PowerUpSlot {
    fn tick(&mut self, elapsed_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ms -= elapsed_ms;
        if self.remaining_ms <= 0.0 {
            self.active = false;
            self.remaining_ms = 0.0;
            return true;
        }
        false
    }
}

/// The four independent power-up effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUps {
    pub speed: PowerUpSlot,
    pub range: PowerUpSlot,
    pub fire_rate: PowerUpSlot,
    pub fly: PowerUpSlot,
}

impl PowerUps {
    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut PowerUpSlot {
        match kind {
            PowerUpKind::Speed => &mut self.speed,
            PowerUpKind::Range => &mut self.range,
            PowerUpKind::FireRate => &mut self.fire_rate,
            PowerUpKind::Fly => &mut self.fly,
        }
    }

    pub fn slot(&self, kind: PowerUpKind) -> &PowerUpSlot {
        match kind {
            PowerUpKind::Speed => &self.speed,
            PowerUpKind::Range => &self.range,
            PowerUpKind::FireRate => &self.fire_rate,
            PowerUpKind::Fly => &self.fly,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.slot(kind).active
    }

    /// Activate an effect. Re-applying refreshes the timer; nothing stacks.
    pub fn apply(&mut self, kind: PowerUpKind, duration_ms: f32) {
        let slot = self.slot_mut(kind);
        slot.active = true;
        slot.remaining_ms = duration_ms;
    }

    /// Count every active effect down; returns how many expired this tick
    pub fn tick(&mut self, elapsed_ms: f32) -> usize {
        PowerUpKind::ALL
            .iter()
            .filter(|kind| self.slot_mut(**kind).tick(elapsed_ms))
            .count()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// 1 or 2
    pub num: u8,
    pub body: Body,
    pub lives: u8,
    pub score: u64,
    pub life: LifeState,
    /// -1.0 (left) or 1.0 (right)
    pub facing: f32,
    pub invincible_ms: f32,
    pub powerups: PowerUps,
    pub shoot_cooldown_ms: f32,
    /// Controls latched for the next update
    #[serde(skip)]
    pub input: PlayerInput,
}

impl Player {
    pub fn new(num: u8, x: f32, y: f32, lives: u8) -> Self {
        let mut player = Self {
            num,
            body: Body::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT),
            lives,
            score: 0,
            life: LifeState::Out,
            facing: if num == 2 { -1.0 } else { 1.0 },
            invincible_ms: 0.0,
            powerups: PowerUps::default(),
            shoot_cooldown_ms: 0.0,
            input: PlayerInput::default(),
        };
        player.respawn(x, y);
        player
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.life, LifeState::Dying { .. })
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self.life, LifeState::Spawning { .. })
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0
    }

    /// Can take part in collisions (touch enemies, push snowballs, collect)
    pub fn can_interact(&self) -> bool {
        self.is_alive()
    }

    /// Still in the game: has lives left or is mid-way through losing the last one
    pub fn in_play(&self) -> bool {
        self.lives > 0 || self.is_dying()
    }

    pub fn max_speed(&self) -> f32 {
        if self.powerups.speed.active {
            PLAYER_SPEED * SPEED_BOOST
        } else {
            PLAYER_SPEED
        }
    }

    pub fn shoot_delay_ms(&self) -> f32 {
        if self.powerups.fire_rate.active {
            SHOOT_DELAY_MS * FIRE_RATE_FACTOR
        } else {
            SHOOT_DELAY_MS
        }
    }

    pub fn snow_range(&self) -> f32 {
        if self.powerups.range.active {
            SNOW_RANGE * RANGE_BOOST
        } else {
            SNOW_RANGE
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn apply_power_up(&mut self, kind: PowerUpKind, duration_ms: f32) {
        self.powerups.apply(kind, duration_ms);
    }

    /// Take a hit. Returns true if a life was actually lost.
    ///
    /// Ignored while invincible or not alive, so repeated contact during the
    /// invincibility window costs exactly one life.
    pub fn hit(&mut self) -> bool {
        if self.is_invincible() || !self.is_alive() {
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        self.body.vel.y = PLAYER_JUMP_FORCE * 0.5;
        self.body.vel.x = -self.facing * 2.0;
        self.body.grounded = false;

        if self.lives == 0 {
            self.life = LifeState::Dying {
                remaining_ms: DEATH_ANIM_MS,
            };
        } else {
            self.invincible_ms = INVINCIBILITY_MS;
        }
        true
    }

    /// Reset at a spawn point and replay the entrance
    pub fn respawn(&mut self, x: f32, y: f32) {
        self.body.pos = Vec2::new(x, y);
        self.body.prev_y = y;
        self.body.vel = Vec2::ZERO;
        self.body.grounded = false;
        self.body.passing_through = false;
        self.life = LifeState::Spawning {
            remaining_ms: SPAWN_ANIM_MS,
        };
        self.invincible_ms = INVINCIBILITY_MS;
        self.shoot_cooldown_ms = 0.0;
    }

    fn tick_timers(&mut self, elapsed_ms: f32) {
        if self.invincible_ms > 0.0 {
            self.invincible_ms = (self.invincible_ms - elapsed_ms).max(0.0);
        }
        if self.shoot_cooldown_ms > 0.0 {
            self.shoot_cooldown_ms = (self.shoot_cooldown_ms - elapsed_ms).max(0.0);
        }
        self.powerups.tick(elapsed_ms);
    }

    fn handle_movement(&mut self, input: &PlayerInput, dt: f32) {
        let speed = self.max_speed();
        if input.left {
            self.body.vel.x -= speed * PLAYER_ACCEL_FACTOR * dt;
            self.facing = -1.0;
        }
        if input.right {
            self.body.vel.x += speed * PLAYER_ACCEL_FACTOR * dt;
            self.facing = 1.0;
        }
        self.body.vel.x = self.body.vel.x.clamp(-speed, speed);

        if !input.left && !input.right {
            self.body.vel.x *= FRICTION;
            if self.body.vel.x.abs() < STOP_EPSILON {
                self.body.vel.x = 0.0;
            }
        }
    }

    fn handle_jump(&mut self, input: &PlayerInput, events: &mut Events) {
        if input.jump {
            if self.powerups.fly.active {
                self.body.vel.y = PLAYER_JUMP_FORCE * FLY_JUMP_FACTOR;
                self.body.grounded = false;
                events.sound(Sound::Jump);
            } else if self.body.grounded {
                self.body.vel.y = PLAYER_JUMP_FORCE;
                self.body.grounded = false;
                events.sound(Sound::Jump);
            }
        }

        if input.up && self.body.vel.y < 0.0 {
            self.body.passing_through = true;
        }
    }

    fn handle_shoot(&mut self, input: &PlayerInput, ctx: &mut TickContext<'_>) {
        if !input.wants_shot() || self.shoot_cooldown_ms > 0.0 {
            return;
        }

        let x = if self.facing > 0.0 {
            self.body.pos.x + self.body.size.x
        } else {
            self.body.pos.x - SNOW_SIZE
        };
        let y = self.body.pos.y + 4.0;
        ctx.spawns.push(Spawn::Snow(SnowProjectile::new(
            self.num,
            x,
            y,
            self.facing,
            self.snow_range(),
        )));
        self.shoot_cooldown_ms = self.shoot_delay_ms();
        ctx.events.sound(Sound::Shoot);
    }

    fn update_dying(&mut self, ctx: &mut TickContext<'_>, remaining_ms: f32) {
        // Knockback arc with gravity, no collisions
        self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, ctx.dt);
        self.body.integrate(ctx.dt);

        let remaining_ms = remaining_ms - ctx.elapsed_ms;
        if remaining_ms <= 0.0 {
            self.life = LifeState::Out;
            self.body.vel = Vec2::ZERO;
            self.powerups.clear();
            log::debug!("Player {} is out", self.num);
        } else {
            self.life = LifeState::Dying { remaining_ms };
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    /// Players are never swept
    fn is_active(&self) -> bool {
        true
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        match self.life {
            LifeState::Out => {}
            LifeState::Dying { remaining_ms } => self.update_dying(ctx, remaining_ms),
            LifeState::Spawning { remaining_ms } => {
                self.tick_timers(ctx.elapsed_ms);
                let remaining_ms = remaining_ms - ctx.elapsed_ms;
                self.life = if remaining_ms <= 0.0 {
                    LifeState::Alive
                } else {
                    LifeState::Spawning { remaining_ms }
                };
            }
            LifeState::Alive => {
                let input = self.input;
                self.tick_timers(ctx.elapsed_ms);
                self.handle_movement(&input, ctx.dt);
                self.handle_jump(&input, ctx.events);
                self.handle_shoot(&input, ctx);

                self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, ctx.dt);
                self.body.integrate(ctx.dt);

                let contacts = collide_with_platforms(&mut self.body, ctx.platforms);
                let on_floor = check_screen_bounds(&mut self.body, EdgeMode::Wrap);
                self.body.grounded = contacts.grounded || on_floor;
            }
        }
    }
}
