//! Demons and the Pumpkin Head
//!
//! Red and blue demons patrol platforms and can be buried in snow. Pumpkin
//! Head appears when the level clock runs out, chases players and cannot be
//! hurt.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::coverage::{Coverage, SnowCoverage};
use super::entity::{Entity, TickContext};
use super::physics::{Body, EdgeMode, check_screen_bounds, collide_with_platforms};
use super::rng::RandomSource;
use super::snowball::RollingSnowball;
use crate::audio::Sound;
use crate::consts::*;
use crate::sign_or_one;

/// Demon variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    RedDemon,
    /// Faster, and hops at random
    BlueDemon,
}

impl EnemyKind {
    pub fn base_speed(self) -> f32 {
        match self {
            EnemyKind::RedDemon => ENEMY_SPEED,
            EnemyKind::BlueDemon => ENEMY_SPEED * BLUE_DEMON_SPEED_FACTOR,
        }
    }

    pub fn jump_chance(self) -> f32 {
        match self {
            EnemyKind::RedDemon => 0.0,
            EnemyKind::BlueDemon => BLUE_DEMON_JUMP_CHANCE,
        }
    }
}

/// Patrol decision rolled every few seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Turn,
    Pause,
}

const DECISION_WEIGHTS: [f32; 3] = [0.6, 0.3, 0.1];

/// Patrol AI timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolAi {
    pub decision_ms: f32,
    pub interval_ms: f32,
    /// Remaining standstill from a Pause decision
    pub pause_ms: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub alive: bool,
    pub facing: f32,
    pub coverage: SnowCoverage,
    pub ai: PatrolAi,
    /// Accumulator for the frozen shake
    pub jitter_ms: f32,
}

impl Enemy {
    pub fn new(
        id: u32,
        kind: EnemyKind,
        x: f32,
        y: f32,
        coverage: SnowCoverage,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            id,
            kind,
            body: Body::new(x, y, ENEMY_WIDTH, ENEMY_HEIGHT),
            alive: true,
            facing: rng.sign(),
            coverage,
            ai: PatrolAi {
                decision_ms: 0.0,
                interval_ms: rng.range(1000.0, 3000.0),
                pause_ms: 0.0,
            },
            jitter_ms: 0.0,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.coverage.is_frozen()
    }

    pub fn state(&self) -> Coverage {
        self.coverage.state()
    }

    /// Current patrol speed; partial snow slows the demon down
    pub fn speed(&self) -> f32 {
        self.kind.base_speed() * (1.0 - self.coverage.state().percent() * 0.7)
    }

    /// A snow shot landed. Returns true if this hit finished the snowball.
    pub fn hit_by_snow(&mut self) -> bool {
        if !self.alive || self.is_frozen() {
            return false;
        }
        let frozen = self.coverage.apply_hit();
        if frozen {
            self.body.vel = Vec2::ZERO;
        }
        frozen
    }

    /// Flattened by a rolling snowball. Returns the combo points, or `None`
    /// if the enemy was already dead or already counted by this ball.
    pub fn hit_by_snowball(&mut self, ball: &mut RollingSnowball) -> Option<u64> {
        if !self.alive {
            return None;
        }
        let points = ball.hit_enemy(self.id)?;
        self.alive = false;
        Some(points)
    }

    fn decide(&mut self, decision: Decision, ctx: &mut TickContext<'_>) {
        match decision {
            Decision::Continue => {}
            Decision::Turn => self.facing = -self.facing,
            Decision::Pause => self.ai.pause_ms = ctx.rng.range(500.0, 1500.0),
        }
    }

    fn update_frozen(&mut self, ctx: &mut TickContext<'_>) {
        if self.coverage.tick(ctx.elapsed_ms) {
            ctx.events.sound(Sound::Release);
            log::debug!("Enemy {} broke free", self.id);
            return;
        }

        self.jitter_ms += ctx.elapsed_ms;
        if self.jitter_ms > 100.0 {
            self.body.pos.x += ctx.rng.range(-0.5, 0.5);
            self.jitter_ms = 0.0;
        }
    }

    fn update_ai(&mut self, ctx: &mut TickContext<'_>) {
        if self.ai.pause_ms > 0.0 {
            self.ai.pause_ms = (self.ai.pause_ms - ctx.elapsed_ms).max(0.0);
        }

        self.ai.decision_ms += ctx.elapsed_ms;
        if self.ai.decision_ms >= self.ai.interval_ms {
            self.ai.decision_ms = 0.0;
            self.ai.interval_ms = ctx.rng.range(1000.0, 3000.0);
            let decision = match ctx.rng.weighted_index(&DECISION_WEIGHTS) {
                1 => Decision::Turn,
                2 => Decision::Pause,
                _ => Decision::Continue,
            };
            self.decide(decision, ctx);
        }

        self.body.vel.x = if self.ai.pause_ms > 0.0 {
            0.0
        } else {
            self.facing * self.speed()
        };

        let jump_chance = self.kind.jump_chance();
        if jump_chance > 0.0 && self.body.grounded && ctx.rng.chance(jump_chance) {
            self.body.vel.y = PLAYER_JUMP_FORCE * ENEMY_JUMP_FACTOR;
            self.body.grounded = false;
            ctx.events.sound(Sound::EnemyJump);
        }
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_active(&self) -> bool {
        self.alive
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if !self.alive {
            return;
        }

        if self.is_frozen() {
            self.update_frozen(ctx);
            return;
        }

        // Partial snow melts off quietly; only a full break-out plays a cue
        self.coverage.tick(ctx.elapsed_ms);
        self.update_ai(ctx);

        self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, ctx.dt);
        self.body.integrate(ctx.dt);

        let contacts = collide_with_platforms(&mut self.body, ctx.platforms);
        if contacts.wall.is_some() {
            self.facing = -self.facing;
            self.body.vel.x = self.facing * self.speed();
        }
        let on_floor = check_screen_bounds(&mut self.body, EdgeMode::Wrap);
        self.body.grounded = contacts.grounded || on_floor;
    }
}

/// Invincible chaser released when the level clock hits zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpkinHead {
    pub body: Body,
    pub facing: f32,
    pub active: bool,
}

impl PumpkinHead {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, PUMPKIN_SIZE, PUMPKIN_SIZE),
            facing: 1.0,
            active: true,
        }
    }

    /// Spawn position on the half of the screen away from `avoid_x`
    pub fn spawn_x(avoid_x: f32) -> f32 {
        if avoid_x < CANVAS_WIDTH / 2.0 {
            CANVAS_WIDTH * 0.75 - PUMPKIN_SIZE / 2.0
        } else {
            CANVAS_WIDTH * 0.25 - PUMPKIN_SIZE / 2.0
        }
    }

    fn nearest_target(&self, targets: &[Vec2]) -> Option<Vec2> {
        let center = self.body.center();
        targets.iter().copied().min_by(|a, b| {
            a.distance_squared(center)
                .partial_cmp(&b.distance_squared(center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

impl Entity for PumpkinHead {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if !self.active {
            return;
        }

        let center = self.body.center();
        match self.nearest_target(ctx.targets) {
            Some(target) => {
                let dx = target.x - center.x;
                if dx.abs() > PUMPKIN_DEADZONE {
                    self.facing = sign_or_one(dx);
                    self.body.vel.x = self.facing * PUMPKIN_SPEED;
                } else {
                    self.body.vel.x = 0.0;
                }

                if target.y < center.y && self.body.grounded && ctx.rng.chance(PUMPKIN_JUMP_CHANCE) {
                    self.body.vel.y = PLAYER_JUMP_FORCE;
                    self.body.grounded = false;
                }
            }
            None => self.body.vel.x = 0.0,
        }

        self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, ctx.dt);
        self.body.integrate(ctx.dt);
        let contacts = collide_with_platforms(&mut self.body, ctx.platforms);
        let on_floor = check_screen_bounds(&mut self.body, EdgeMode::Wrap);
        self.body.grounded = contacts.grounded || on_floor;
    }
}
