//! Projectiles: rolling snowballs, snow shots and boss shots

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, TickContext};
use super::physics::{Body, Side, collide_with_platforms};
use crate::audio::Sound;
use crate::consts::*;

/// A frozen enemy kicked into motion.
///
/// Flattens every unfrozen demon in its path. Each new victim doubles the
/// payout, and an enemy already flattened by this ball never scores twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingSnowball {
    pub id: u32,
    pub body: Body,
    pub active: bool,
    /// Player credited with this ball's kills
    pub owner: u8,
    pub combo: u32,
    /// Enemy ids already flattened by this ball
    pub hit_ids: Vec<u32>,
    pub bounces: u32,
    pub age_ms: f32,
    /// Visual spin (radians)
    pub rotation: f32,
}

impl RollingSnowball {
    pub fn new(id: u32, owner: u8, x: f32, y: f32, direction: f32) -> Self {
        let mut body = Body::new(x, y, SNOWBALL_SIZE, SNOWBALL_SIZE);
        body.vel.x = direction.signum() * SNOWBALL_ROLL_SPEED;
        Self {
            id,
            body,
            active: true,
            owner,
            combo: 0,
            hit_ids: Vec::new(),
            bounces: 0,
            age_ms: 0.0,
            rotation: 0.0,
        }
    }

    /// Score for the `combo`-th victim: 500, 1000, 2000, 4000, ...
    pub fn combo_score(combo: u32) -> u64 {
        let shift = combo.saturating_sub(1).min(20);
        SNOWBALL_BASE_SCORE << shift
    }

    /// Register a victim. Returns the points earned, or `None` if this
    /// enemy was already flattened by this ball.
    pub fn hit_enemy(&mut self, enemy_id: u32) -> Option<u64> {
        if self.hit_ids.contains(&enemy_id) {
            return None;
        }
        self.hit_ids.push(enemy_id);
        self.combo += 1;
        Some(Self::combo_score(self.combo))
    }

    fn bounce(&mut self, rightward: bool, speed: f32, ctx: &mut TickContext<'_>) {
        let speed = speed * SNOWBALL_BOUNCE_DECAY;
        self.body.vel.x = if rightward { speed } else { -speed };
        self.bounces += 1;
        ctx.events.sound(Sound::Bounce);
    }
}

impl Entity for RollingSnowball {
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

        self.age_ms += ctx.elapsed_ms;
        if self.age_ms >= SNOWBALL_LIFETIME_MS {
            self.active = false;
            return;
        }

        self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, ctx.dt);
        self.body.integrate(ctx.dt);
        self.rotation += 0.3 * self.body.vel.x.signum() * ctx.dt;

        let speed = self.body.vel.x.abs();
        let contacts = collide_with_platforms(&mut self.body, ctx.platforms);
        self.body.grounded = contacts.grounded;
        match contacts.wall {
            // Hit a block's left face: roll back to the left
            Some(Side::Left) => self.bounce(false, speed, ctx),
            Some(Side::Right) => self.bounce(true, speed, ctx),
            _ => {}
        }

        let max_x = CANVAS_WIDTH - self.body.size.x;
        if self.body.pos.x <= 0.0 {
            self.body.pos.x = 0.0;
            self.bounce(true, speed, ctx);
        } else if self.body.pos.x >= max_x {
            self.body.pos.x = max_x;
            self.bounce(false, speed, ctx);
        }

        if self.body.bottom() >= FLOOR_Y {
            self.body.pos.y = FLOOR_Y - self.body.size.y;
            self.body.vel.y = 0.0;
            self.body.grounded = true;
        }

        if self.bounces >= SNOWBALL_MAX_BOUNCES {
            self.active = false;
        }
    }
}

/// Snow shot fired by a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowProjectile {
    pub body: Body,
    pub active: bool,
    pub owner: u8,
    pub direction: f32,
    pub speed: f32,
    pub range: f32,
    pub traveled: f32,
}

impl SnowProjectile {
    pub fn new(owner: u8, x: f32, y: f32, direction: f32, range: f32) -> Self {
        let direction = direction.signum();
        let mut body = Body::new(x, y, SNOW_SIZE, SNOW_SIZE);
        body.vel.x = direction * SNOW_SPEED;
        Self {
            body,
            active: true,
            owner,
            direction,
            speed: SNOW_SPEED,
            range,
            traveled: 0.0,
        }
    }
}

impl Entity for SnowProjectile {
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

        let step = self.speed * self.direction * ctx.dt;
        self.body.pos.x += step;
        self.traveled += step.abs();

        let x = self.body.pos.x;
        let w = self.body.size.x;
        if self.traveled >= self.range || x < -w || x > CANVAS_WIDTH + w {
            self.active = false;
        }
    }
}

/// Shot fired by the boss; flies in a straight line until it leaves the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossProjectile {
    pub body: Body,
    pub active: bool,
    pub age_ms: f32,
}

impl BossProjectile {
    pub fn new(center: Vec2, vel: Vec2) -> Self {
        let half = BOSS_PROJECTILE_SIZE / 2.0;
        let mut body = Body::new(
            center.x - half,
            center.y - half,
            BOSS_PROJECTILE_SIZE,
            BOSS_PROJECTILE_SIZE,
        );
        body.vel = vel;
        Self {
            body,
            active: true,
            age_ms: 0.0,
        }
    }
}

impl Entity for BossProjectile {
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

        self.body.pos += self.body.vel * ctx.dt;
        self.age_ms += ctx.elapsed_ms;

        let r = self.body.rect();
        if r.x < -r.w || r.x > CANVAS_WIDTH + r.w || r.y < -r.h || r.y > CANVAS_HEIGHT + r.h {
            self.active = false;
        }
    }
}
