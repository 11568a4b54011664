//! Power-up potions and point bonuses
//!
//! Both are transient: they drop into the arena, sit for a while, blink as a
//! warning and vanish if nobody collects them.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, TickContext};
use super::physics::{Body, EdgeMode, PlatformKind, check_screen_bounds};
use crate::consts::*;

/// Power-up types (each maps to one timed player effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Red potion: faster movement
    Speed,
    /// Blue potion: longer snow shots
    Range,
    /// Yellow potion: shorter shot cooldown
    FireRate,
    /// Green potion: repeated mid-air jumps
    Fly,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Range,
        PowerUpKind::FireRate,
        PowerUpKind::Fly,
    ];
}

/// Point bonus types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Coin,
    Sushi,
    Cake,
    Diamond,
}

impl BonusKind {
    pub fn value(self) -> u64 {
        match self {
            BonusKind::Coin => 100,
            BonusKind::Sushi => 500,
            BonusKind::Cake => 1000,
            BonusKind::Diamond => 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    PowerUp(PowerUpKind),
    Bonus(BonusKind),
}

/// A collectible lying in (or falling into) the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub body: Body,
    pub active: bool,
    /// Time alive so far
    pub age_ms: f32,
    pub lifetime_ms: f32,
    /// Length of the blink warning before expiry
    pub blink_ms: f32,
}

impl Pickup {
    /// Potion dropped at `(x, y)`: drifts down at half gravity
    pub fn power_up(id: u32, x: f32, y: f32, kind: PowerUpKind) -> Self {
        Self {
            id,
            kind: PickupKind::PowerUp(kind),
            body: Body::new(x, y, 10.0, 12.0),
            active: true,
            age_ms: 0.0,
            lifetime_ms: POWERUP_LIFETIME_MS,
            blink_ms: POWERUP_BLINK_MS,
        }
    }

    /// Bonus popping out at `(x, y)` with horizontal drift `vx`
    pub fn bonus(id: u32, x: f32, y: f32, kind: BonusKind, vx: f32) -> Self {
        let mut body = Body::new(x, y, 8.0, 8.0);
        body.vel.x = vx;
        body.vel.y = -3.0;
        Self {
            id,
            kind: PickupKind::Bonus(kind),
            body,
            active: true,
            age_ms: 0.0,
            lifetime_ms: BONUS_LIFETIME_MS,
            blink_ms: BONUS_BLINK_MS,
        }
    }

    /// True during the expiry warning window
    pub fn is_blinking(&self) -> bool {
        self.active && self.age_ms >= self.lifetime_ms - self.blink_ms
    }

    /// Claim the pickup. Returns `None` if it was already taken or expired.
    pub fn collect(&mut self) -> Option<PickupKind> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.kind)
    }

    fn fall(&mut self, ctx: &TickContext<'_>) {
        let dt = ctx.dt;
        match self.kind {
            PickupKind::PowerUp(_) => {
                self.body.apply_gravity(GRAVITY * 0.5, POWERUP_FALL_SPEED, dt);
                self.body.vel.x = 0.0;
            }
            PickupKind::Bonus(_) => {
                self.body.apply_gravity(GRAVITY, MAX_FALL_SPEED, dt);
                self.body.vel.x *= 0.98;
            }
        }
        self.body.integrate(dt);
    }

    /// Land on any platform top; pickups never collide with platform sides
    fn land(&mut self, ctx: &TickContext<'_>) {
        if self.body.vel.y < 0.0 {
            return;
        }
        let r = self.body.rect();
        let prev_bottom = self.body.prev_y + r.h;
        for platform in ctx.platforms {
            let p = &platform.rect;
            let over = r.right() > p.x && r.x < p.right();
            let crossed = match platform.kind {
                PlatformKind::Passthrough => prev_bottom <= p.y && r.bottom() >= p.y,
                PlatformKind::Solid => r.bottom() >= p.y && prev_bottom <= p.y + 1.0,
            };
            if over && crossed {
                self.body.pos.y = p.y - r.h;
                self.body.vel.y = 0.0;
                self.body.grounded = true;
                return;
            }
        }
    }
}

impl Entity for Pickup {
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
        if self.age_ms >= self.lifetime_ms {
            self.active = false;
            return;
        }

        if self.body.grounded && self.body.vel.x.abs() < STOP_EPSILON {
            self.body.vel.x = 0.0;
            return;
        }

        self.body.grounded = false;
        let vx = self.body.vel.x;
        self.fall(ctx);
        self.land(ctx);

        if check_screen_bounds(&mut self.body, EdgeMode::Clamp) {
            self.body.grounded = true;
        }
        // Bonuses bounce off the side walls at half speed
        if (self.body.pos.x <= 0.0 && vx < 0.0)
            || (self.body.pos.x + self.body.size.x >= CANVAS_WIDTH && vx > 0.0)
        {
            self.body.vel.x = -vx * 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Spawn;
    use crate::sim::physics::Platform;
    use crate::sim::rng::SequenceRng;
    use crate::sim::state::Events;

    fn step(pickup: &mut Pickup, platforms: &[Platform], frames: usize) {
        let mut rng = SequenceRng::constant(0.5);
        let mut events = Events::default();
        let mut spawns: Vec<Spawn> = Vec::new();
        for _ in 0..frames {
            let mut ctx = TickContext {
                dt: 1.0,
                elapsed_ms: FRAME_TIME_MS,
                platforms,
                targets: &[],
                rng: &mut rng,
                events: &mut events,
                spawns: &mut spawns,
            };
            pickup.update(&mut ctx);
        }
    }

    #[test]
    fn test_bonus_values() {
        assert_eq!(BonusKind::Coin.value(), 100);
        assert_eq!(BonusKind::Sushi.value(), 500);
        assert_eq!(BonusKind::Cake.value(), 1000);
        assert_eq!(BonusKind::Diamond.value(), 5000);
    }

    #[test]
    fn test_power_up_falls_slowly_and_lands() {
        let platforms = vec![Platform::passthrough(0.0, 120.0, 64.0, 8.0)];
        let mut p = Pickup::power_up(1, 20.0, 60.0, PowerUpKind::Speed);
        step(&mut p, &platforms, 10);
        assert!(p.body.vel.y <= POWERUP_FALL_SPEED);
        step(&mut p, &platforms, 200);
        assert!(p.body.grounded);
        assert_eq!(p.body.pos.y, 120.0 - 12.0);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let mut p = Pickup::bonus(1, 20.0, 60.0, BonusKind::Cake, 0.0);
        assert_eq!(p.collect(), Some(PickupKind::Bonus(BonusKind::Cake)));
        assert_eq!(p.collect(), None);
    }

    #[test]
    fn test_blink_then_expire() {
        let mut p = Pickup::bonus(1, 20.0, 60.0, BonusKind::Coin, 0.5);
        let frames_to_blink = ((BONUS_LIFETIME_MS - BONUS_BLINK_MS) / FRAME_TIME_MS) as usize + 2;
        step(&mut p, &[], frames_to_blink);
        assert!(p.is_blinking());
        assert!(p.active);
        step(&mut p, &[], (BONUS_BLINK_MS / FRAME_TIME_MS) as usize + 1);
        assert!(!p.active);
    }

    #[test]
    fn test_bonus_bounces_off_wall() {
        let mut p = Pickup::bonus(1, 1.0, 100.0, BonusKind::Coin, -1.0);
        step(&mut p, &[], 2);
        assert_eq!(p.body.pos.x, 0.0);
        assert!(p.body.vel.x > 0.0);
    }
}
