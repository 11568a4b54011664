//! The final boss
//!
//! A floating two-phase demon. It cycles Idle -> (Moving | Attacking) -> Idle,
//! switches to a faster, angrier Phase 2 at half health and explodes for a
//! few seconds before it is gone for good.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Spawn, TickContext};
use super::physics::Body;
use super::snowball::BossProjectile;
use super::state::Events;
use crate::audio::Sound;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Phase1,
    /// Below half health; irreversible
    Phase2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    /// Descending into the arena
    Entering,
    Idle,
    Moving,
    Attacking,
    /// Invincible interlude between phases
    PhaseChange,
    /// Exploding
    Dying,
    Dead,
}

/// Action rolled at the end of an idle period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossAction {
    Move,
    Attack,
    /// Keep floating in place
    Idle,
    /// Eight-way barrage
    Special,
}

const ACTIONS: [BossAction; 4] = [
    BossAction::Move,
    BossAction::Attack,
    BossAction::Idle,
    BossAction::Special,
];
const PHASE1_WEIGHTS: [f32; 4] = [1.0, 1.0, 1.0, 0.0];
const PHASE2_WEIGHTS: [f32; 4] = [1.0, 2.0, 0.0, 1.0];

const FAN_SPEED: f32 = 2.0;
const BARRAGE_SPEED: f32 = 1.5;
const ARRIVE_DISTANCE: f32 = 5.0;
const EXPLOSION_INTERVAL_MS: f32 = 200.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub state: BossState,
    pub phase: BossPhase,
    pub speed: f32,
    pub attack_delay_ms: f32,
    pub attack_cooldown_ms: f32,
    /// Time spent in the current state
    pub state_ms: f32,
    pub invincible_ms: f32,
    pub target: Vec2,
    /// Accumulator for the death explosions
    pub explosion_ms: f32,
    /// Visual bobbing offset
    pub float_offset: f32,
    /// Set on the tick the boss reaches Dead, cleared by [`Boss::take_defeat`]
    defeat_pending: bool,
}

impl Boss {
    /// Boss starting at `(x, y)` (usually above the screen) and descending
    /// to the entry height
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, BOSS_SIZE, BOSS_SIZE),
            health: BOSS_MAX_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            state: BossState::Entering,
            phase: BossPhase::Phase1,
            speed: BOSS_BASE_SPEED,
            attack_delay_ms: BOSS_ATTACK_DELAY_MS,
            attack_cooldown_ms: 0.0,
            state_ms: 0.0,
            invincible_ms: 0.0,
            target: Vec2::new(x, BOSS_ENTRY_Y),
            explosion_ms: 0.0,
            float_offset: 0.0,
            defeat_pending: false,
        }
    }

    /// Boss entering from above the middle of the arena
    pub fn arena_entry() -> Self {
        Self::new(CANVAS_WIDTH / 2.0 - BOSS_SIZE / 2.0, -40.0)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0 || self.state == BossState::PhaseChange
    }

    /// Dangerous to touch
    pub fn is_hostile(&self) -> bool {
        !matches!(self.state, BossState::Dying | BossState::Dead)
    }

    pub fn health_ratio(&self) -> f32 {
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Returns true exactly once, on the first call after the boss died
    pub fn take_defeat(&mut self) -> bool {
        std::mem::take(&mut self.defeat_pending)
    }

    fn enter_state(&mut self, state: BossState) {
        self.state = state;
        self.state_ms = 0.0;
    }

    /// A snow shot landed. Returns true if it did damage.
    pub fn hit(&mut self, events: &mut Events) -> bool {
        if self.is_invincible()
            || matches!(
                self.state,
                BossState::Entering | BossState::Dying | BossState::Dead
            )
        {
            return false;
        }

        self.health -= 1;
        self.invincible_ms = BOSS_HIT_FLASH_MS;
        events.sound(Sound::BossHit);

        if self.health <= 0 {
            self.start_dying(events);
        } else if self.phase == BossPhase::Phase1 && self.health * 2 <= self.max_health {
            self.change_phase(events);
        }
        true
    }

    fn change_phase(&mut self, events: &mut Events) {
        self.phase = BossPhase::Phase2;
        self.enter_state(BossState::PhaseChange);
        self.invincible_ms = BOSS_PHASE_CHANGE_MS;
        self.speed = BOSS_BASE_SPEED * BOSS_PHASE2_SPEED_FACTOR;
        self.attack_delay_ms = BOSS_PHASE2_ATTACK_DELAY_MS;
        self.body.vel = Vec2::ZERO;
        events.sound(Sound::BossPhaseChange);
        log::info!("Boss enters phase 2 at {} health", self.health);
    }

    fn start_dying(&mut self, events: &mut Events) {
        self.enter_state(BossState::Dying);
        self.explosion_ms = 0.0;
        self.body.vel = Vec2::ZERO;
        events.sound(Sound::BossDying);
        log::info!("Boss defeated");
    }

    fn choose_action(&mut self, ctx: &mut TickContext<'_>) {
        let weights = match self.phase {
            BossPhase::Phase1 => &PHASE1_WEIGHTS,
            BossPhase::Phase2 => &PHASE2_WEIGHTS,
        };
        let action = ACTIONS[ctx.rng.weighted_index(weights)];
        self.perform(action, ctx);
    }

    fn perform(&mut self, action: BossAction, ctx: &mut TickContext<'_>) {
        match action {
            BossAction::Idle => self.state_ms = 0.0,
            BossAction::Move => {
                let x = ctx.rng.range(32.0, CANVAS_WIDTH - 32.0 - self.body.size.x);
                let y = ctx.rng.range(40.0, 100.0);
                self.target = Vec2::new(x, y);
                self.enter_state(BossState::Moving);
            }
            BossAction::Attack | BossAction::Special => {
                if self.attack_cooldown_ms > 0.0 {
                    self.state_ms = 0.0;
                    return;
                }
                self.enter_state(BossState::Attacking);
                if action == BossAction::Special {
                    self.attack_cooldown_ms = self.attack_delay_ms * 1.5;
                    self.fire_barrage(ctx);
                } else {
                    self.attack_cooldown_ms = self.attack_delay_ms;
                    self.fire_fan(ctx);
                }
                ctx.events.sound(Sound::BossAttack);
            }
        }
    }

    fn muzzle(&self) -> Vec2 {
        Vec2::new(self.body.pos.x + self.body.size.x / 2.0, self.body.bottom())
    }

    /// Forward fan aimed downward: 3 shots in Phase 1, 4 in Phase 2
    fn fire_fan(&mut self, ctx: &mut TickContext<'_>) {
        let angles: &[f32] = match self.phase {
            BossPhase::Phase1 => &[-30.0, 0.0, 30.0],
            BossPhase::Phase2 => &[-45.0, -15.0, 15.0, 45.0],
        };
        let origin = self.muzzle();
        for angle in angles {
            let dir = Vec2::from_angle((90.0 + angle).to_radians());
            ctx.spawns
                .push(Spawn::BossShot(BossProjectile::new(origin, dir * FAN_SPEED)));
        }
    }

    fn fire_barrage(&mut self, ctx: &mut TickContext<'_>) {
        let origin = self.muzzle();
        for i in 0..8 {
            let dir = Vec2::from_angle(std::f32::consts::TAU / 8.0 * i as f32);
            ctx.spawns
                .push(Spawn::BossShot(BossProjectile::new(origin, dir * BARRAGE_SPEED)));
        }
    }

    fn update_entering(&mut self, ctx: &mut TickContext<'_>) {
        self.body.pos.y += ctx.dt;
        if self.body.pos.y >= self.target.y {
            self.body.pos.y = self.target.y;
            self.enter_state(BossState::Idle);
            ctx.events.sound(Sound::BossAppear);
        }
    }

    fn update_moving(&mut self, ctx: &mut TickContext<'_>) {
        let delta = self.target - self.body.pos;
        let dist = delta.length();
        if dist > ARRIVE_DISTANCE {
            self.body.vel = delta / dist * self.speed;
            self.body.pos += self.body.vel * ctx.dt;
        } else {
            self.body.pos = self.target;
            self.body.vel = Vec2::ZERO;
            self.enter_state(BossState::Idle);
        }
    }

    fn update_dying(&mut self, ctx: &mut TickContext<'_>) {
        if self.state_ms >= BOSS_DYING_MS {
            self.enter_state(BossState::Dead);
            self.defeat_pending = true;
            ctx.events.explosion(self.body.center(), 24);
            return;
        }

        self.explosion_ms += ctx.elapsed_ms;
        while self.explosion_ms >= EXPLOSION_INTERVAL_MS {
            self.explosion_ms -= EXPLOSION_INTERVAL_MS;
            let x = self.body.pos.x + ctx.rng.range(0.0, self.body.size.x);
            let y = self.body.pos.y + ctx.rng.range(0.0, self.body.size.y);
            ctx.events.explosion(Vec2::new(x, y), 4);
        }
    }
}

impl Entity for Boss {
    fn body(&self) -> &Body {
        &self.body
    }

    fn is_active(&self) -> bool {
        self.state != BossState::Dead
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.state == BossState::Dead {
            return;
        }

        self.state_ms += ctx.elapsed_ms;
        if self.invincible_ms > 0.0 {
            self.invincible_ms = (self.invincible_ms - ctx.elapsed_ms).max(0.0);
        }
        if self.attack_cooldown_ms > 0.0 {
            self.attack_cooldown_ms = (self.attack_cooldown_ms - ctx.elapsed_ms).max(0.0);
        }
        self.float_offset = (self.state_ms * 0.003).sin() * 4.0;

        match self.state {
            BossState::Entering => self.update_entering(ctx),
            BossState::Idle => {
                if self.state_ms >= BOSS_IDLE_MS {
                    self.choose_action(ctx);
                }
            }
            BossState::Moving => self.update_moving(ctx),
            BossState::Attacking => {
                if self.state_ms >= BOSS_ATTACK_MS {
                    self.enter_state(BossState::Idle);
                }
            }
            BossState::PhaseChange => {
                if self.state_ms >= BOSS_PHASE_CHANGE_MS {
                    self.invincible_ms = 0.0;
                    self.enter_state(BossState::Idle);
                    ctx.events.sound(Sound::BossRage);
                }
            }
            BossState::Dying => self.update_dying(ctx),
            BossState::Dead => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SequenceRng;
    use crate::sim::state::GameEvent;

    struct Harness {
        rng: SequenceRng,
        events: Events,
        spawns: Vec<Spawn>,
    }

    impl Harness {
        fn new(rng: SequenceRng) -> Self {
            Self {
                rng,
                events: Events::default(),
                spawns: Vec::new(),
            }
        }

        fn step(&mut self, boss: &mut Boss, frames: usize) {
            for _ in 0..frames {
                let mut ctx = TickContext {
                    dt: 1.0,
                    elapsed_ms: FRAME_TIME_MS,
                    platforms: &[],
                    targets: &[],
                    rng: &mut self.rng,
                    events: &mut self.events,
                    spawns: &mut self.spawns,
                };
                boss.update(&mut ctx);
            }
        }
    }

    fn idle_boss() -> Boss {
        let mut boss = Boss::new(112.0, BOSS_ENTRY_Y);
        boss.state = BossState::Idle;
        boss
    }

    #[test]
    fn test_enters_from_above() {
        let mut boss = Boss::arena_entry();
        let mut h = Harness::new(SequenceRng::constant(0.1));
        // Immune while entering
        assert!(!boss.hit(&mut h.events));
        h.step(&mut boss, 99);
        assert_eq!(boss.state, BossState::Entering);
        h.step(&mut boss, 2);
        assert_eq!(boss.state, BossState::Idle);
        assert_eq!(boss.body.pos.y, BOSS_ENTRY_Y);
        assert!(h.events.sounds().any(|s| s == Sound::BossAppear));
    }

    #[test]
    fn test_hit_flash_blocks_damage() {
        let mut boss = idle_boss();
        let mut h = Harness::new(SequenceRng::constant(0.1));
        assert!(boss.hit(&mut h.events));
        assert_eq!(boss.health, 29);
        assert!(!boss.hit(&mut h.events));
        assert_eq!(boss.health, 29);
        // 200 ms flash is 12 frames
        h.step(&mut boss, 13);
        assert!(boss.hit(&mut h.events));
        assert_eq!(boss.health, 28);
    }

    #[test]
    fn test_phase_change_at_half_health() {
        let mut boss = idle_boss();
        let mut h = Harness::new(SequenceRng::constant(0.1));
        boss.health = 16;
        assert!(boss.hit(&mut h.events));
        assert_eq!(boss.health, 15);
        assert_eq!(boss.phase, BossPhase::Phase2);
        assert_eq!(boss.state, BossState::PhaseChange);
        assert!(boss.is_invincible());

        // Still invincible well after the normal hit flash
        h.step(&mut boss, 60);
        assert!(!boss.hit(&mut h.events));
        assert_eq!(boss.health, 15);

        h.step(&mut boss, 62);
        assert_eq!(boss.state, BossState::Idle);
        assert!(!boss.is_invincible());
        assert_eq!(boss.speed, BOSS_BASE_SPEED * 1.5);
        assert_eq!(boss.attack_delay_ms, 1500.0);
        assert!(h.events.sounds().any(|s| s == Sound::BossRage));

        // Never goes back
        boss.health = 30;
        boss.hit(&mut h.events);
        assert_eq!(boss.phase, BossPhase::Phase2);
        assert_eq!(boss.state, BossState::Idle);
    }

    #[test]
    fn test_phase1_attack_fires_three() {
        let mut boss = idle_boss();
        let mut h = Harness::new(SequenceRng::constant(0.5));
        boss.perform(BossAction::Attack, &mut TickContext {
            dt: 1.0,
            elapsed_ms: FRAME_TIME_MS,
            platforms: &[],
            targets: &[],
            rng: &mut h.rng,
            events: &mut h.events,
            spawns: &mut h.spawns,
        });
        assert_eq!(boss.state, BossState::Attacking);
        assert_eq!(h.spawns.len(), 3);
        assert_eq!(boss.attack_cooldown_ms, BOSS_ATTACK_DELAY_MS);
        // Middle shot goes straight down
        let Spawn::BossShot(mid) = &h.spawns[1] else {
            panic!("expected a boss shot");
        };
        assert!(mid.body.vel.x.abs() < 1e-5);
        assert!((mid.body.vel.y - FAN_SPEED).abs() < 1e-5);
    }

    #[test]
    fn test_phase2_fan_and_barrage() {
        let mut boss = idle_boss();
        boss.phase = BossPhase::Phase2;
        boss.attack_delay_ms = BOSS_PHASE2_ATTACK_DELAY_MS;
        let mut h = Harness::new(SequenceRng::constant(0.5));
        let mut ctx = TickContext {
            dt: 1.0,
            elapsed_ms: FRAME_TIME_MS,
            platforms: &[],
            targets: &[],
            rng: &mut h.rng,
            events: &mut h.events,
            spawns: &mut h.spawns,
        };
        boss.perform(BossAction::Attack, &mut ctx);
        assert_eq!(ctx.spawns.len(), 4);

        // On cooldown: stays idle, fires nothing
        boss.state = BossState::Idle;
        boss.perform(BossAction::Special, &mut ctx);
        assert_eq!(boss.state, BossState::Idle);
        assert_eq!(ctx.spawns.len(), 4);

        boss.attack_cooldown_ms = 0.0;
        boss.perform(BossAction::Special, &mut ctx);
        assert_eq!(ctx.spawns.len(), 12);
        assert_eq!(boss.attack_cooldown_ms, BOSS_PHASE2_ATTACK_DELAY_MS * 1.5);
    }

    #[test]
    fn test_idle_rolls_action_after_wait() {
        let mut boss = idle_boss();
        // 0.1 picks Move in phase 1, then target samples
        let mut h = Harness::new(SequenceRng::constant(0.1));
        h.step(&mut boss, 59);
        assert_eq!(boss.state, BossState::Idle);
        h.step(&mut boss, 2);
        assert_eq!(boss.state, BossState::Moving);
        assert_eq!(boss.target.y, 40.0 + 0.1 * 60.0);
    }

    #[test]
    fn test_moving_arrives_and_idles() {
        let mut boss = idle_boss();
        boss.target = Vec2::new(60.0, 80.0);
        boss.state = BossState::Moving;
        let mut h = Harness::new(SequenceRng::constant(0.99));
        h.step(&mut boss, 60);
        assert_eq!(boss.state, BossState::Idle);
        assert_eq!(boss.body.pos, Vec2::new(60.0, 80.0));
    }

    #[test]
    fn test_dying_then_dead_once() {
        let mut boss = idle_boss();
        let mut h = Harness::new(SequenceRng::constant(0.5));
        boss.health = 1;
        assert!(boss.hit(&mut h.events));
        assert_eq!(boss.state, BossState::Dying);
        assert!(!boss.hit(&mut h.events));

        h.step(&mut boss, 100);
        assert_eq!(boss.state, BossState::Dying);
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::Explosion { .. })));
        h.step(&mut boss, 90);
        assert_eq!(boss.state, BossState::Dead);
        assert!(!boss.is_active());
        assert!(boss.take_defeat());
        assert!(!boss.take_defeat());
    }

    #[test]
    fn test_health_ratio() {
        let mut boss = idle_boss();
        assert_eq!(boss.health_ratio(), 1.0);
        boss.health = 15;
        assert_eq!(boss.health_ratio(), 0.5);
        boss.health = -1;
        assert_eq!(boss.health_ratio(), 0.0);
    }
}
