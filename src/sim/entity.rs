//! Common entity capability set
//!
//! Every simulated object embeds a [`Body`] by value and exposes it through
//! [`Entity`]. Per-tick behavior goes through [`Entity::update`] with a
//! shared [`TickContext`]; anything an entity wants to add to the world is
//! pushed as a [`Spawn`] and merged by the session before collisions run.

use glam::Vec2;

use super::physics::{Body, Platform, Rect};
use super::rng::RandomSource;
use super::snowball::{BossProjectile, SnowProjectile};
use super::state::Events;

/// Per-tick environment handed to every entity update
pub struct TickContext<'a> {
    /// Frame-normalized delta (1.0 = one 60 Hz frame)
    pub dt: f32,
    /// Same delta in milliseconds
    pub elapsed_ms: f32,
    pub platforms: &'a [Platform],
    /// Centers of players that can currently be targeted
    pub targets: &'a [Vec2],
    pub rng: &'a mut dyn RandomSource,
    pub events: &'a mut Events,
    pub spawns: &'a mut Vec<Spawn>,
}

/// New objects produced during the update pass
#[derive(Debug, Clone)]
pub enum Spawn {
    Snow(SnowProjectile),
    BossShot(BossProjectile),
}

/// Capability set shared by players, enemies, the boss, projectiles and pickups
pub trait Entity {
    fn body(&self) -> &Body;

    /// False once the entity should be swept from its collection
    fn is_active(&self) -> bool;

    fn update(&mut self, ctx: &mut TickContext<'_>);

    #[inline]
    fn bounds(&self) -> Rect {
        self.body().rect()
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.body().pos
    }

    #[inline]
    fn center(&self) -> Vec2 {
        self.body().center()
    }

    /// Strict AABB overlap between two active entities
    fn touches(&self, other: &dyn Entity) -> bool {
        self.is_active() && other.is_active() && self.bounds().overlaps(&other.bounds())
    }
}
