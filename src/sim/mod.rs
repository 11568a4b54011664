//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-normalized timestep, clamped after stalls
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod coverage;
pub mod enemy;
pub mod entity;
pub mod interactions;
pub mod physics;
pub mod pickup;
pub mod player;
pub mod rng;
pub mod snowball;
pub mod state;
pub mod tick;

pub use boss::{Boss, BossPhase, BossState};
pub use coverage::{Coverage, SnowCoverage};
pub use enemy::{Enemy, EnemyKind, PumpkinHead};
pub use entity::{Entity, Spawn, TickContext};
pub use physics::{Body, EdgeMode, Platform, PlatformKind, Rect};
pub use pickup::{BonusKind, Pickup, PickupKind, PowerUpKind};
pub use player::{LifeState, Player};
pub use rng::{RandomSource, SequenceRng, SimRng};
pub use snowball::{BossProjectile, RollingSnowball, SnowProjectile};
pub use state::{
    CompleteStage, Events, GameEvent, GameOverChoice, GamePhase, LevelComplete, World,
};
pub use tick::Session;
