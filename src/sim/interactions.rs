//! Collision consequences between entity groups
//!
//! Runs once per tick after every entity has moved. Pairs are tested with a
//! strict AABB overlap; consequences only mark entities inactive, and the
//! session sweeps them afterwards.

use glam::Vec2;

use super::entity::Entity;
use super::pickup::{PickupKind, PowerUpKind};
use super::player::Player;
use super::rng::RandomSource;
use super::snowball::RollingSnowball;
use super::state::{Events, World};
use crate::audio::Sound;
use crate::consts::*;
use crate::settings::Settings;

/// Apply every interaction for this tick, in a fixed order
pub fn resolve(world: &mut World, rng: &mut dyn RandomSource, settings: &Settings) {
    snow_vs_enemies(world);
    snow_vs_boss(world);
    snowballs_vs_enemies(world, rng, settings);
    players_vs_enemies(world);
    players_vs_pumpkin(world);
    players_vs_boss(world);
    players_vs_pickups(world, settings);
}

/// Hit a player and report the outcome. Returns true if a life was lost.
fn damage_player(player: &mut Player, events: &mut Events) -> bool {
    if !player.hit() {
        return false;
    }
    if player.lives == 0 {
        events.sound(Sound::Death);
        log::info!("Player {} lost their last life", player.num);
    } else {
        events.sound(Sound::Hurt);
        log::debug!("Player {} hit, {} lives left", player.num, player.lives);
    }
    true
}

/// Each snow shot coats at most one demon, then melts
fn snow_vs_enemies(world: &mut World) {
    let World {
        projectiles,
        enemies,
        events,
        ..
    } = world;

    for shot in projectiles.iter_mut().filter(|p| p.active) {
        for enemy in enemies.iter_mut() {
            if !enemy.alive || enemy.is_frozen() || !shot.touches(&*enemy) {
                continue;
            }
            shot.active = false;
            if enemy.hit_by_snow() {
                events.sound(Sound::Freeze);
                log::debug!("Enemy {} frozen", enemy.id);
            } else {
                events.sound(Sound::Hit);
            }
            break;
        }
    }
}

/// Snow shots chip the boss; the shot is used up even while the boss shrugs it off
fn snow_vs_boss(world: &mut World) {
    let World {
        projectiles,
        boss,
        events,
        ..
    } = world;
    let Some(boss) = boss.as_mut() else {
        return;
    };
    if boss.health <= 0 {
        return;
    }

    for shot in projectiles.iter_mut().filter(|p| p.active) {
        if shot.bounds().overlaps(&boss.bounds()) {
            shot.active = false;
            boss.hit(events);
        }
    }
}

/// Kill credited after a rolling snowball pass
struct Kill {
    owner: u8,
    points: u64,
    center: Vec2,
    top: f32,
}

fn snowballs_vs_enemies(world: &mut World, rng: &mut dyn RandomSource, settings: &Settings) {
    let mut kills = Vec::new();
    for ball in world.snowballs.iter_mut().filter(|b| b.active) {
        for enemy in world.enemies.iter_mut() {
            if !enemy.alive || enemy.is_frozen() || !ball.bounds().overlaps(&enemy.bounds()) {
                continue;
            }
            if let Some(points) = enemy.hit_by_snowball(ball) {
                kills.push(Kill {
                    owner: ball.owner,
                    points,
                    center: enemy.center(),
                    top: enemy.body.pos.y,
                });
            }
        }
    }

    for kill in kills {
        world.add_score(kill.owner, kill.points);
        world.events.sound(Sound::Kill);
        world.events.sound(Sound::EnemyDeath);
        world.events.explosion(kill.center, 8);
        world.events.score_popup(kill.center, kill.points);
        log::debug!("Snowball kill for player {}: {} points", kill.owner, kill.points);

        if rng.chance(settings.powerup_drop_chance) {
            let kind = PowerUpKind::ALL[rng.range_int(0, PowerUpKind::ALL.len() as i32 - 1) as usize];
            world.spawn_power_up(kill.center.x - 5.0, kill.top, kind);
        }
    }
}

/// Players kick frozen demons and get hurt by live ones
fn players_vs_enemies(world: &mut World) {
    let mut pushes = Vec::new();
    {
        let World {
            players,
            enemies,
            events,
            ..
        } = world;

        for player in players.iter_mut().filter(|p| p.can_interact()) {
            for enemy in enemies.iter_mut() {
                if !enemy.alive || !player.bounds().overlaps(&enemy.bounds()) {
                    continue;
                }
                if enemy.is_frozen() {
                    // The frozen demon becomes the ball
                    enemy.alive = false;
                    let pos = Vec2::new(
                        enemy.body.center().x - SNOWBALL_SIZE / 2.0,
                        enemy.body.bottom() - SNOWBALL_SIZE,
                    );
                    pushes.push((player.num, player.facing, pos, enemy.center()));
                    player.add_score(PUSH_SCORE);
                    events.sound(Sound::Push);
                } else if damage_player(player, events) {
                    break;
                }
            }
        }
    }

    for (owner, facing, pos, center) in pushes {
        let id = world.next_entity_id();
        world
            .snowballs
            .push(RollingSnowball::new(id, owner, pos.x, pos.y, facing));
        world.events.score_popup(center, PUSH_SCORE);
    }
}

fn players_vs_pumpkin(world: &mut World) {
    let World {
        players,
        pumpkin,
        events,
        ..
    } = world;
    let Some(pumpkin) = pumpkin.as_ref().filter(|p| p.active) else {
        return;
    };

    for player in players.iter_mut().filter(|p| p.can_interact()) {
        if player.bounds().overlaps(&pumpkin.bounds()) {
            damage_player(player, events);
        }
    }
}

/// Boss shots and body contact
fn players_vs_boss(world: &mut World) {
    let World {
        players,
        boss,
        boss_projectiles,
        events,
        ..
    } = world;

    for shot in boss_projectiles.iter_mut().filter(|p| p.active) {
        for player in players.iter_mut().filter(|p| p.can_interact()) {
            if player.is_invincible() || !shot.bounds().overlaps(&player.bounds()) {
                continue;
            }
            shot.active = false;
            damage_player(player, events);
            break;
        }
    }

    let Some(boss) = boss.as_ref().filter(|b| b.is_hostile()) else {
        return;
    };
    for player in players.iter_mut().filter(|p| p.can_interact()) {
        if player.bounds().overlaps(&boss.bounds()) {
            damage_player(player, events);
        }
    }
}

fn players_vs_pickups(world: &mut World, settings: &Settings) {
    let World {
        players,
        pickups,
        events,
        ..
    } = world;

    for pickup in pickups.iter_mut().filter(|p| p.active) {
        let Some(player) = players
            .iter_mut()
            .filter(|p| p.can_interact())
            .find(|p| p.bounds().overlaps(&pickup.bounds()))
        else {
            continue;
        };
        match pickup.collect() {
            Some(PickupKind::PowerUp(kind)) => {
                player.apply_power_up(kind, settings.powerup_duration_ms);
                events.sound(Sound::PowerUp);
                log::debug!("Player {} picked up {:?}", player.num, kind);
            }
            Some(PickupKind::Bonus(kind)) => {
                player.add_score(kind.value());
                events.sound(Sound::Bonus);
                events.score_popup(pickup.center(), kind.value());
            }
            None => {}
        }
    }
}
