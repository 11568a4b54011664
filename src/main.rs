//! Snow Brothers - native headless runner
//!
//! Plays an unattended "attract mode" game with simulated time and logs
//! what happens. Useful as a smoke run of the whole simulation.
//!
//! Usage: `snow-brothers [settings.json] [frames]`

use snow_brothers::audio::LogAudio;
use snow_brothers::consts::FRAME_TIME_MS;
use snow_brothers::frame::EffectSink;
use snow_brothers::input::{InputSource, MenuInput, PlayerInput};
use snow_brothers::render::DrawCounter;
use snow_brothers::sim::{GamePhase, RandomSource, Session, SimRng};
use snow_brothers::{Game, Settings};

const DEFAULT_FRAMES: u64 = 60 * 60 * 3;

/// Mashes buttons at random and confirms every menu
struct AttractInput {
    rng: SimRng,
    held: [PlayerInput; 2],
    frame: u64,
}

impl AttractInput {
    fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::new(seed ^ 0xa77_4ac7),
            held: [PlayerInput::default(); 2],
            frame: 0,
        }
    }
}

impl InputSource for AttractInput {
    fn player_input(&mut self, player_num: u8) -> PlayerInput {
        let slot = &mut self.held[(player_num.clamp(1, 2) - 1) as usize];
        // Change direction every half second or so
        if self.rng.chance(0.03) {
            let dir = self.rng.range_int(-1, 1);
            slot.left = dir < 0;
            slot.right = dir > 0;
        }
        PlayerInput {
            jump: self.rng.chance(0.02),
            shoot_pressed: self.rng.chance(0.15),
            up: self.rng.chance(0.1),
            ..*slot
        }
    }

    fn menu_input(&mut self) -> MenuInput {
        self.frame += 1;
        MenuInput {
            confirm: self.frame % 30 == 0,
            ..Default::default()
        }
    }

    fn pause_pressed(&mut self) -> bool {
        false
    }
}

/// Tallies effects instead of drawing them
#[derive(Default)]
struct EffectTally {
    explosions: u32,
    popups: u64,
}

impl EffectSink for EffectTally {
    fn spawn_explosion(&mut self, _pos: glam::Vec2, _count: u32) {
        self.explosions += 1;
    }

    fn spawn_score_popup(&mut self, _pos: glam::Vec2, value: u64) {
        self.popups += value;
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    log::info!("Snow Brothers (native) attract run: seed={}, frames={}", seed, frames);

    let mut game = Game::new(Session::with_settings(Settings {
        seed: Some(seed),
        ..settings
    }));
    let mut input = AttractInput::new(seed);
    let mut audio = LogAudio::default();
    let mut effects = EffectTally::default();
    let mut draws = DrawCounter::default();

    let mut now_ms = 0.0;
    for _ in 0..frames {
        now_ms += FRAME_TIME_MS as f64;
        game.frame(now_ms, &mut input, &mut audio, &mut effects);
        game.render(&mut draws);

        if matches!(game.session.phase, GamePhase::GameOver | GamePhase::Victory) {
            break;
        }
    }

    let world = &game.session.world;
    log::info!(
        "Finished in {:?} on level {} after {:.1}s of game time",
        game.session.phase,
        world.level,
        now_ms / 1000.0
    );
    for player in &world.players {
        log::info!("Player {}: {} points, {} lives", player.num, player.score, player.lives);
    }
    log::info!(
        "{} explosions, {} popup points, {} draw calls",
        effects.explosions,
        effects.popups,
        draws.counts.values().sum::<usize>()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Game::frame` directly
}
