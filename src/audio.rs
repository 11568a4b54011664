//! Sound cues emitted by the simulation
//!
//! The simulation never synthesizes audio; it names what happened and an
//! [`AudioSink`] decides how it sounds. Cues are fire-and-forget.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Game started from the menu
    Start,
    /// Menu cursor moved
    Menu,
    Jump,
    Shoot,
    /// Player took damage
    Hurt,
    /// Player lost the last life
    Death,
    /// Snow hit that did not finish the snowball
    Hit,
    /// Enemy fully encased
    Freeze,
    /// Frozen enemy broke free
    Release,
    /// Player kicked a snowball
    Push,
    /// Rolling snowball flattened an enemy
    Kill,
    Bounce,
    EnemyJump,
    EnemyDeath,
    PowerUp,
    Bonus,
    Pause,
    Hurry,
    PumpkinHead,
    LevelComplete,
    BonusTick,
    GameOver,
    Victory,
    BossAppear,
    BossAttack,
    BossHit,
    BossPhaseChange,
    BossRage,
    BossDying,
}

impl Sound {
    /// Stable semantic event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Start => "start",
            Sound::Menu => "menu",
            Sound::Jump => "jump",
            Sound::Shoot => "shoot",
            Sound::Hurt => "hurt",
            Sound::Death => "death",
            Sound::Hit => "hit",
            Sound::Freeze => "freeze",
            Sound::Release => "release",
            Sound::Push => "push",
            Sound::Kill => "kill",
            Sound::Bounce => "bounce",
            Sound::EnemyJump => "enemyJump",
            Sound::EnemyDeath => "enemyDeath",
            Sound::PowerUp => "powerup",
            Sound::Bonus => "bonus",
            Sound::Pause => "pause",
            Sound::Hurry => "hurry",
            Sound::PumpkinHead => "pumpkinHead",
            Sound::LevelComplete => "levelComplete",
            Sound::BonusTick => "bonusTick",
            Sound::GameOver => "gameOver",
            Sound::Victory => "victory",
            Sound::BossAppear => "bossAppear",
            Sound::BossAttack => "bossAttack",
            Sound::BossHit => "bossHit",
            Sound::BossPhaseChange => "bossPhaseChange",
            Sound::BossRage => "bossRage",
            Sound::BossDying => "bossDying",
        }
    }
}

/// Audio backend
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

/// Writes cues to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub muted: bool,
}

impl AudioSink for LogAudio {
    fn play(&mut self, sound: Sound) {
        if !self.muted {
            log::debug!("audio: {}", sound.as_str());
        }
    }
}

/// Records cues in order (tests, replays)
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<Sound>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.played.push(sound);
    }
}
