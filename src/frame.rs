//! Frame clock and per-frame driver
//!
//! The host calls [`Game::frame`] once per display refresh with a
//! millisecond timestamp. The driver turns wall time into a clamped
//! frame-normalized delta, ticks the session and forwards the tick's
//! events to the audio and effects collaborators.

use glam::Vec2;

use crate::audio::AudioSink;
use crate::consts::*;
use crate::input::InputSource;
use crate::render::{Renderer, render_session};
use crate::sim::{GameEvent, Session};

/// Visual effects collaborator (particles, floating score text)
pub trait EffectSink {
    fn spawn_explosion(&mut self, pos: Vec2, count: u32);
    fn spawn_score_popup(&mut self, pos: Vec2, value: u64);
}

/// Discards every effect
#[derive(Debug, Default)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn spawn_explosion(&mut self, _pos: Vec2, _count: u32) {}
    fn spawn_score_popup(&mut self, _pos: Vec2, _value: u64) {}
}

/// Converts timestamps into frame-normalized deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_multiplier: f32,
}

impl FrameClock {
    pub fn new(max_multiplier: f32) -> Self {
        Self {
            last_ms: None,
            max_multiplier: max_multiplier.max(1.0),
        }
    }

    /// Delta since the previous call, 1.0 being one 60 Hz frame.
    ///
    /// The first call returns 1.0. Stalls are clamped to the multiplier
    /// limit and a clock running backwards yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / FRAME_TIME_MS as f64) as f32,
            None => 1.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, self.max_multiplier)
        } else {
            0.0
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_DT_MULTIPLIER)
    }
}

/// Forward events in emission order
pub fn dispatch(events: Vec<GameEvent>, audio: &mut dyn AudioSink, effects: &mut dyn EffectSink) {
    for event in events {
        match event {
            GameEvent::Sound(sound) => audio.play(sound),
            GameEvent::Explosion { pos, count } => effects.spawn_explosion(pos, count),
            GameEvent::ScorePopup { pos, value } => effects.spawn_score_popup(pos, value),
        }
    }
}

/// A session plus its frame clock
pub struct Game {
    pub session: Session,
    clock: FrameClock,
}

impl Game {
    pub fn new(session: Session) -> Self {
        let clock = FrameClock::new(session.settings.max_dt_multiplier);
        Self { session, clock }
    }

    /// Run one frame. Returns the delta that was applied.
    pub fn frame(
        &mut self,
        now_ms: f64,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
        effects: &mut dyn EffectSink,
    ) -> f32 {
        let dt = self.clock.delta(now_ms);
        let snapshot = input.snapshot();
        self.session.tick(&snapshot, dt);
        dispatch(self.session.drain_events(), audio, effects);
        dt
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        render_session(&self.session, renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{RecordingAudio, Sound};
    use crate::input::{ScriptedInput, TickInput};
    use crate::settings::Settings;
    use crate::sim::GamePhase;

    #[derive(Default)]
    struct RecordingEffects {
        explosions: Vec<(Vec2, u32)>,
        popups: Vec<u64>,
    }

    impl EffectSink for RecordingEffects {
        fn spawn_explosion(&mut self, pos: Vec2, count: u32) {
            self.explosions.push((pos, count));
        }

        fn spawn_score_popup(&mut self, _pos: Vec2, value: u64) {
            self.popups.push(value);
        }
    }

    #[test]
    fn test_first_delta_is_one_frame() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.delta(12_345.0), 1.0);
        let dt = clock.delta(12_345.0 + FRAME_TIME_MS as f64 * 2.0);
        assert!((dt - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_delta_clamped_after_stall() {
        let mut clock = FrameClock::default();
        clock.delta(0.0);
        assert_eq!(clock.delta(5_000.0), MAX_DT_MULTIPLIER);
        // Clock going backwards
        assert_eq!(clock.delta(4_000.0), 0.0);
    }

    #[test]
    fn test_dispatch_keeps_order() {
        let events = vec![
            GameEvent::Sound(Sound::Kill),
            GameEvent::Explosion {
                pos: Vec2::new(1.0, 2.0),
                count: 8,
            },
            GameEvent::ScorePopup {
                pos: Vec2::ZERO,
                value: 500,
            },
            GameEvent::Sound(Sound::PowerUp),
        ];
        let mut audio = RecordingAudio::default();
        let mut effects = RecordingEffects::default();
        dispatch(events, &mut audio, &mut effects);
        assert_eq!(audio.played, vec![Sound::Kill, Sound::PowerUp]);
        assert_eq!(effects.explosions, vec![(Vec2::new(1.0, 2.0), 8)]);
        assert_eq!(effects.popups, vec![500]);
    }

    #[test]
    fn test_frame_drives_session() {
        let mut game = Game::new(Session::with_settings(Settings::default()));
        let mut input = ScriptedInput::new(vec![TickInput::confirm()]);
        let mut audio = RecordingAudio::default();
        let mut effects = NullEffects;

        let dt = game.frame(0.0, &mut input, &mut audio, &mut effects);
        assert_eq!(dt, 1.0);
        assert_eq!(game.session.phase, GamePhase::StageIntro);
        assert_eq!(audio.played, vec![Sound::Start]);

        let mut t = 0.0;
        while game.session.phase == GamePhase::StageIntro {
            t += FRAME_TIME_MS as f64;
            game.frame(t, &mut input, &mut audio, &mut effects);
            assert!(t < 10_000.0);
        }
        assert_eq!(game.session.phase, GamePhase::Playing);
    }
}
