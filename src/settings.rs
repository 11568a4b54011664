//! Game settings and tuning
//!
//! Defaults mirror the constants in [`crate::consts`]. A settings file is
//! optional: anything missing falls back to the default, anything out of
//! range is clamped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` lets the host pick one
    pub seed: Option<u64>,

    // === Players ===
    /// Lives granted at game start and on Continue
    pub starting_lives: u8,

    // === Snow ===
    /// Snow hits needed to encase an enemy (minimum 3)
    pub hits_to_freeze: u32,
    /// Time before a covered enemy thaws
    pub freeze_release_ms: f32,

    // === Pickups ===
    /// Duration of each power-up effect
    pub powerup_duration_ms: f32,
    /// Chance a flattened enemy drops a power-up
    pub powerup_drop_chance: f32,

    // === Level flow ===
    pub level_time_ms: f32,
    /// Remaining time that triggers the hurry-up warning
    pub hurry_time_ms: f32,
    pub stage_intro_ms: f32,
    pub level_complete_auto_advance_ms: f32,

    // === Timing ===
    /// Largest frame delta multiplier accepted after a stall
    pub max_dt_multiplier: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,

            starting_lives: PLAYER_LIVES,

            hits_to_freeze: SNOW_HITS_TO_FREEZE,
            freeze_release_ms: FREEZE_RELEASE_MS,

            powerup_duration_ms: POWERUP_DURATION_MS,
            powerup_drop_chance: POWERUP_DROP_CHANCE,

            level_time_ms: LEVEL_TIME_MS,
            hurry_time_ms: HURRY_TIME_MS,
            stage_intro_ms: STAGE_INTRO_MS,
            level_complete_auto_advance_ms: LEVEL_COMPLETE_AUTO_ADVANCE_MS,

            max_dt_multiplier: MAX_DT_MULTIPLIER,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a file, falling back to defaults on any problem
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp every value into a playable range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.starting_lives = self.starting_lives.clamp(1, 9);
        self.hits_to_freeze = self.hits_to_freeze.clamp(SNOW_HITS_TO_FREEZE, 10);
        self.powerup_drop_chance = self.powerup_drop_chance.clamp(0.0, 1.0);

        for (value, default) in [
            (&mut self.freeze_release_ms, defaults.freeze_release_ms),
            (&mut self.powerup_duration_ms, defaults.powerup_duration_ms),
            (&mut self.level_time_ms, defaults.level_time_ms),
            (&mut self.stage_intro_ms, defaults.stage_intro_ms),
            (
                &mut self.level_complete_auto_advance_ms,
                defaults.level_complete_auto_advance_ms,
            ),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                *value = default;
            }
        }

        if !self.hurry_time_ms.is_finite() || self.hurry_time_ms < 0.0 {
            self.hurry_time_ms = defaults.hurry_time_ms;
        }
        self.hurry_time_ms = self.hurry_time_ms.min(self.level_time_ms);

        if !self.max_dt_multiplier.is_finite() || self.max_dt_multiplier < 1.0 {
            self.max_dt_multiplier = defaults.max_dt_multiplier;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let s = Settings::default();
        assert_eq!(s.starting_lives, 3);
        assert_eq!(s.hits_to_freeze, 3);
        assert_eq!(s.freeze_release_ms, 5000.0);
        assert_eq!(s.level_time_ms, 90_000.0);
        assert_eq!(s.hurry_time_ms, 20_000.0);
        assert_eq!(s.max_dt_multiplier, 3.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "seed": 7, "level_time_ms": 30000 }"#).unwrap();
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.level_time_ms, 30_000.0);
        assert_eq!(s.freeze_release_ms, FREEZE_RELEASE_MS);
    }

    #[test]
    fn test_sanitize_clamps() {
        let s = Settings {
            hits_to_freeze: 1,
            starting_lives: 0,
            powerup_drop_chance: 4.0,
            level_time_ms: -5.0,
            hurry_time_ms: 1e9,
            max_dt_multiplier: 0.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(s.hits_to_freeze, 3);
        assert_eq!(s.starting_lives, 1);
        assert_eq!(s.powerup_drop_chance, 1.0);
        assert_eq!(s.level_time_ms, LEVEL_TIME_MS);
        assert_eq!(s.hurry_time_ms, LEVEL_TIME_MS);
        assert_eq!(s.max_dt_multiplier, MAX_DT_MULTIPLIER);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let s = Settings::load_or_default("/nonexistent/snow-brothers/settings.json");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let s = Settings {
            seed: Some(99),
            ..Default::default()
        };
        let json = s.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), s);
    }
}
