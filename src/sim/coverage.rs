//! Snow coverage state machine
//!
//! Every demon carries one of these. Snow hits bury the enemy one stage at a
//! time; a release timer thaws it back to normal if nobody follows up.

use serde::{Deserialize, Serialize};

use crate::consts::{FREEZE_RELEASE_MS, SNOW_HITS_TO_FREEZE};

/// Burial stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Coverage {
    #[default]
    Normal,
    Partial1,
    Partial2,
    /// Fully encased, can be pushed
    Snowball,
}

impl Coverage {
    /// Visual fill ratio for renderers (not authoritative state)
    pub fn percent(self) -> f32 {
        match self {
            Coverage::Normal => 0.0,
            Coverage::Partial1 => 0.33,
            Coverage::Partial2 => 0.66,
            Coverage::Snowball => 1.0,
        }
    }
}

/// Per-enemy coverage tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowCoverage {
    state: Coverage,
    hits: u32,
    release_timer_ms: f32,
    hits_to_freeze: u32,
    release_ms: f32,
}

impl Default for SnowCoverage {
    fn default() -> Self {
        Self::new(SNOW_HITS_TO_FREEZE, FREEZE_RELEASE_MS)
    }
}

impl SnowCoverage {
    /// Thresholds below 3 would skip a stage, so they are raised to 3
    pub fn new(hits_to_freeze: u32, release_ms: f32) -> Self {
        Self {
            state: Coverage::Normal,
            hits: 0,
            release_timer_ms: 0.0,
            hits_to_freeze: hits_to_freeze.max(SNOW_HITS_TO_FREEZE),
            release_ms,
        }
    }

    pub fn state(&self) -> Coverage {
        self.state
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn release_timer_ms(&self) -> f32 {
        self.release_timer_ms
    }

    /// Remaining release time as a 0-1 ratio
    pub fn release_ratio(&self) -> f32 {
        if self.release_ms <= 0.0 {
            return 0.0;
        }
        (self.release_timer_ms / self.release_ms).clamp(0.0, 1.0)
    }

    pub fn is_frozen(&self) -> bool {
        self.state == Coverage::Snowball
    }

    /// Register one snow hit. Returns true if this hit completed the snowball.
    pub fn apply_hit(&mut self) -> bool {
        if self.state == Coverage::Snowball {
            return false;
        }

        self.hits += 1;
        self.release_timer_ms = self.release_ms;

        self.state = if self.hits >= self.hits_to_freeze {
            Coverage::Snowball
        } else if self.hits >= 2 {
            Coverage::Partial2
        } else {
            Coverage::Partial1
        };

        self.state == Coverage::Snowball
    }

    /// Count down the release timer. Returns true on the tick the enemy thaws.
    pub fn tick(&mut self, elapsed_ms: f32) -> bool {
        if self.state == Coverage::Normal {
            return false;
        }

        self.release_timer_ms -= elapsed_ms;
        if self.release_timer_ms <= 0.0 {
            self.release();
            return true;
        }
        false
    }

    /// Thaw immediately
    pub fn release(&mut self) {
        self.state = Coverage::Normal;
        self.hits = 0;
        self.release_timer_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_hits_freeze() {
        let mut cov = SnowCoverage::default();
        assert!(!cov.apply_hit());
        assert_eq!(cov.state(), Coverage::Partial1);
        assert!(!cov.apply_hit());
        assert_eq!(cov.state(), Coverage::Partial2);
        assert!(cov.apply_hit());
        assert_eq!(cov.state(), Coverage::Snowball);
        // Already frozen: no-op
        assert!(!cov.apply_hit());
        assert_eq!(cov.state(), Coverage::Snowball);
        assert_eq!(cov.hits(), 3);
    }

    #[test]
    fn test_hit_resets_release_timer() {
        let mut cov = SnowCoverage::default();
        cov.apply_hit();
        cov.tick(4000.0);
        assert_eq!(cov.state(), Coverage::Partial1);
        cov.apply_hit();
        assert_eq!(cov.release_timer_ms(), FREEZE_RELEASE_MS);
        assert!(!cov.tick(4000.0));
        assert_eq!(cov.state(), Coverage::Partial2);
    }

    #[test]
    fn test_release_fires_once() {
        let mut cov = SnowCoverage::default();
        cov.apply_hit();
        cov.apply_hit();
        cov.apply_hit();
        assert!(!cov.tick(4999.0));
        assert!(cov.tick(1.0));
        assert_eq!(cov.state(), Coverage::Normal);
        assert_eq!(cov.hits(), 0);
        // Nothing left to release
        assert!(!cov.tick(1000.0));
    }

    #[test]
    fn test_low_threshold_is_raised() {
        let mut cov = SnowCoverage::new(1, FREEZE_RELEASE_MS);
        assert!(!cov.apply_hit());
        assert_eq!(cov.state(), Coverage::Partial1);
    }

    #[test]
    fn test_higher_threshold_holds_partial2() {
        let mut cov = SnowCoverage::new(5, FREEZE_RELEASE_MS);
        for _ in 0..4 {
            assert!(!cov.apply_hit());
        }
        assert_eq!(cov.state(), Coverage::Partial2);
        assert!(cov.apply_hit());
    }

    #[test]
    fn test_coverage_percent() {
        assert_eq!(Coverage::Normal.percent(), 0.0);
        assert_eq!(Coverage::Partial1.percent(), 0.33);
        assert_eq!(Coverage::Partial2.percent(), 0.66);
        assert_eq!(Coverage::Snowball.percent(), 1.0);
    }

    fn rank(c: Coverage) -> u8 {
        match c {
            Coverage::Normal => 0,
            Coverage::Partial1 => 1,
            Coverage::Partial2 => 2,
            Coverage::Snowball => 3,
        }
    }

    proptest! {
        #[test]
        fn prop_hits_never_skip_or_regress(threshold in 0u32..8, hits in 1usize..12) {
            let mut cov = SnowCoverage::new(threshold, FREEZE_RELEASE_MS);
            let mut prev = rank(cov.state());
            for _ in 0..hits {
                cov.apply_hit();
                let now = rank(cov.state());
                prop_assert!(now >= prev);
                prop_assert!(now - prev <= 1);
                prev = now;
            }
        }
    }
}
