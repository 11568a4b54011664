//! Seedable random source for AI decisions and drop chances
//!
//! All gameplay randomness goes through [`RandomSource`] so tests can
//! replace it with a fixed sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// A source of uniform floats in `[0, 1)`
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`
    fn next_f32(&mut self) -> f32;

    /// Uniform float in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform integer in `[min, max]` (inclusive)
    fn range_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        let offset = (self.next_f32() * span).floor() as i32;
        min + offset.min(max - min)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Random facing: -1.0 or 1.0
    fn sign(&mut self) -> f32 {
        if self.next_f32() < 0.5 { -1.0 } else { 1.0 }
    }

    /// Pick an index from a weight table.
    ///
    /// Weights are normalized by their sum first; the sample falls in the
    /// first bucket whose cumulative share exceeds it. Rounding slack at the
    /// top end lands on the last non-zero bucket.
    fn weighted_index(&mut self, weights: &[f32]) -> usize {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        let Some(last) = weights.iter().rposition(|w| *w > 0.0) else {
            return 0;
        };
        let roll = self.next_f32();
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            cumulative += w / total;
            if roll < cumulative {
                return i;
            }
        }
        last
    }
}

/// Seeded PCG32 generator used by real sessions
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    rng: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SimRng {
    fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same sample
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 0.999_999)
    }
}
