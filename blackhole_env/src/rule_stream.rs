//! Seeded rule stream backed by ChaCha8.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed of the canonical ruleset. Generators skip all draws for it.
pub const DEFAULT_RULE_SEED: u64 = 1;

/// A strictly sequential source of seeded draws.
///
/// Consumers must take draws in a fixed order: the same seed only yields
/// the same puzzle if every decision pulls from the stream in the same
/// position.
pub trait RuleStream {
    /// Returns the seed this stream was created from.
    fn seed(&self) -> u64;

    /// Draws an integer in `[min, max)`.
    fn next_range(&mut self, min: i32, max: i32) -> i32;

    /// Draws a fraction in `[0, 1)`.
    fn next_fraction(&mut self) -> f64;
}

/// Production rule stream: ChaCha8 seeded from the rule seed.
#[derive(Debug, Clone)]
pub struct ChaChaRuleStream {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ChaChaRuleStream {
    /// Creates a stream positioned at the start of `seed`'s sequence.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RuleStream for ChaChaRuleStream {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        assert!(min < max, "empty draw range {}..{}", min, max);
        self.rng.gen_range(min..max)
    }

    fn next_fraction(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
