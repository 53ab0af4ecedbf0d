//! Randomness sources for the quiz engine.
//!
//! The engine never reaches for an ambient RNG. Every permutation it makes
//! goes through a [`Shuffle`] passed in by the caller, so tests can use
//! [`NoShuffle`] or a seeded [`RandomShuffle`] and assert exact output.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Permutes slices in place.
pub trait Shuffle {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl<S: Shuffle> Shuffle for &mut S {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        (**self).shuffle(items);
    }
}

/// Uniform Fisher–Yates shuffle driven by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomShuffle<R> {
    rng: R,
}

impl<R: Rng> RandomShuffle<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomShuffle<StdRng> {
    /// Seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Shuffle for RandomShuffle<R> {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Leaves every slice in its original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShuffle;

impl Shuffle for NoShuffle {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}
