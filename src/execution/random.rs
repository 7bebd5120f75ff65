//! Injectable random source for feature start draws

use rand::Rng;
use std::collections::VecDeque;

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Thread-local RNG from the `rand` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of draws, then a fallback value forever
///
/// Used to drive the simulation tick by tick in tests.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl SequenceRandom {
    pub fn new<I: IntoIterator<Item = f64>>(draws: I) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.0,
        }
    }

    /// A source that always returns `value`
    pub fn constant(value: f64) -> Self {
        Self::new([]).with_fallback(value)
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Draws not consumed yet
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}
