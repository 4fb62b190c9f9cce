//! Test RNGs: deterministic `DeterministicRng` implementations for tests.

use questline_core::rng::{DeterministicRng, StdRngSource};

/// A seeded RNG. Two instances built from the same seed mint the same ids in
/// the same order, and ids never repeat within a run.
#[derive(Debug)]
pub struct SeededRng(StdRngSource);

impl SeededRng {
    /// Create a new `SeededRng` from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(StdRngSource::seeded(seed))
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.next_u32_range(min, max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.next_f64()
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted. Every minted UUID consumes four values.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
