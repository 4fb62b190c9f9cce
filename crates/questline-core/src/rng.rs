//! Random number generator abstraction for determinism.
//!
//! Every identifier the engine mints (cloned quests, nodes, challenges,
//! edges, submissions, audit lines, character actions) is drawn from this
//! source so tests can replay a run exactly. In production it wraps an
//! OS-seeded `StdRng`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::{Builder, Uuid};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// Mint a version 4 UUID from four `u32` draws.
    fn next_uuid(&mut self) -> Uuid {
        let mut bytes = [0_u8; 16];
        for chunk in bytes.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.next_u32_range(0, u32::MAX).to_be_bytes());
        }
        Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct StdRngSource(StdRng);

impl StdRngSource {
    /// Creates an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed, for replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdRngSource {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}
