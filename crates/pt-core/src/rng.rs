//! Deterministic, injectable RNG wrapper.
//!
//! # Determinism strategy
//!
//! Nothing in the simulator or the environment touches a platform RNG.  Every
//! random draw (resource tie-break shuffles, ticket pool shuffles, synthetic
//! wait times) flows through a `SimRng` built from an explicit seed.
//!
//! Independent replicas (vectorised environments) derive their seeds as
//!
//!   seed = base_seed XOR (replica_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive indices uniformly across the seed space, so
//! adding replicas never disturbs the streams of existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded RNG used by one simulation run or one environment instance.
///
/// Single-owner by construction: each run and each environment holds its
/// own, so no synchronisation is ever needed.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed of replica `index` in a family sharing `base_seed`.  Replica 0
    /// keeps `base_seed` itself.
    pub const fn replica_seed(base_seed: u64, index: u64) -> u64 {
        base_seed ^ index.wrapping_mul(MIXING_CONSTANT)
    }

    /// Seeded from OS entropy, for callers that opt out of reproducibility.
    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
