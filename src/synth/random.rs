//! Seedable uniform random source shared by every noise generator

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform sampler over [-1, 1] with an explicit seed
///
/// Each generator owns its own `RandomSource`. Composite recipes derive
/// per-layer sources with [`RandomSource::fork`], so a layer's samples do
/// not depend on how many samples another layer has drawn.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Create a source from a fixed seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one sample uniformly from [-1, 1]
    #[inline]
    pub fn next_uniform(&mut self) -> f32 {
        self.rng.gen_range(-1.0_f32..=1.0)
    }

    /// Draw an index uniformly from `[0, upper)`
    ///
    /// `upper` must be non-zero.
    #[inline]
    pub fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    /// Derive an independent child source
    pub fn fork(&mut self) -> RandomSource {
        RandomSource::from_seed(self.rng.gen())
    }
}

/// Pick a seed from the thread RNG, for requests that did not fix one
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}
