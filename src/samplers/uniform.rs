//! Uniform random sampler drawing minimal samples without replacement.

use crate::core::Sampler;
use crate::utils::UniformRandomGenerator;
use rand::rngs::StdRng;

/// Uniform random sampler drawing minimal samples without replacement.
#[derive(Debug, Clone, Default)]
pub struct UniformRandomSampler {
    rng: UniformRandomGenerator,
}

impl UniformRandomSampler {
    /// Construct a new sampler with a random seed.
    pub fn new() -> Self {
        Self {
            rng: UniformRandomGenerator::new(),
        }
    }

    /// Construct a sampler from a fixed seed (primarily for tests).
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: UniformRandomGenerator::from_seed(seed),
        }
    }

    /// Construct a sampler around an existing generator.
    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: UniformRandomGenerator::from_rng(rng),
        }
    }
}

impl Sampler for UniformRandomSampler {
    fn sample(
        &mut self,
        total_samples: usize,
        sample_size: usize,
        out_indices: &mut [usize],
    ) -> bool {
        if sample_size == 0
            || total_samples == 0
            || sample_size > total_samples
            || out_indices.len() < sample_size
        {
            return false;
        }

        self.rng.gen_unique(&mut out_indices[..sample_size], total_samples);
        true
    }
}
