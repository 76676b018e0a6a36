//! Miscellaneous utilities shared across the estimators.
//!
//! Holds the seedable index generator used by the samplers and the median
//! helper used by least-median-of-squares scoring.

use rand::prelude::*;

/// Uniform index generator over a seedable `StdRng`.
///
/// By default this uses an entropy-seeded RNG, but test code can construct it
/// from a fixed seed for reproducible behavior.
#[derive(Debug, Clone)]
pub struct UniformRandomGenerator {
    rng: StdRng,
    permutation: Vec<usize>,
}

impl Default for UniformRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomGenerator {
    /// Construct with an entropy seed (suitable for production use).
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Construct with a fixed seed (useful for tests).
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            permutation: Vec::new(),
        }
    }

    /// Fill `out` with distinct indices drawn uniformly from `[0, n)`.
    ///
    /// Runs a partial Fisher–Yates shuffle over the identity permutation:
    /// position `n - 1 - i` is swapped with a uniform position in
    /// `[0, n - 1 - i]`, and the last `out.len()` entries are returned.
    /// The permutation is rebuilt on every call.
    pub fn gen_unique(&mut self, out: &mut [usize], n: usize) {
        let m = out.len();
        debug_assert!(m <= n, "cannot draw {m} unique indices from {n}");

        self.permutation.clear();
        self.permutation.extend(0..n);

        for i in 0..m {
            let last = n - 1 - i;
            let j = self.rng.gen_range(0..=last);
            self.permutation.swap(last, j);
        }

        out.copy_from_slice(&self.permutation[n - m..]);
    }
}

/// Median of `values`, sorting them in place.
///
/// Even-length input averages the two middle elements. Returns `None` for an
/// empty slice. NaNs sort last.
pub fn median_in_place(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_samples_within_bounds() {
        let mut rng = UniformRandomGenerator::from_seed(1234);
        let mut buf = [0usize; 5];
        rng.gen_unique(&mut buf, 11);

        assert!(buf.iter().all(|&v| v < 11));

        for i in 0..buf.len() {
            for j in (i + 1)..buf.len() {
                assert_ne!(buf[i], buf[j]);
            }
        }
    }

    #[test]
    fn full_draw_is_a_permutation() {
        let mut rng = UniformRandomGenerator::from_seed(7);
        let mut buf = [0usize; 6];
        rng.gen_unique(&mut buf, 6);
        let mut sorted = buf.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let mut rng1 = UniformRandomGenerator::from_seed(42);
        let mut rng2 = UniformRandomGenerator::from_seed(42);

        let mut a = [0usize; 3];
        let mut b = [0usize; 3];
        for _ in 0..10 {
            rng1.gen_unique(&mut a, 100);
            rng2.gen_unique(&mut b, 100);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(median_in_place(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median_in_place(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median_in_place(&mut [5.0]), Some(5.0));
        assert_eq!(median_in_place(&mut []), None);
    }
}
