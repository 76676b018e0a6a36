//! Trial-count planning for the sample-consensus loop.
//!
//! The number of random trials needed so that, with probability `alpha`, at
//! least one minimal sample is outlier-free follows the usual RANSAC bound
//! `N = log(1 - alpha) / log(1 - gamma^k)`.

/// Default probability that at least one trial is outlier-free.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Default assumed inlier ratio used when the iteration count is derived.
pub const DEFAULT_INLIER_RATIO: f64 = 0.80;

/// Upper bound on any derived iteration count.
pub const MAX_ITERATIONS: usize = 50_000;

/// How many trials a `solve` call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Iterations {
    /// Derive the count from the confidence and inlier ratio settings.
    #[default]
    Auto,
    /// Run exactly this many trials.
    Fixed(usize),
}

impl Iterations {
    /// Resolve to a concrete count for a problem with `data_size` samples.
    pub fn resolve(self, data_size: usize, confidence: f64, inlier_ratio: f64) -> usize {
        match self {
            Iterations::Fixed(n) if n > 0 => n,
            _ => {
                let n = estimate_iterations(data_size, confidence, inlier_ratio);
                log::debug!(
                    "auto-derived {n} iterations (data size {data_size}, confidence {confidence}, inlier ratio {inlier_ratio})"
                );
                n
            }
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        /// Non-positive counts request automatic estimation.
        impl From<$t> for Iterations {
            fn from(count: $t) -> Self {
                if count <= 0 {
                    Iterations::Auto
                } else {
                    Iterations::Fixed(count as usize)
                }
            }
        }
    )*};
}

// Unsuffixed literals fall back to `i32`.
impl_from_signed!(i32, i64);

impl From<usize> for Iterations {
    fn from(count: usize) -> Self {
        if count == 0 {
            Iterations::Auto
        } else {
            Iterations::Fixed(count)
        }
    }
}

/// Number of trials required to draw an outlier-free sample of `data_size`
/// elements with probability `alpha`, given an inlier ratio `gamma`.
///
/// # Panics
///
/// Panics when `data_size == 0`, `alpha` is outside `(0, 1)` or `gamma` is
/// outside `(0, 1]`. These are caller-controlled constants, not data.
pub fn estimate_iterations(data_size: usize, alpha: f64, gamma: f64) -> usize {
    assert!(data_size > 0, "data_size must be > 0, got {data_size}");
    assert!(
        alpha > 0.0 && alpha < 1.0,
        "alpha (success probability) must lie in (0, 1), got {alpha}"
    );
    assert!(
        gamma > 0.0 && gamma <= 1.0,
        "gamma (inlier ratio) must lie in (0, 1], got {gamma}"
    );

    if gamma == 1.0 {
        return 1;
    }

    let p_good_sample = gamma.powf(data_size as f64);
    let n = 1.0 + (1.0 - alpha).ln() / (1.0 - p_good_sample).ln();

    // gamma^k underflowing to 0 sends the ratio to -inf.
    if !n.is_finite() || n < 0.0 || n > MAX_ITERATIONS as f64 {
        return MAX_ITERATIONS;
    }
    (n.trunc() as usize).max(1)
}
