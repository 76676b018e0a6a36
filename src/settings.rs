//! Configuration types for the robust estimators.

use crate::iterations::{Iterations, DEFAULT_CONFIDENCE, DEFAULT_INLIER_RATIO};

/// Scoring strategy used to rank trial models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyType {
    /// Maximise the inlier count.
    #[default]
    Ransac,
    /// Minimise the truncated squared error.
    Msac,
    /// Minimise the median squared error.
    Lmeds,
}

/// Main configuration object for a robust estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobustSettings {
    /// Strategy picked by the high-level API and
    /// [`StrategyChoice`](crate::choices::StrategyChoice).
    ///
    /// A typed [`RobustEstimator<Sc>`](crate::core::RobustEstimator) ignores
    /// this field: its scoring is fixed by `Sc`.
    pub strategy: StrategyType,
    /// Iteration count used when none is passed explicitly.
    pub iterations: Iterations,
    /// Desired probability in (0, 1) that one trial is outlier-free; drives
    /// automatic iteration estimation.
    pub confidence: f64,
    /// Assumed inlier ratio in (0, 1]; drives automatic iteration estimation.
    pub inlier_ratio: f64,
    /// Score trials on the rayon thread pool.
    pub parallel: bool,
    /// Seed for the sampler; `None` seeds from OS entropy.
    ///
    /// Read once when the sampler is built (`with_settings`,
    /// `StrategyChoice::from_settings`). Changing it on an existing
    /// estimator does not reseed the sampler.
    pub seed: Option<u64>,
}

impl Default for RobustSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Ransac,
            iterations: Iterations::Auto,
            confidence: DEFAULT_CONFIDENCE,
            inlier_ratio: DEFAULT_INLIER_RATIO,
            parallel: true,
            seed: None,
        }
    }
}
