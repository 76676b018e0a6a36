//! Runtime strategy selection.
//!
//! `RobustEstimator` is generic over its scoring; this enum picks one of the
//! built-in strategies from [`RobustSettings::strategy`] and forwards to it.

use crate::core::{Estimate, EstimationProblem};
use crate::error::EstimationError;
use crate::iterations::Iterations;
use crate::scoring::{Lmeds, Msac, Ransac};
use crate::settings::{RobustSettings, StrategyType};

/// Runtime strategy selection.
#[derive(Debug, Clone)]
pub enum StrategyChoice {
    Ransac(Ransac),
    Msac(Msac),
    Lmeds(Lmeds),
}

impl Default for StrategyChoice {
    fn default() -> Self {
        Self::from_settings(RobustSettings::default())
    }
}

impl StrategyChoice {
    /// Build the estimator named by `settings.strategy`, seeding its sampler
    /// from `settings.seed`.
    pub fn from_settings(settings: RobustSettings) -> Self {
        match settings.strategy {
            StrategyType::Ransac => StrategyChoice::Ransac(Ransac::with_settings(settings)),
            StrategyType::Msac => StrategyChoice::Msac(Msac::with_settings(settings)),
            StrategyType::Lmeds => StrategyChoice::Lmeds(Lmeds::with_settings(settings)),
        }
    }

    /// Strategy held by this choice.
    pub fn strategy(&self) -> StrategyType {
        match self {
            StrategyChoice::Ransac(_) => StrategyType::Ransac,
            StrategyChoice::Msac(_) => StrategyType::Msac,
            StrategyChoice::Lmeds(_) => StrategyType::Lmeds,
        }
    }

    /// Forward to [`RobustEstimator::solve`](crate::core::RobustEstimator::solve)
    /// on the selected strategy.
    pub fn solve<P>(
        &mut self,
        problem: &P,
        threshold: f64,
        iterations: impl Into<Iterations>,
    ) -> Result<Estimate<P::Model>, EstimationError>
    where
        P: EstimationProblem + Sync,
        P::Model: Send + Sync,
    {
        match self {
            StrategyChoice::Ransac(s) => s.solve(problem, threshold, iterations),
            StrategyChoice::Msac(s) => s.solve(problem, threshold, iterations),
            StrategyChoice::Lmeds(s) => s.solve(problem, threshold, iterations),
        }
    }

    /// Inlier fraction of the last `solve`.
    pub fn inlier_fraction(&self) -> f64 {
        match self {
            StrategyChoice::Ransac(s) => s.inlier_fraction(),
            StrategyChoice::Msac(s) => s.inlier_fraction(),
            StrategyChoice::Lmeds(s) => s.inlier_fraction(),
        }
    }

    /// Inlier indices of the last `solve`, ascending.
    pub fn inlier_indices(&self) -> &[usize] {
        match self {
            StrategyChoice::Ransac(s) => s.inlier_indices(),
            StrategyChoice::Msac(s) => s.inlier_indices(),
            StrategyChoice::Lmeds(s) => s.inlier_indices(),
        }
    }
}
