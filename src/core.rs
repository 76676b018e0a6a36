//! Core traits and the sample-consensus pipeline.
//!
//! - [`EstimationProblem`]: the contract every fitting problem implements.
//! - [`Sampler`]: draws minimal samples.
//! - [`Scoring`]: the objective a strategy optimises (RANSAC, MSAC, LMedS).
//! - [`RobustEstimator`]: orchestrates sampling, fitting, scoring, inlier
//!   extraction and the final consensus refit.

use rayon::prelude::*;

use crate::error::EstimationError;
use crate::iterations::Iterations;
use crate::samplers::UniformRandomSampler;
use crate::scoring::CONSENSUS_TEST;
use crate::settings::RobustSettings;

/// Residual cutoff used when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// A fitting problem: owns its data and knows how to fit and score models.
///
/// Fitting is pure. A problem never stores the model it produces, so
/// trials can be evaluated concurrently against a shared `&self`.
pub trait EstimationProblem {
    /// Model type produced by this problem.
    type Model: Clone;

    /// Number of data samples held by the problem.
    fn total_samples(&self) -> usize;

    /// Size of a minimal sample for this model family.
    fn min_samples(&self) -> usize;

    /// Number of model parameters. Informational only.
    fn param_count(&self) -> usize;

    /// Fit a model from the given sample indices.
    ///
    /// `indices` holds at least `min_samples()` distinct entries; larger sets
    /// are fitted in the least-squares sense. Returns `None` when the sample
    /// is degenerate (e.g. collinear points for a circle).
    fn fit_from_samples(&self, indices: &[usize]) -> Option<Self::Model>;

    /// Residual of sample `index` against `model`.
    fn error_for_sample(&self, model: &Self::Model, index: usize) -> f64;
}

/// Sampler responsible for drawing minimal samples.
pub trait Sampler {
    /// Draw `sample_size` distinct indices from `[0, total_samples)` into
    /// `out_indices`.
    ///
    /// Returns `false` if a valid sample could not be drawn.
    fn sample(
        &mut self,
        total_samples: usize,
        sample_size: usize,
        out_indices: &mut [usize],
    ) -> bool;

    /// Allocating convenience wrapper around [`Sampler::sample`].
    fn draw_sample(&mut self, total_samples: usize, sample_size: usize) -> Option<Vec<usize>> {
        let mut out = vec![0; sample_size];
        self.sample(total_samples, sample_size, &mut out).then_some(out)
    }
}

/// Objective used to rank trial models.
pub trait Scoring {
    /// Per-trial score.
    type Score: Clone + std::fmt::Debug;

    /// Human-readable strategy name, used in log output.
    fn name(&self) -> &'static str;

    /// Score every trial has to beat before it is retained.
    fn initial_score(&self) -> Self::Score;

    /// Score `model` against every sample of `problem`.
    fn score<P: EstimationProblem>(
        &self,
        problem: &P,
        model: &P::Model,
        threshold: f64,
    ) -> Self::Score;

    /// `true` when `candidate` strictly improves on `incumbent`.
    fn is_better(&self, candidate: &Self::Score, incumbent: &Self::Score) -> bool;

    /// Scalar summary of a score for reporting.
    fn objective(&self, score: &Self::Score) -> f64;

    /// Whether the final model is refitted from the consensus set.
    fn refit_on_consensus(&self) -> bool {
        true
    }
}

/// Result of a `solve` call.
#[derive(Debug, Clone)]
pub struct Estimate<M> {
    /// Final model (after the consensus refit, where the strategy does one).
    pub model: M,
    /// Ascending indices of the samples classified as inliers.
    pub inliers: Vec<usize>,
    /// `inliers.len() / total_samples`.
    pub inlier_fraction: f64,
    /// Minimal sample of the best trial.
    pub best_sample: Vec<usize>,
    /// Strategy objective of the best trial (inlier fraction, truncated
    /// cost or median squared error).
    pub objective: f64,
    /// Number of trials run.
    pub iterations: usize,
}

struct Trial<M, S> {
    index: usize,
    sample: Vec<usize>,
    model: M,
    score: S,
}

/// Generic sample-consensus estimator.
///
/// Every `solve` runs the full iteration count: draw a minimal sample, fit,
/// score, keep the strictly best trial. Afterwards the inlier set is
/// extracted and, if the scoring asks for it, the model is refitted from it.
#[derive(Debug, Clone)]
pub struct RobustEstimator<Sc, Sa = UniformRandomSampler>
where
    Sc: Scoring,
    Sa: Sampler,
{
    /// Iteration, parallelism and auto-iteration parameters. `strategy` is
    /// not consulted (the scoring is `Sc`) and `seed` only matters at
    /// construction.
    pub settings: RobustSettings,
    pub scoring: Sc,
    pub sampler: Sa,

    best_sample: Vec<usize>,
    best_score: Option<Sc::Score>,
    inliers: Vec<usize>,
    inlier_fraction: f64,
}

impl<Sc> Default for RobustEstimator<Sc>
where
    Sc: Scoring + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc> RobustEstimator<Sc>
where
    Sc: Scoring + Default,
{
    /// Estimator with default settings and an entropy-seeded sampler.
    pub fn new() -> Self {
        Self::with_settings(RobustSettings::default())
    }

    /// Estimator with the given settings. A `seed` in the settings makes the
    /// sampler reproducible.
    pub fn with_settings(settings: RobustSettings) -> Self {
        let sampler = match settings.seed {
            Some(seed) => UniformRandomSampler::from_seed(seed),
            None => UniformRandomSampler::new(),
        };
        Self::from_parts(settings, Sc::default(), sampler)
    }
}

impl<Sc, Sa> RobustEstimator<Sc, Sa>
where
    Sc: Scoring,
    Sa: Sampler,
{
    /// Create an estimator from its components.
    pub fn from_parts(settings: RobustSettings, scoring: Sc, sampler: Sa) -> Self {
        Self {
            settings,
            scoring,
            sampler,
            best_sample: Vec::new(),
            best_score: None,
            inliers: Vec::new(),
            inlier_fraction: 0.0,
        }
    }

    /// Fraction of samples classified as inliers by the last `solve`.
    pub fn inlier_fraction(&self) -> f64 {
        self.inlier_fraction
    }

    /// Inlier indices found by the last `solve`, in ascending order.
    pub fn inlier_indices(&self) -> &[usize] {
        &self.inliers
    }

    /// Minimal sample of the best trial of the last `solve`.
    pub fn best_sample(&self) -> &[usize] {
        &self.best_sample
    }

    /// Score of the best trial of the last `solve`.
    pub fn best_score(&self) -> Option<&Sc::Score> {
        self.best_score.as_ref()
    }

    /// [`solve`](Self::solve) with [`DEFAULT_THRESHOLD`] and the iteration
    /// count from the settings.
    pub fn solve_default<P>(&mut self, problem: &P) -> Result<Estimate<P::Model>, EstimationError>
    where
        P: EstimationProblem + Sync,
        P::Model: Send + Sync,
        Sc: Sync,
        Sc::Score: Send + Sync,
    {
        let iterations = self.settings.iterations;
        self.solve(problem, DEFAULT_THRESHOLD, iterations)
    }

    /// Run the sample-consensus loop on `problem`.
    ///
    /// `iterations` may be [`Iterations::Auto`] (or any non-positive count),
    /// in which case the count is derived from the configured confidence and
    /// inlier ratio.
    pub fn solve<P>(
        &mut self,
        problem: &P,
        threshold: f64,
        iterations: impl Into<Iterations>,
    ) -> Result<Estimate<P::Model>, EstimationError>
    where
        P: EstimationProblem + Sync,
        P::Model: Send + Sync,
        Sc: Sync,
        Sc::Score: Send + Sync,
    {
        let total_samples = problem.total_samples();
        let sample_size = problem.min_samples();
        if sample_size == 0 {
            return Err(EstimationError::EmptyMinimalSample);
        }
        if total_samples < sample_size {
            return Err(EstimationError::NotEnoughSamples {
                available: total_samples,
                required: sample_size,
            });
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(EstimationError::InvalidThreshold { threshold });
        }

        let iterations = iterations.into().resolve(
            total_samples,
            self.settings.confidence,
            self.settings.inlier_ratio,
        );
        log::debug!(
            "{}: {iterations} trials over {total_samples} samples (minimal sample {sample_size}, threshold {threshold})",
            self.scoring.name()
        );

        self.best_sample = Vec::new();
        self.best_score = None;
        self.inliers = Vec::new();
        self.inlier_fraction = 0.0;

        // Samples come from the single sampler in trial order, so a seeded
        // run is reproducible whether trials are scored in parallel or not.
        let samples: Vec<Vec<usize>> = (0..iterations)
            .filter_map(|_| self.sampler.draw_sample(total_samples, sample_size))
            .collect();
        let requested = iterations;
        let iterations = samples.len();
        if iterations < requested {
            log::warn!(
                "{}: sampler produced {iterations} of {requested} requested samples",
                self.scoring.name()
            );
        }

        let scoring = &self.scoring;
        let initial = scoring.initial_score();
        let evaluate = |(index, sample): (usize, Vec<usize>)| {
            let model = problem.fit_from_samples(&sample)?;
            let score = scoring.score(problem, &model, threshold);
            scoring.is_better(&score, &initial).then_some(Trial {
                index,
                sample,
                model,
                score,
            })
        };
        // Ties go to the earlier trial, matching a sequential first-wins scan.
        let keep_best = |a: Trial<P::Model, Sc::Score>, b: Trial<P::Model, Sc::Score>| {
            if scoring.is_better(&b.score, &a.score) {
                b
            } else if scoring.is_better(&a.score, &b.score) || a.index < b.index {
                a
            } else {
                b
            }
        };

        let best = if self.settings.parallel {
            samples
                .into_par_iter()
                .enumerate()
                .filter_map(evaluate)
                .reduce_with(keep_best)
        } else {
            samples
                .into_iter()
                .enumerate()
                .filter_map(evaluate)
                .reduce(keep_best)
        };

        let Some(best) = best else {
            log::warn!(
                "{}: none of {iterations} trials produced a valid model",
                self.scoring.name()
            );
            return Err(EstimationError::NoValidModel { iterations });
        };

        let objective = self.scoring.objective(&best.score);
        self.best_sample = best.sample;
        self.best_score = Some(best.score);
        let mut model = best.model;

        self.extract_inliers(problem, &model, threshold);

        if self.scoring.refit_on_consensus() {
            if self.inliers.len() < sample_size {
                log::warn!(
                    "{}: {} inliers is below the minimal sample size {sample_size}, skipping consensus refit",
                    self.scoring.name(),
                    self.inliers.len()
                );
            } else if let Some(refined) = problem.fit_from_samples(&self.inliers) {
                model = refined;
            } else {
                log::warn!(
                    "{}: consensus set of {} samples is degenerate, keeping best-sample model",
                    self.scoring.name(),
                    self.inliers.len()
                );
            }
        }

        log::debug!(
            "{}: best objective {objective}, {} inliers ({:.3} of samples)",
            self.scoring.name(),
            self.inliers.len(),
            self.inlier_fraction
        );

        Ok(Estimate {
            model,
            inliers: self.inliers.clone(),
            inlier_fraction: self.inlier_fraction,
            best_sample: self.best_sample.clone(),
            objective,
            iterations,
        })
    }

    /// Classify every sample against `model`: a sample is an inlier when
    /// `error² < threshold²`. Updates the inlier indices and fraction.
    pub fn extract_inliers<P>(&mut self, problem: &P, model: &P::Model, threshold: f64)
    where
        P: EstimationProblem + Sync,
        P::Model: Sync,
    {
        let total_samples = problem.total_samples();
        let is_inlier =
            |&j: &usize| CONSENSUS_TEST.accepts(problem.error_for_sample(model, j), threshold);

        self.inliers = if self.settings.parallel {
            (0..total_samples).into_par_iter().filter(is_inlier).collect()
        } else {
            (0..total_samples).filter(is_inlier).collect()
        };
        self.inlier_fraction = if total_samples == 0 {
            0.0
        } else {
            self.inliers.len() as f64 / total_samples as f64
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{LmedsScoring, MsacScoring, RansacScoring};

    /// Samples are scalars; a model is a single value and the residual is
    /// the distance to it.
    struct ConstantProblem {
        values: Vec<f64>,
    }

    impl EstimationProblem for ConstantProblem {
        type Model = f64;

        fn total_samples(&self) -> usize {
            self.values.len()
        }

        fn min_samples(&self) -> usize {
            1
        }

        fn param_count(&self) -> usize {
            1
        }

        fn fit_from_samples(&self, indices: &[usize]) -> Option<f64> {
            let sum: f64 = indices.iter().map(|&i| self.values[i]).sum();
            Some(sum / indices.len() as f64)
        }

        fn error_for_sample(&self, model: &f64, index: usize) -> f64 {
            self.values[index] - model
        }
    }

    /// Every sample is degenerate.
    struct DegenerateProblem;

    impl EstimationProblem for DegenerateProblem {
        type Model = ();

        fn total_samples(&self) -> usize {
            5
        }

        fn min_samples(&self) -> usize {
            2
        }

        fn param_count(&self) -> usize {
            0
        }

        fn fit_from_samples(&self, _indices: &[usize]) -> Option<()> {
            None
        }

        fn error_for_sample(&self, _model: &(), _index: usize) -> f64 {
            0.0
        }
    }

    fn clustered() -> ConstantProblem {
        ConstantProblem {
            values: vec![1.0, 1.02, 0.98, 1.01, 0.99, 7.0, -4.0],
        }
    }

    fn settings(parallel: bool) -> RobustSettings {
        RobustSettings {
            parallel,
            seed: Some(11),
            ..RobustSettings::default()
        }
    }

    #[test]
    fn ransac_finds_cluster_and_refits() {
        let mut ransac = RobustEstimator::<RansacScoring>::with_settings(settings(false));
        let estimate = ransac.solve(&clustered(), 0.1, 50).unwrap();

        assert_eq!(estimate.inliers, vec![0, 1, 2, 3, 4]);
        assert!((estimate.model - 1.0).abs() < 1e-12);
        assert_eq!(ransac.inlier_indices(), &[0, 1, 2, 3, 4]);
        assert!((ransac.inlier_fraction() - 5.0 / 7.0).abs() < 1e-12);
        assert_eq!(estimate.iterations, 50);
    }

    #[test]
    fn msac_keeps_best_sample_model() {
        let problem = clustered();
        let mut msac = RobustEstimator::<MsacScoring>::with_settings(settings(false));
        let estimate = msac.solve(&problem, 0.1, 50).unwrap();

        // No consensus refit: the model is one of the data values.
        assert_eq!(estimate.best_sample.len(), 1);
        assert_eq!(estimate.model, problem.values[estimate.best_sample[0]]);
        assert_eq!(estimate.inliers, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn lmeds_picks_lowest_median() {
        let problem = clustered();
        let mut lmeds = RobustEstimator::<LmedsScoring>::with_settings(settings(false));
        let estimate = lmeds.solve(&problem, 0.1, 100).unwrap();

        assert_eq!(estimate.inliers, vec![0, 1, 2, 3, 4]);
        assert!((estimate.model - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let problem = clustered();
        let mut sequential = RobustEstimator::<LmedsScoring>::with_settings(settings(false));
        let mut parallel = RobustEstimator::<LmedsScoring>::with_settings(settings(true));

        let a = sequential.solve(&problem, 0.1, 200).unwrap();
        let b = parallel.solve(&problem, 0.1, 200).unwrap();

        assert_eq!(a.best_sample, b.best_sample);
        assert_eq!(a.inliers, b.inliers);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn state_resets_between_calls() {
        let mut ransac = RobustEstimator::<RansacScoring>::with_settings(settings(true));
        ransac.solve(&clustered(), 0.1, 30).unwrap();

        let spread = ConstantProblem {
            values: vec![0.0, 10.0, 20.0, 30.0],
        };
        ransac.solve(&spread, 0.1, 30).unwrap();

        assert_eq!(ransac.inlier_indices().len(), 1);
        assert!((ransac.inlier_fraction() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let mut ransac = RobustEstimator::<RansacScoring>::new();
        let empty = ConstantProblem { values: vec![] };

        assert_eq!(
            ransac.solve(&empty, 0.1, 10).unwrap_err(),
            EstimationError::NotEnoughSamples {
                available: 0,
                required: 1
            }
        );
        assert!(matches!(
            ransac.solve(&clustered(), -1.0, 10),
            Err(EstimationError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            ransac.solve(&clustered(), f64::NAN, 10),
            Err(EstimationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn all_degenerate_trials_is_an_error() {
        let mut msac = RobustEstimator::<MsacScoring>::new();
        assert_eq!(
            msac.solve(&DegenerateProblem, 0.1, 25).unwrap_err(),
            EstimationError::NoValidModel { iterations: 25 }
        );
    }

    /// Uniform sampler that fails every other draw.
    struct FlakySampler {
        inner: UniformRandomSampler,
        calls: usize,
    }

    impl Sampler for FlakySampler {
        fn sample(&mut self, total: usize, size: usize, out: &mut [usize]) -> bool {
            self.calls += 1;
            self.calls % 2 == 0 && self.inner.sample(total, size, out)
        }
    }

    #[test]
    fn reports_trials_actually_drawn() {
        let sampler = FlakySampler {
            inner: UniformRandomSampler::from_seed(11),
            calls: 0,
        };
        let mut ransac =
            RobustEstimator::from_parts(settings(false), RansacScoring::default(), sampler);
        let estimate = ransac.solve(&clustered(), 0.1, 40).unwrap();

        assert_eq!(ransac.sampler.calls, 40);
        assert_eq!(estimate.iterations, 20);
        assert_eq!(estimate.inliers, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn failing_sampler_reports_zero_trials() {
        let sampler = FlakySampler {
            inner: UniformRandomSampler::from_seed(11),
            calls: 0,
        };
        let mut msac = RobustEstimator::from_parts(settings(false), MsacScoring, sampler);
        assert_eq!(
            msac.solve(&clustered(), 0.1, 1).unwrap_err(),
            EstimationError::NoValidModel { iterations: 0 }
        );
    }

    #[test]
    fn best_score_describes_the_winning_trial() {
        let mut msac = RobustEstimator::<MsacScoring>::with_settings(settings(false));
        assert!(msac.best_score().is_none());

        let estimate = msac.solve(&clustered(), 0.1, 50).unwrap();
        let score = *msac.best_score().unwrap();
        assert_eq!(score.inlier_count, 5);
        assert_eq!(score.cost, estimate.objective);
        // Two outliers at the truncation cost plus a small in-cluster spread.
        assert!(score.cost > 0.02 && score.cost < 0.025);

        let mut lmeds = RobustEstimator::<LmedsScoring>::with_settings(settings(false));
        let estimate = lmeds.solve(&clustered(), 0.1, 100).unwrap();
        assert_eq!(lmeds.best_score().unwrap().median, estimate.objective);
    }

    #[test]
    fn settings_are_read_at_construction() {
        let mut reseeded = RobustEstimator::<MsacScoring>::with_settings(settings(false));
        reseeded.settings.seed = Some(99);
        reseeded.settings.strategy = crate::settings::StrategyType::Lmeds;
        let mut untouched = RobustEstimator::<MsacScoring>::with_settings(settings(false));

        let a = reseeded.solve(&clustered(), 0.1, 5).unwrap();
        let b = untouched.solve(&clustered(), 0.1, 5).unwrap();
        assert_eq!(a.best_sample, b.best_sample);
        assert_eq!(reseeded.scoring.name(), "MSAC");
        assert_eq!(a.objective, reseeded.best_score().unwrap().cost);
    }
}
