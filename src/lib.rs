//! # Robust Fit - Robust Model Estimation
//!
//! `robust_fit` estimates model parameters from data contaminated by
//! outliers. A fitting problem describes how to fit a model from a handful
//! of samples and how far each sample is from a model; the estimators draw
//! random minimal samples, fit a candidate from each and keep the one that
//! best explains the data:
//!
//! - **RANSAC** maximises the number of inliers.
//! - **MSAC** minimises the truncated squared error.
//! - **LMedS** minimises the median squared error.
//!
//! ## Quick Start
//!
//! ```rust
//! use robust_fit::{estimate_line, Iterations, RobustSettings};
//! use nalgebra::DMatrix;
//!
//! // Points on y = 2x + 1 plus one outlier.
//! let points = DMatrix::from_row_slice(
//!     6,
//!     2,
//!     &[0.0, 1.0, 1.0, 3.0, 2.0, 5.0, 3.0, 7.0, 4.0, 9.0, 2.0, -4.0],
//! );
//! let settings = RobustSettings {
//!     iterations: Iterations::Fixed(100),
//!     seed: Some(7),
//!     ..RobustSettings::default()
//! };
//!
//! let estimate = estimate_line(&points, 0.01, Some(settings)).unwrap();
//! assert_eq!(estimate.inliers, vec![0, 1, 2, 3, 4]);
//! assert!((estimate.model.slope() - 2.0).abs() < 1e-9);
//! ```
//!
//! ## Extending the Library
//!
//! Implement [`EstimationProblem`](core::EstimationProblem) for your own
//! model family and hand it to any estimator:
//!
//! ```rust
//! use robust_fit::core::EstimationProblem;
//! use robust_fit::scoring::Msac;
//! use robust_fit::RobustSettings;
//!
//! /// Estimate a constant from scalar samples.
//! struct Constant(Vec<f64>);
//!
//! impl EstimationProblem for Constant {
//!     type Model = f64;
//!
//!     fn total_samples(&self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn min_samples(&self) -> usize {
//!         1
//!     }
//!
//!     fn param_count(&self) -> usize {
//!         1
//!     }
//!
//!     fn fit_from_samples(&self, indices: &[usize]) -> Option<f64> {
//!         let sum: f64 = indices.iter().map(|&i| self.0[i]).sum();
//!         Some(sum / indices.len() as f64)
//!     }
//!
//!     fn error_for_sample(&self, model: &f64, index: usize) -> f64 {
//!         self.0[index] - model
//!     }
//! }
//!
//! let problem = Constant(vec![1.0, 1.0, 1.0, 9.0]);
//! let mut msac = Msac::with_settings(RobustSettings {
//!     seed: Some(1),
//!     ..RobustSettings::default()
//! });
//! let estimate = msac.solve(&problem, 0.5, 20).unwrap();
//! assert_eq!(estimate.model, 1.0);
//! assert_eq!(estimate.inliers, vec![0, 1, 2]);
//! ```
//!
//! ## Modules
//!
//! - **[`api`](api)**: High-level functions for the reference problems
//! - **[`core`](core)**: Core traits and the sample-consensus pipeline
//! - **[`scoring`](scoring)**: RANSAC, MSAC and LMedS objectives
//! - **[`samplers`](samplers)**: Minimal-sample samplers
//! - **[`iterations`](iterations)**: Iteration count estimation
//! - **[`problems`](problems)**: Line, circle, plane and sphere fitting
//! - **[`models`](models)**: Geometric model types
//! - **[`settings`](settings)**: Configuration types

pub mod api;
pub mod choices;
pub mod core;
pub mod error;
pub mod iterations;
pub mod models;
pub mod problems;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod types;
pub mod utils;

// Re-export high-level API
pub use api::{estimate_circle, estimate_line, estimate_plane, estimate_sphere};

// Re-export core traits for easy access
pub use crate::core::{Estimate, EstimationProblem, RobustEstimator, Sampler, Scoring};

pub use choices::StrategyChoice;
pub use error::EstimationError;
pub use iterations::{estimate_iterations, Iterations};
pub use scoring::{Lmeds, Msac, Ransac};
pub use settings::{RobustSettings, StrategyType};
