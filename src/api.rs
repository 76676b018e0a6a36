//! High-level Rust API.
//!
//! One function per reference problem. Each takes a row-per-point matrix,
//! builds the problem, picks the strategy from the settings and runs it.

use crate::choices::StrategyChoice;
use crate::core::{Estimate, EstimationProblem};
use crate::error::EstimationError;
use crate::models::{Circle, Line, Plane, Sphere};
use crate::problems::{CircleFitting, LineFitting, PlaneFitting, SphereFitting};
use crate::settings::RobustSettings;
use crate::types::DataMatrix;

fn run<P>(
    problem: &P,
    threshold: f64,
    settings_opt: Option<RobustSettings>,
) -> Result<Estimate<P::Model>, EstimationError>
where
    P: EstimationProblem + Sync,
    P::Model: Send + Sync,
{
    let settings = settings_opt.unwrap_or_default();
    let iterations = settings.iterations;
    let mut strategy = StrategyChoice::from_settings(settings);
    strategy.solve(problem, threshold, iterations)
}

/// Fit a 2D line to points with outliers.
///
/// # Arguments
/// * `points` - 2D points (Nx2 matrix)
/// * `threshold` - Inlier threshold on the perpendicular distance
/// * `settings_opt` - Optional settings (uses defaults if None)
///
/// # Returns
/// `Estimate` containing the line, its inliers and the iteration count.
pub fn estimate_line(
    points: &DataMatrix,
    threshold: f64,
    settings_opt: Option<RobustSettings>,
) -> Result<Estimate<Line>, EstimationError> {
    let problem = LineFitting::from_matrix(points)?;
    run(&problem, threshold, settings_opt)
}

/// Fit a circle to 2D points with outliers.
///
/// # Arguments
/// * `points` - 2D points (Nx2 matrix)
/// * `threshold` - Inlier threshold on the radial distance
/// * `settings_opt` - Optional settings (uses defaults if None)
pub fn estimate_circle(
    points: &DataMatrix,
    threshold: f64,
    settings_opt: Option<RobustSettings>,
) -> Result<Estimate<Circle>, EstimationError> {
    let problem = CircleFitting::from_matrix(points)?;
    run(&problem, threshold, settings_opt)
}

/// Fit a plane to 3D points with outliers.
///
/// # Arguments
/// * `points` - 3D points (Nx3 matrix)
/// * `threshold` - Inlier threshold on the point-to-plane distance
/// * `settings_opt` - Optional settings (uses defaults if None)
pub fn estimate_plane(
    points: &DataMatrix,
    threshold: f64,
    settings_opt: Option<RobustSettings>,
) -> Result<Estimate<Plane>, EstimationError> {
    let problem = PlaneFitting::from_matrix(points)?;
    run(&problem, threshold, settings_opt)
}

/// Fit a sphere to 3D points with outliers.
pub fn estimate_sphere(
    points: &DataMatrix,
    threshold: f64,
    settings_opt: Option<RobustSettings>,
) -> Result<Estimate<Sphere>, EstimationError> {
    let problem = SphereFitting::from_matrix(points)?;
    run(&problem, threshold, settings_opt)
}
