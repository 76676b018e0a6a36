//! Reference fitting problems.
//!
//! Each problem owns its points and implements
//! [`EstimationProblem`](crate::core::EstimationProblem):
//! - Line fitting (2D, minimal sample 2)
//! - Circle fitting (2D, minimal sample 3)
//! - Plane fitting (3D, minimal sample 3)
//! - Sphere fitting (3D, minimal sample 4)
//!
//! Minimal samples are solved in closed form; larger index sets (the
//! consensus refit) are solved in the least-squares sense.

pub mod circle;
pub mod line;
pub mod plane;
pub mod sphere;

pub use circle::CircleFitting;
pub use line::LineFitting;
pub use plane::PlaneFitting;
pub use sphere::SphereFitting;

use nalgebra::{Point2, Point3, Vector3};

use crate::error::EstimationError;
use crate::types::DataMatrix;

/// Sine of the angle below which three points count as collinear.
pub const COLLINEARITY_TOLERANCE: f64 = 1e-3;

/// `true` when `p`, `q`, `r` are (nearly) collinear or two of them coincide.
///
/// Both checks are relative, so the answer does not depend on the units of
/// the data.
pub(crate) fn collinear(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> bool {
    let u = q - p;
    let v = r - p;
    let (lu, lv) = (u.norm(), v.norm());
    if lu <= negligible_length(&[p, q]) || lv <= negligible_length(&[p, r]) {
        return true;
    }
    u.cross(&v).norm() / (lu * lv) < COLLINEARITY_TOLERANCE
}

/// Length below which an offset between `points` is rounding noise.
pub(crate) fn negligible_length(points: &[&Point3<f64>]) -> f64 {
    let magnitude = points.iter().map(|p| p.coords.norm()).fold(0.0, f64::max);
    4.0 * f64::EPSILON * magnitude
}

/// Root mean square of values given as squared norms. `None` when zero or
/// not finite.
pub(crate) fn rms_norm(squared: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = squared.len() as f64;
    let rms = (squared.sum::<f64>() / n).sqrt();
    (rms.is_finite() && rms > 0.0).then_some(rms)
}

pub(crate) fn lift(p: &Point2<f64>) -> Point3<f64> {
    Point3::new(p.x, p.y, 0.0)
}

pub(crate) fn centroid3(points: impl ExactSizeIterator<Item = Point3<f64>>) -> Point3<f64> {
    let n = points.len() as f64;
    let sum = points.fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / n)
}

fn check_cols(data: &DataMatrix, expected: usize) -> Result<(), EstimationError> {
    if data.ncols() != expected {
        return Err(EstimationError::InvalidDimensions {
            expected,
            rows: data.nrows(),
            cols: data.ncols(),
        });
    }
    Ok(())
}

pub(crate) fn points2_from_matrix(data: &DataMatrix) -> Result<Vec<Point2<f64>>, EstimationError> {
    check_cols(data, 2)?;
    Ok((0..data.nrows())
        .map(|i| Point2::new(data[(i, 0)], data[(i, 1)]))
        .collect())
}

pub(crate) fn points3_from_matrix(data: &DataMatrix) -> Result<Vec<Point3<f64>>, EstimationError> {
    check_cols(data, 3)?;
    Ok((0..data.nrows())
        .map(|i| Point3::new(data[(i, 0)], data[(i, 1)], data[(i, 2)]))
        .collect())
}

pub(crate) fn points2_from_xy(x: &[f64], y: &[f64]) -> Result<Vec<Point2<f64>>, EstimationError> {
    if x.len() != y.len() {
        return Err(EstimationError::LengthMismatch {
            lengths: vec![x.len(), y.len()],
        });
    }
    Ok(x.iter().zip(y).map(|(&x, &y)| Point2::new(x, y)).collect())
}

pub(crate) fn points3_from_xyz(
    x: &[f64],
    y: &[f64],
    z: &[f64],
) -> Result<Vec<Point3<f64>>, EstimationError> {
    if x.len() != y.len() || x.len() != z.len() {
        return Err(EstimationError::LengthMismatch {
            lengths: vec![x.len(), y.len(), z.len()],
        });
    }
    Ok(x.iter()
        .zip(y)
        .zip(z)
        .map(|((&x, &y), &z)| Point3::new(x, y, z))
        .collect())
}
