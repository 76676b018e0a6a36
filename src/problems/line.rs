//! Line fitting for 2D points.

use nalgebra::Point2;

use crate::core::EstimationProblem;
use crate::error::EstimationError;
use crate::models::Line;
use crate::types::DataMatrix;

/// Squared relative offset that is indistinguishable from rounding.
const ROUNDING_SQ: f64 = 16.0 * f64::EPSILON * f64::EPSILON;

/// Line fitting problem.
///
/// Residuals are perpendicular point-to-line distances. Two points define a
/// line; larger sets are fitted by total least squares.
#[derive(Debug, Clone)]
pub struct LineFitting {
    points: Vec<Point2<f64>>,
}

impl LineFitting {
    /// Take ownership of `points`.
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Build from parallel coordinate slices.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Result<Self, EstimationError> {
        super::points2_from_xy(x, y).map(Self::new)
    }

    /// Build from an `N×2` matrix.
    pub fn from_matrix(data: &DataMatrix) -> Result<Self, EstimationError> {
        super::points2_from_matrix(data).map(Self::new)
    }

    /// Points in input order; sample `i` is `points()[i]`.
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    fn fit_minimal(&self, i: usize, j: usize) -> Option<Line> {
        let p = self.points[i];
        let q = self.points[j];
        let magnitude = p.coords.norm_squared().max(q.coords.norm_squared());
        if (q - p).norm_squared() <= ROUNDING_SQ * magnitude {
            return None;
        }

        // Cross product of the homogeneous points [x1, y1, 1] × [x2, y2, 1].
        Line::new(p.y - q.y, q.x - p.x, p.x * q.y - q.x * p.y)
    }

    fn fit_least_squares(&self, indices: &[usize]) -> Option<Line> {
        let n = indices.len() as f64;
        let (sx, sy) = indices.iter().fold((0.0, 0.0), |(sx, sy), &i| {
            (sx + self.points[i].x, sy + self.points[i].y)
        });
        let cx = sx / n;
        let cy = sy / n;

        let mut cov_xx = 0.0;
        let mut cov_xy = 0.0;
        let mut cov_yy = 0.0;
        for &i in indices {
            let dx = self.points[i].x - cx;
            let dy = self.points[i].y - cy;
            cov_xx += dx * dx;
            cov_xy += dx * dy;
            cov_yy += dy * dy;
        }
        // Spread indistinguishable from rounding around the centroid.
        let spread = cov_xx + cov_yy;
        if spread <= ROUNDING_SQ * n * (cx * cx + cy * cy) {
            return None;
        }

        // The normal is the eigenvector of the smaller eigenvalue of the
        // scatter matrix. Of the two equivalent expressions pick the one
        // with the larger norm.
        let lambda = 0.5 * (cov_xx + cov_yy - (cov_xx - cov_yy).hypot(2.0 * cov_xy));
        let (u, v) = ((cov_xy, lambda - cov_xx), (lambda - cov_yy, cov_xy));
        let (a, b) = if u.0.hypot(u.1) >= v.0.hypot(v.1) { u } else { v };

        let line = Line::new(a, b, 0.0)?;
        Some(Line {
            c: -(line.a * cx + line.b * cy),
            ..line
        })
    }
}

impl EstimationProblem for LineFitting {
    type Model = Line;

    fn total_samples(&self) -> usize {
        self.points.len()
    }

    fn min_samples(&self) -> usize {
        2
    }

    fn param_count(&self) -> usize {
        2
    }

    fn fit_from_samples(&self, indices: &[usize]) -> Option<Line> {
        match indices {
            [] | [_] => None,
            &[i, j] => self.fit_minimal(i, j),
            _ => self.fit_least_squares(indices),
        }
    }

    fn error_for_sample(&self, model: &Line, index: usize) -> f64 {
        model.distance(&self.points[index])
    }
}
