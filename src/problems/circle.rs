//! Circle fitting for 2D points.

use nalgebra::{DMatrix, DVector, Point2, Vector2};

use crate::core::EstimationProblem;
use crate::error::EstimationError;
use crate::models::Circle;
use crate::types::DataMatrix;

/// Circle fitting problem.
///
/// Three non-collinear points define a circle; larger sets use an algebraic
/// (Kasa) least-squares fit. Residuals are radial distances.
#[derive(Debug, Clone)]
pub struct CircleFitting {
    points: Vec<Point2<f64>>,
}

impl CircleFitting {
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

    /// `true` when the indexed points cannot define a unique circle: fewer
    /// than three of them, or the first three (nearly) collinear.
    pub fn is_degenerate(&self, sample: &[usize]) -> bool {
        match sample {
            &[i, j, k, ..] => super::collinear(
                &super::lift(&self.points[i]),
                &super::lift(&self.points[j]),
                &super::lift(&self.points[k]),
            ),
            _ => true,
        }
    }

    fn fit_minimal(&self, sample: &[usize]) -> Option<Circle> {
        if self.is_degenerate(sample) {
            return None;
        }
        let p = self.points[sample[0]];
        let b = self.points[sample[1]] - p;
        let c = self.points[sample[2]] - p;

        // Circumcenter relative to p.
        let d = 2.0 * (b.x * c.y - b.y * c.x);
        let (bb, cc) = (b.norm_squared(), c.norm_squared());
        let u = Vector2::new((c.y * bb - b.y * cc) / d, (b.x * cc - c.x * bb) / d);

        let radius = u.norm();
        radius.is_finite().then(|| Circle::new(p + u, radius))
    }

    fn fit_least_squares(&self, indices: &[usize]) -> Option<Circle> {
        let n = indices.len();
        let centroid = super::centroid3(indices.iter().map(|&i| super::lift(&self.points[i])));
        let origin = Point2::new(centroid.x, centroid.y);
        let offsets: Vec<Vector2<f64>> =
            indices.iter().map(|&i| self.points[i] - origin).collect();
        let scale = super::rms_norm(offsets.iter().map(|q| q.norm_squared()))?;

        // x² + y² = 2·cx·x + 2·cy·y + (r² - cx² - cy²), in centered
        // coordinates measured in units of `scale`.
        let mut a = DMatrix::zeros(n, 3);
        let mut rhs = DVector::zeros(n);
        for (row, q) in offsets.iter().enumerate() {
            let q = q / scale;
            a[(row, 0)] = 2.0 * q.x;
            a[(row, 1)] = 2.0 * q.y;
            a[(row, 2)] = 1.0;
            rhs[row] = q.norm_squared();
        }

        let svd = a.svd(true, true);
        if svd.rank(1e-10 * svd.singular_values.max()) < 3 {
            return None;
        }
        let x = svd.solve(&rhs, 1e-12).ok()?;

        let u = Vector2::new(x[0], x[1]);
        let radius_sq = x[2] + u.norm_squared();
        if radius_sq.is_nan() || radius_sq <= 0.0 {
            return None;
        }
        Some(Circle::new(origin + u * scale, radius_sq.sqrt() * scale))
    }
}

impl EstimationProblem for CircleFitting {
    type Model = Circle;

    fn total_samples(&self) -> usize {
        self.points.len()
    }

    fn min_samples(&self) -> usize {
        3
    }

    fn param_count(&self) -> usize {
        3
    }

    fn fit_from_samples(&self, indices: &[usize]) -> Option<Circle> {
        match indices.len() {
            0..=2 => None,
            3 => self.fit_minimal(indices),
            _ => self.fit_least_squares(indices),
        }
    }

    fn error_for_sample(&self, model: &Circle, index: usize) -> f64 {
        model.distance(&self.points[index])
    }
}
