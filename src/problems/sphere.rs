//! Sphere fitting for 3D points.

use nalgebra::{DMatrix, DVector, Matrix3, Point3, Vector3};

use crate::core::EstimationProblem;
use crate::error::EstimationError;
use crate::models::Sphere;
use crate::types::DataMatrix;

/// Normalized volume below which four points count as coplanar.
const COPLANARITY_TOLERANCE: f64 = 1e-3;

/// Sphere fitting problem.
///
/// Four non-coplanar points define a sphere. Larger sets use an algebraic
/// least-squares fit in centered coordinates.
#[derive(Debug, Clone)]
pub struct SphereFitting {
    points: Vec<Point3<f64>>,
}

impl SphereFitting {
    /// Take ownership of `points`.
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Build from parallel coordinate slices.
    pub fn from_xyz(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self, EstimationError> {
        super::points3_from_xyz(x, y, z).map(Self::new)
    }

    /// Build from an `N×3` matrix.
    pub fn from_matrix(data: &DataMatrix) -> Result<Self, EstimationError> {
        super::points3_from_matrix(data).map(Self::new)
    }

    /// Points in input order; sample `i` is `points()[i]`.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Offsets of the last three sampled points from the first, as rows.
    fn offsets(&self, sample: &[usize]) -> Option<Matrix3<f64>> {
        match sample {
            &[i, j, k, l, ..] => {
                let p = self.points[i];
                let rows = [j, k, l].map(|m| (self.points[m] - p).transpose());
                Some(Matrix3::from_rows(&rows))
            }
            _ => None,
        }
    }

    /// `true` when the indexed points cannot define a unique sphere: fewer
    /// than four of them, or the first four (nearly) coplanar.
    pub fn is_degenerate(&self, sample: &[usize]) -> bool {
        let Some(q) = self.offsets(sample) else {
            return true;
        };
        let corners = [0, 1, 2, 3].map(|m| &self.points[sample[m]]);
        let negligible = super::negligible_length(&corners);
        let lengths = [0, 1, 2].map(|r| q.row(r).norm());
        if lengths.iter().any(|&len| len <= negligible) {
            return true;
        }
        q.determinant().abs() / lengths.iter().product::<f64>() < COPLANARITY_TOLERANCE
    }

    fn fit_minimal(&self, sample: &[usize]) -> Option<Sphere> {
        if self.is_degenerate(sample) {
            return None;
        }
        let q = self.offsets(sample)?;
        let p = self.points[sample[0]];

        // |p + u - pᵢ|² = |u|²  =>  2·qᵢ·u = |qᵢ|².
        let rhs = Vector3::from_iterator(q.row_iter().map(|row| row.norm_squared()));
        let u = (2.0 * q).lu().solve(&rhs)?;

        let radius = u.norm();
        radius.is_finite().then(|| Sphere::new(p + u, radius))
    }

    fn fit_least_squares(&self, indices: &[usize]) -> Option<Sphere> {
        let n = indices.len();
        let origin = super::centroid3(indices.iter().map(|&i| self.points[i]));
        let offsets: Vec<Vector3<f64>> =
            indices.iter().map(|&i| self.points[i] - origin).collect();
        let scale = super::rms_norm(offsets.iter().map(|q| q.norm_squared()))?;

        let mut a = DMatrix::zeros(n, 4);
        let mut rhs = DVector::zeros(n);
        for (row, q) in offsets.iter().enumerate() {
            let q = q / scale;
            a[(row, 0)] = 2.0 * q.x;
            a[(row, 1)] = 2.0 * q.y;
            a[(row, 2)] = 2.0 * q.z;
            a[(row, 3)] = 1.0;
            rhs[row] = q.norm_squared();
        }

        let svd = a.svd(true, true);
        if svd.rank(1e-10 * svd.singular_values.max()) < 4 {
            return None;
        }
        let x = svd.solve(&rhs, 1e-12).ok()?;

        let u = Vector3::new(x[0], x[1], x[2]);
        let radius_sq = x[3] + u.norm_squared();
        if radius_sq.is_nan() || radius_sq <= 0.0 {
            return None;
        }
        Some(Sphere::new(origin + u * scale, radius_sq.sqrt() * scale))
    }
}

impl EstimationProblem for SphereFitting {
    type Model = Sphere;

    fn total_samples(&self) -> usize {
        self.points.len()
    }

    fn min_samples(&self) -> usize {
        4
    }

    fn param_count(&self) -> usize {
        4
    }

    fn fit_from_samples(&self, indices: &[usize]) -> Option<Sphere> {
        match indices.len() {
            0..=3 => None,
            4 => self.fit_minimal(indices),
            _ => self.fit_least_squares(indices),
        }
    }

    fn error_for_sample(&self, model: &Sphere, index: usize) -> f64 {
        model.distance(&self.points[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Msac;
    use crate::settings::RobustSettings;
    use approx::assert_abs_diff_eq;

    fn unit_sphere_points() -> SphereFitting {
        SphereFitting::from_xyz(
            &[0.0, 0.0, 1.0, 0.0, -1.0, 0.0],
            &[0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            &[1.0, 0.0, 0.0, -1.0, 0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn four_points_define_the_sphere() {
        let problem = unit_sphere_points();
        let sphere = problem.fit_from_samples(&[0, 1, 2, 3]).unwrap();
        assert_abs_diff_eq!(sphere.center, Point3::origin(), epsilon = 1e-12);
        assert_abs_diff_eq!(sphere.radius, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn coplanar_points_are_degenerate() {
        let problem = SphereFitting::from_xyz(
            &[0.0, 1.0, 0.0, 1.0],
            &[0.0, 0.0, 1.0, 1.0],
            &[2.0, 2.0, 2.0, 2.0],
        )
        .unwrap();
        assert!(problem.is_degenerate(&[0, 1, 2, 3]));
        assert!(problem.fit_from_samples(&[0, 1, 2, 3]).is_none());
        assert!(problem.is_degenerate(&[0, 1, 2]));
    }

    #[test]
    fn least_squares_recovers_offset_sphere() {
        let center = Point3::new(1.0, -2.0, 0.5);
        let radius = 3.0;
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 1..5 {
                let theta = i as f64 * std::f64::consts::TAU / 6.0;
                let phi = j as f64 * std::f64::consts::PI / 5.0;
                let dir = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
                points.push(center + radius * dir);
            }
        }
        let problem = SphereFitting::new(points);
        let all: Vec<usize> = (0..problem.total_samples()).collect();
        let sphere = problem.fit_from_samples(&all).unwrap();
        assert_abs_diff_eq!(sphere.center, center, epsilon = 1e-9);
        assert_abs_diff_eq!(sphere.radius, radius, epsilon = 1e-9);
    }

    #[test]
    fn small_units_are_not_degenerate() {
        let unit = unit_sphere_points();
        let points = unit.points().iter().map(|p| Point3::from(p.coords * 1e-9)).collect();
        let problem = SphereFitting::new(points);
        assert!(!problem.is_degenerate(&[0, 1, 2, 3]));

        let sphere = problem.fit_from_samples(&[0, 1, 2, 3]).unwrap();
        assert_abs_diff_eq!(sphere.radius, 1e-9, epsilon = 1e-21);

        let all: Vec<usize> = (0..6).collect();
        let sphere = problem.fit_from_samples(&all).unwrap();
        assert_abs_diff_eq!(sphere.center, Point3::origin(), epsilon = 1e-21);
        assert_abs_diff_eq!(sphere.radius, 1e-9, epsilon = 1e-21);

        let mut msac = Msac::with_settings(RobustSettings {
            seed: Some(9),
            ..RobustSettings::default()
        });
        let estimate = msac.solve(&problem, 1e-12, 50).unwrap();
        assert_eq!(estimate.inliers, all);
    }

    #[test]
    fn coincident_points_are_degenerate_at_any_scale() {
        for scale in [1e-9, 1.0, 1e6] {
            let p = Point3::new(1.0, 2.0, 3.0) * scale;
            let problem = SphereFitting::new(vec![
                p,
                p,
                Point3::new(0.0, 1.0, 0.0) * scale,
                Point3::new(0.0, 0.0, 1.0) * scale,
            ]);
            assert!(problem.is_degenerate(&[0, 1, 2, 3]), "scale {scale}");
        }
    }
}
