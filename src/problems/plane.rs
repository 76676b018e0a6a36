//! Plane fitting for 3D points.

use nalgebra::{Matrix3, Point3};

use crate::core::EstimationProblem;
use crate::error::EstimationError;
use crate::models::Plane;
use crate::types::DataMatrix;

/// Plane fitting problem.
///
/// Three non-collinear points define a plane. Larger sets are fitted by
/// orthogonal regression: the normal is the eigenvector of the smallest
/// eigenvalue of the scatter matrix.
#[derive(Debug, Clone)]
pub struct PlaneFitting {
    points: Vec<Point3<f64>>,
}

impl PlaneFitting {
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

    /// `true` when the indexed points cannot define a unique plane: fewer
    /// than three of them, or the first three (nearly) collinear.
    pub fn is_degenerate(&self, sample: &[usize]) -> bool {
        match sample {
            &[i, j, k, ..] => {
                super::collinear(&self.points[i], &self.points[j], &self.points[k])
            }
            _ => true,
        }
    }

    fn fit_minimal(&self, sample: &[usize]) -> Option<Plane> {
        if self.is_degenerate(sample) {
            return None;
        }
        let p = self.points[sample[0]];
        let normal = (self.points[sample[1]] - p).cross(&(self.points[sample[2]] - p));
        Plane::from_point_normal(&p, normal)
    }

    fn fit_least_squares(&self, indices: &[usize]) -> Option<Plane> {
        let centroid = super::centroid3(indices.iter().map(|&i| self.points[i]));
        let scatter = indices.iter().fold(Matrix3::zeros(), |acc, &i| {
            let q = self.points[i] - centroid;
            acc + q * q.transpose()
        });

        let eigen = scatter.symmetric_eigen();
        let mut order = [0, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let [smallest, middle, largest] = order;

        // A second vanishing eigenvalue means the points span at most a line.
        if eigen.eigenvalues[middle] <= 1e-12 * eigen.eigenvalues[largest] {
            return None;
        }
        Plane::from_point_normal(&centroid, eigen.eigenvectors.column(smallest).into_owned())
    }
}

impl EstimationProblem for PlaneFitting {
    type Model = Plane;

    fn total_samples(&self) -> usize {
        self.points.len()
    }

    fn min_samples(&self) -> usize {
        3
    }

    fn param_count(&self) -> usize {
        4
    }

    fn fit_from_samples(&self, indices: &[usize]) -> Option<Plane> {
        match indices.len() {
            0..=2 => None,
            3 => self.fit_minimal(indices),
            _ => self.fit_least_squares(indices),
        }
    }

    fn error_for_sample(&self, model: &Plane, index: usize) -> f64 {
        model.distance(&self.points[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Grid on `z = 0.5·x - 0.25·y + 2`.
    fn tilted_grid() -> PlaneFitting {
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..4 {
                let (x, y) = (i as f64, j as f64);
                points.push(Point3::new(x, y, 0.5 * x - 0.25 * y + 2.0));
            }
        }
        PlaneFitting::new(points)
    }

    #[test]
    fn three_points_define_the_plane() {
        let problem = PlaneFitting::from_xyz(&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[3.0, 3.0, 3.0])
            .unwrap();
        let plane = problem.fit_from_samples(&[0, 1, 2]).unwrap();
        assert_eq!(plane.coefficients(), [0.0, 0.0, 1.0, -3.0]);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let problem = PlaneFitting::from_xyz(
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 1.0, 2.0, 3.0],
        )
        .unwrap();
        assert!(problem.is_degenerate(&[0, 1, 2]));
        assert!(problem.fit_from_samples(&[0, 1, 2]).is_none());
        assert!(problem.fit_from_samples(&[0, 1, 2, 3]).is_none());
    }

    #[test]
    fn least_squares_recovers_tilted_plane() {
        let problem = tilted_grid();
        let all: Vec<usize> = (0..problem.total_samples()).collect();
        let plane = problem.fit_from_samples(&all).unwrap();
        for i in all {
            assert_abs_diff_eq!(problem.error_for_sample(&plane, i), 0.0, epsilon = 1e-9);
        }
        // Normal is parallel to (0.5, -0.25, -1); canonical sign makes z positive.
        let expected = nalgebra::Vector3::new(-0.5, 0.25, 1.0).normalize();
        assert_abs_diff_eq!(plane.normal, expected, epsilon = 1e-9);
    }

    #[test]
    fn minimal_and_least_squares_agree_on_exact_data() {
        let problem = tilted_grid();
        let minimal = problem.fit_from_samples(&[0, 7, 13]).unwrap();
        let full = problem
            .fit_from_samples(&(0..problem.total_samples()).collect::<Vec<_>>())
            .unwrap();
        assert_abs_diff_eq!(minimal.normal, full.normal, epsilon = 1e-9);
        assert_abs_diff_eq!(minimal.d, full.d, epsilon = 1e-9);
    }

    #[test]
    fn small_units_are_not_degenerate() {
        let grid = tilted_grid();
        let points = grid.points().iter().map(|p| Point3::from(p.coords * 1e-9)).collect();
        let problem = PlaneFitting::new(points);
        assert!(!problem.is_degenerate(&[0, 7, 13]));
        let plane = problem.fit_from_samples(&[0, 7, 13]).unwrap();
        let expected = nalgebra::Vector3::new(-0.5, 0.25, 1.0).normalize();
        assert_abs_diff_eq!(plane.normal, expected, epsilon = 1e-9);
    }
}
