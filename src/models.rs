//! Geometric models produced by the reference fitting problems.

use nalgebra::{Point2, Point3, Vector3};

/// 2D line `a·x + b·y + c = 0` with `a² + b² = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    /// Build a line from unnormalized coefficients. Returns `None` when
    /// `(a, b)` is zero or not finite.
    pub fn new(a: f64, b: f64, c: f64) -> Option<Self> {
        let norm = a.hypot(b);
        if !norm.is_finite() || norm == 0.0 {
            return None;
        }
        Some(Self {
            a: a / norm,
            b: b / norm,
            c: c / norm,
        })
    }

    /// `k` in `y = k·x + m`; infinite for a vertical line.
    pub fn slope(&self) -> f64 {
        -self.a / self.b
    }

    /// `m` in `y = k·x + m`; infinite for a vertical line.
    pub fn intercept(&self) -> f64 {
        -self.c / self.b
    }

    /// Unsigned perpendicular distance from `p`.
    pub fn distance(&self, p: &Point2<f64>) -> f64 {
        (self.a * p.x + self.b * p.y + self.c).abs()
    }
}

/// Circle in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Distance from `p` to the circumference.
    pub fn distance(&self, p: &Point2<f64>) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }
}

/// Plane `n·p + d = 0` with a unit normal `n`.
///
/// The sign is fixed so that the largest-magnitude component of the normal
/// is positive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Plane {
    /// Plane through `point` with normal `normal` (need not be unit length).
    /// Returns `None` for a zero or non-finite normal.
    pub fn from_point_normal(point: &Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm == 0.0 {
            return None;
        }
        let mut normal = normal / norm;
        if normal[normal.iamax()] < 0.0 {
            normal = -normal;
        }
        let d = -normal.dot(&point.coords);
        Some(Self { normal, d })
    }

    /// Coefficients `(a, b, c, d)`.
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        (self.normal.dot(&p.coords) + self.d).abs()
    }
}

/// Sphere in 3D.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Distance from `p` to the surface.
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn line_slope_form() {
        // y = 2x + 1  <=>  2x - y + 1 = 0
        let line = Line::new(2.0, -1.0, 1.0).unwrap();
        assert_abs_diff_eq!(line.slope(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(line.intercept(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(line.distance(&Point2::new(0.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            line.distance(&Point2::new(0.0, 0.0)),
            1.0 / 5.0_f64.sqrt(),
            epsilon = 1e-12
        );
        assert!(Line::new(0.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn plane_normal_is_canonical() {
        let p = Point3::new(0.0, 0.0, 2.0);
        let up = Plane::from_point_normal(&p, Vector3::new(0.0, 0.0, 3.0)).unwrap();
        let down = Plane::from_point_normal(&p, Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(up, down);
        assert_eq!(up.coefficients(), [0.0, 0.0, 1.0, -2.0]);
        assert_abs_diff_eq!(up.distance(&Point3::new(5.0, -1.0, 3.5)), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn circle_and_sphere_distances() {
        let circle = Circle::new(Point2::new(1.0, 1.0), 2.0);
        assert_abs_diff_eq!(circle.distance(&Point2::new(1.0, 4.0)), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(circle.distance(&Point2::new(1.0, 1.0)), 2.0, epsilon = 1e-12);

        let sphere = Sphere::new(Point3::origin(), 1.0);
        assert_abs_diff_eq!(sphere.distance(&Point3::new(0.0, 0.0, 3.0)), 2.0, epsilon = 1e-12);
    }
}
