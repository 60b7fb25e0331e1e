//! Bounding sphere.

use super::{Box3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A sphere; a negative radius marks it empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center.
    pub center: Vector3,
    /// Radius.
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Sphere {
    /// Sphere containing nothing.
    pub const EMPTY: Self = Self::new(Vector3::ZERO, -1.0);

    /// Create a sphere.
    #[inline]
    pub const fn new(center: Vector3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around the points' bounding-box center that holds them all.
    pub fn from_points(points: &[Vector3]) -> Self {
        if points.is_empty() {
            return Self::EMPTY;
        }
        let center = Box3::from_points(points).center();
        let radius_sq = points
            .iter()
            .map(|p| center.distance_to_squared(p))
            .fold(0.0f32, f32::max);
        // Rounding in sqrt can land just inside the farthest point.
        Self::new(center, radius_sq.sqrt() * (1.0 + f32::EPSILON))
    }

    /// Whether the sphere holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Whether the point lies inside or on the surface.
    pub fn contains_point(&self, point: &Vector3) -> bool {
        point.distance_to_squared(&self.center) <= self.radius * self.radius
    }

    /// Transform the center and grow the radius by the largest axis scale.
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(m.transform_point(&self.center), self.radius * m.max_scale_on_axis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_contains_all() {
        let pts = [
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 3.0, 0.0),
        ];
        let s = Sphere::from_points(&pts);
        assert!(pts.iter().all(|p| s.contains_point(p)));
    }

    #[test]
    fn test_from_points_contains_extreme_vertex() {
        let pts = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let s = Sphere::from_points(&pts);
        assert!(pts.iter().all(|p| s.contains_point(p)));
        assert!((s.radius - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_apply_matrix_scales_radius() {
        let s = Sphere::new(Vector3::ZERO, 1.0);
        let m = Matrix4::compose(
            &Vector3::new(5.0, 0.0, 0.0),
            &Default::default(),
            &Vector3::new(1.0, 3.0, 2.0),
        );
        let t = s.apply_matrix4(&m);
        assert!(t.center.approx_eq(&Vector3::new(5.0, 0.0, 0.0), 1e-6));
        assert!((t.radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        assert!(Sphere::from_points(&[]).is_empty());
    }
}
