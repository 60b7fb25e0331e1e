//! Axis-aligned bounding box.

use super::{Sphere, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box; `min > max` on any axis means empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    /// Minimum corner.
    pub min: Vector3,
    /// Maximum corner.
    pub max: Vector3,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    /// Box containing nothing.
    pub const EMPTY: Self = Self {
        min: Vector3::splat(f32::INFINITY),
        max: Vector3::splat(f32::NEG_INFINITY),
    };

    /// Create a box.
    #[inline]
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Tightest box around the points.
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Whether the box holds nothing.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Center; zero for an empty box.
    pub fn center(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Grow to include a point.
    pub fn expand_by_point(&mut self, p: &Vector3) -> &mut Self {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
        self
    }

    /// Whether the point lies inside or on the boundary.
    pub fn contains_point(&self, p: &Vector3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Sphere through the corners.
    pub fn bounding_sphere(&self) -> Sphere {
        if self.is_empty() {
            return Sphere::EMPTY;
        }
        Sphere::new(self.center(), self.size().length() * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let b = Box3::from_points(&[Vector3::new(1.0, -2.0, 3.0), Vector3::new(-1.0, 2.0, 0.0)]);
        assert_eq!(b.min, Vector3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vector3::new(1.0, 2.0, 3.0));
        assert!(b.contains_point(&Vector3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn test_empty() {
        assert!(Box3::EMPTY.is_empty());
        assert!(Box3::EMPTY.bounding_sphere().is_empty());
    }
}
