//! Plane in Hessian normal form.

use super::Vector3;
use serde::{Deserialize, Serialize};

/// Plane `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vector3,
    /// Signed distance term.
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vector3::UNIT_Y, 0.0)
    }
}

impl Plane {
    /// Create a plane.
    #[inline]
    pub const fn new(normal: Vector3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Plane through `point` with the given normal.
    pub fn from_normal_and_point(normal: Vector3, point: &Vector3) -> Self {
        Self::new(normal, -point.dot(&normal))
    }

    /// Scale so the normal has unit length.
    pub fn normalized(&self) -> Self {
        let len = self.normal.length();
        if len == 0.0 {
            return *self;
        }
        let inv = 1.0 / len;
        Self::new(self.normal * inv, self.constant * inv)
    }

    /// Signed distance; positive on the side the normal points to.
    #[inline]
    pub fn distance_to_point(&self, point: &Vector3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_distance() {
        let p = Plane::from_normal_and_point(Vector3::UNIT_Y, &Vector3::new(0.0, 2.0, 0.0));
        assert!((p.distance_to_point(&Vector3::new(5.0, 5.0, 5.0)) - 3.0).abs() < 1e-6);
        assert!((p.distance_to_point(&Vector3::ZERO) + 2.0).abs() < 1e-6);
    }
}
