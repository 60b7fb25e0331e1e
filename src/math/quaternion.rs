//! Unit quaternions for node orientation.

use super::{Matrix4, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rotation quaternion, `w` is the scalar part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Quaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// Scalar component.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a new quaternion.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about a unit `axis`.
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Extract the rotation from a matrix whose upper 3x3 is orthonormal.
    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let (m00, m01, m02) = (m.get(0, 0), m.get(0, 1), m.get(0, 2));
        let (m10, m11, m12) = (m.get(1, 0), m.get(1, 1), m.get(1, 2));
        let (m20, m21, m22) = (m.get(2, 0), m.get(2, 1), m.get(2, 2));
        let trace = m00 + m11 + m22;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        }
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`.
    pub fn from_unit_vectors(from: &Vector3, to: &Vector3) -> Self {
        let r = from.dot(to) + 1.0;
        if r < 1e-6 {
            // opposite vectors, pick any orthogonal axis
            if from.x.abs() > from.z.abs() {
                Self::new(-from.y, from.x, 0.0, 0.0).normalized()
            } else {
                Self::new(0.0, -from.z, from.y, 0.0).normalized()
            }
        } else {
            let c = from.cross(to);
            Self::new(c.x, c.y, c.z, r).normalized()
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Length.
    #[inline]
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; a zero quaternion becomes the identity.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / len;
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Conjugate, the inverse of a unit quaternion.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Hamilton product `self * other` (apply `other` first).
    pub fn multiply(&self, o: &Quaternion) -> Self {
        Self::new(
            self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            self.w * o.y + self.y * o.w + self.z * o.x - self.x * o.z,
            self.w * o.z + self.z * o.w + self.x * o.y - self.y * o.x,
            self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
        )
    }

    /// Spherical interpolation along the shorter arc.
    pub fn slerp(&self, other: &Quaternion, t: f32) -> Self {
        let mut cos = self.dot(other);
        let mut end = *other;
        if cos < 0.0 {
            end = Self::new(-end.x, -end.y, -end.z, -end.w);
            cos = -cos;
        }

        let (a, b) = if cos > 0.9995 {
            (1.0 - t, t)
        } else {
            let theta = cos.acos();
            let sin = theta.sin();
            (((1.0 - t) * theta).sin() / sin, (t * theta).sin() / sin)
        };

        Self::new(
            self.x * a + end.x * b,
            self.y * a + end.y * b,
            self.z * a + end.z * b,
            self.w * a + end.w * b,
        )
        .normalized()
    }

    /// Component-wise approximate equality.
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_multiply_composes_rotations() {
        let a = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_X, FRAC_PI_2);
        let v = Vector3::UNIT_Z;
        let composed = (a * b).normalized();
        let expected = v.apply_quaternion(&b).apply_quaternion(&a);
        assert!(v.apply_quaternion(&composed).approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_from_unit_vectors() {
        let q = Quaternion::from_unit_vectors(&Vector3::UNIT_X, &Vector3::UNIT_Y);
        assert!(Vector3::UNIT_X.apply_quaternion(&q).approx_eq(&Vector3::UNIT_Y, 1e-5));
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_2);
        assert!(a.slerp(&b, 0.0).approx_eq(&a, 1e-5));
        assert!(a.slerp(&b, 1.0).approx_eq(&b, 1e-5));
        let mid = Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_2 * 0.5);
        assert!(a.slerp(&b, 0.5).approx_eq(&mid, 1e-5));
    }

    #[test]
    fn test_rotation_matrix_round_trip() {
        let q = Quaternion::from_axis_angle(&Vector3::new(0.0, 0.6, 0.8), 2.5);
        let back = Quaternion::from_rotation_matrix(&Matrix4::from_quaternion(&q));
        assert!(back.approx_eq(&q, 1e-5));
    }
}
