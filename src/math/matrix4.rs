//! 4x4 matrix in column-major order.

use super::{Quaternion, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A 4x4 matrix stored column by column.
///
/// `elements[col * 4 + row]`, the layout WGSL `mat4x4<f32>` expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    /// Column-major elements.
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix.
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create from a column-major array.
    #[inline]
    pub const fn from_cols_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    /// Translation part.
    #[inline]
    pub fn get_position(&self) -> Vector3 {
        Vector3::new(self.elements[12], self.elements[13], self.elements[14])
    }

    /// Length of each basis column.
    pub fn get_scale(&self) -> Vector3 {
        let e = &self.elements;
        Vector3::new(
            Vector3::new(e[0], e[1], e[2]).length(),
            Vector3::new(e[4], e[5], e[6]).length(),
            Vector3::new(e[8], e[9], e[10]).length(),
        )
    }

    /// Largest basis scale, used to grow bounding spheres.
    pub fn max_scale_on_axis(&self) -> f32 {
        let s = self.get_scale();
        s.x.max(s.y).max(s.z)
    }

    /// Translation matrix.
    pub fn from_translation(v: &Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.elements[12] = v.x;
        m.elements[13] = v.y;
        m.elements[14] = v.z;
        m
    }

    /// Rotation matrix from a unit quaternion.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::compose(&Vector3::ZERO, q, &Vector3::ONE)
    }

    /// Build `translation * rotation * scale`.
    pub fn compose(position: &Vector3, q: &Quaternion, scale: &Vector3) -> Self {
        let (x2, y2, z2) = (q.x + q.x, q.y + q.y, q.z + q.z);
        let (xx, xy, xz) = (q.x * x2, q.x * y2, q.x * z2);
        let (yy, yz, zz) = (q.y * y2, q.y * z2, q.z * z2);
        let (wx, wy, wz) = (q.w * x2, q.w * y2, q.w * z2);

        #[rustfmt::skip]
        let elements = [
            (1.0 - (yy + zz)) * scale.x, (xy + wz) * scale.x, (xz - wy) * scale.x, 0.0,
            (xy - wz) * scale.y, (1.0 - (xx + zz)) * scale.y, (yz + wx) * scale.y, 0.0,
            (xz + wy) * scale.z, (yz - wx) * scale.z, (1.0 - (xx + yy)) * scale.z, 0.0,
            position.x, position.y, position.z, 1.0,
        ];
        Self { elements }
    }

    /// Split into translation, rotation and scale.
    ///
    /// A negative determinant is folded into the x scale.
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let e = &self.elements;
        let mut scale = self.get_scale();
        if self.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let mut rot = *self;
        for (col, s) in [scale.x, scale.y, scale.z].into_iter().enumerate() {
            let inv = if s != 0.0 { 1.0 / s } else { 0.0 };
            for row in 0..3 {
                rot.elements[col * 4 + row] *= inv;
            }
        }
        rot.elements[12] = 0.0;
        rot.elements[13] = 0.0;
        rot.elements[14] = 0.0;

        let position = Vector3::new(e[12], e[13], e[14]);
        (position, Quaternion::from_rotation_matrix(&rot), scale)
    }

    /// View matrix looking from `eye` towards `target`.
    ///
    /// The result is the inverse of the camera's world transform.
    pub fn look_at(eye: &Vector3, target: &Vector3, up: &Vector3) -> Self {
        Self::from_translation(eye)
            .multiply(&Self::look_rotation(eye, target, up))
            .inverse()
    }

    /// Rotation-only world matrix that points -Z from `eye` at `target`.
    pub fn look_rotation(eye: &Vector3, target: &Vector3, up: &Vector3) -> Self {
        let mut z = *eye - *target;
        if z.length_squared() == 0.0 {
            z = Vector3::UNIT_Z;
        }
        let z = z.normalized();

        let mut x = up.cross(&z);
        if x.length_squared() == 0.0 {
            // up parallel to view direction, nudge z
            let nudged = if up.z.abs() == 1.0 {
                Vector3::new(z.x + 1e-4, z.y, z.z)
            } else {
                Vector3::new(z.x, z.y, z.z + 1e-4)
            };
            x = up.cross(&nudged.normalized());
        }
        let x = x.normalized();
        let y = z.cross(&x);

        #[rustfmt::skip]
        let elements = [
            x.x, x.y, x.z, 0.0,
            y.x, y.y, y.z, 0.0,
            z.x, z.y, z.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { elements }
    }

    /// Perspective projection with a 0..1 depth range.
    ///
    /// `fov_y` is in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let range = far / (near - far);

        #[rustfmt::skip]
        let elements = [
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, range, -1.0,
            0.0, 0.0, near * range, 0.0,
        ];
        Self { elements }
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix4) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Self { elements: out }
    }

    /// Product `other * self`.
    #[inline]
    pub fn premultiply(&self, other: &Matrix4) -> Self {
        other.multiply(self)
    }

    fn minors(&self) -> ([f32; 6], [f32; 6]) {
        let m = |r: usize, c: usize| self.elements[c * 4 + r];
        let s = [
            m(0, 0) * m(1, 1) - m(1, 0) * m(0, 1),
            m(0, 0) * m(1, 2) - m(1, 0) * m(0, 2),
            m(0, 0) * m(1, 3) - m(1, 0) * m(0, 3),
            m(0, 1) * m(1, 2) - m(1, 1) * m(0, 2),
            m(0, 1) * m(1, 3) - m(1, 1) * m(0, 3),
            m(0, 2) * m(1, 3) - m(1, 2) * m(0, 3),
        ];
        let c = [
            m(2, 0) * m(3, 1) - m(3, 0) * m(2, 1),
            m(2, 0) * m(3, 2) - m(3, 0) * m(2, 2),
            m(2, 0) * m(3, 3) - m(3, 0) * m(2, 3),
            m(2, 1) * m(3, 2) - m(3, 1) * m(2, 2),
            m(2, 1) * m(3, 3) - m(3, 1) * m(2, 3),
            m(2, 2) * m(3, 3) - m(3, 2) * m(2, 3),
        ];
        (s, c)
    }

    /// Determinant.
    pub fn determinant(&self) -> f32 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Inverse. A singular matrix yields the identity.
    pub fn inverse(&self) -> Self {
        let (s, c) = self.minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if det == 0.0 || !det.is_finite() {
            return Self::IDENTITY;
        }
        let inv = 1.0 / det;
        let m = |r: usize, col: usize| self.elements[col * 4 + r];

        // rows of the adjugate, written back column-major
        let rows = [
            [
                m(1, 1) * c[5] - m(1, 2) * c[4] + m(1, 3) * c[3],
                -m(0, 1) * c[5] + m(0, 2) * c[4] - m(0, 3) * c[3],
                m(3, 1) * s[5] - m(3, 2) * s[4] + m(3, 3) * s[3],
                -m(2, 1) * s[5] + m(2, 2) * s[4] - m(2, 3) * s[3],
            ],
            [
                -m(1, 0) * c[5] + m(1, 2) * c[2] - m(1, 3) * c[1],
                m(0, 0) * c[5] - m(0, 2) * c[2] + m(0, 3) * c[1],
                -m(3, 0) * s[5] + m(3, 2) * s[2] - m(3, 3) * s[1],
                m(2, 0) * s[5] - m(2, 2) * s[2] + m(2, 3) * s[1],
            ],
            [
                m(1, 0) * c[4] - m(1, 1) * c[2] + m(1, 3) * c[0],
                -m(0, 0) * c[4] + m(0, 1) * c[2] - m(0, 3) * c[0],
                m(3, 0) * s[4] - m(3, 1) * s[2] + m(3, 3) * s[0],
                -m(2, 0) * s[4] + m(2, 1) * s[2] - m(2, 3) * s[0],
            ],
            [
                -m(1, 0) * c[3] + m(1, 1) * c[1] - m(1, 2) * c[0],
                m(0, 0) * c[3] - m(0, 1) * c[1] + m(0, 2) * c[0],
                -m(3, 0) * s[3] + m(3, 1) * s[1] - m(3, 2) * s[0],
                m(2, 0) * s[3] - m(2, 1) * s[1] + m(2, 2) * s[0],
            ],
        ];

        let mut out = [0.0f32; 16];
        for (r, row) in rows.iter().enumerate() {
            for (col, v) in row.iter().enumerate() {
                out[col * 4 + r] = v * inv;
            }
        }
        Self { elements: out }
    }

    /// Transposed copy.
    pub fn transposed(&self) -> Self {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[row * 4 + col] = self.elements[col * 4 + row];
            }
        }
        Self { elements: out }
    }

    /// Inverse-transpose of the upper 3x3, padded to 4x4 for uniform upload.
    pub fn normal_matrix(&self) -> Self {
        let m: glam::Mat4 = (*self).into();
        let n = glam::Mat3::from_mat4(m).inverse().transpose();
        glam::Mat4::from_mat3(n).into()
    }

    /// Transform a point, dividing by w.
    pub fn transform_point(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        let w = e[3] * v.x + e[7] * v.y + e[11] * v.z + e[15];
        let w = if w != 0.0 { 1.0 / w } else { 1.0 };
        Vector3::new(
            (e[0] * v.x + e[4] * v.y + e[8] * v.z + e[12]) * w,
            (e[1] * v.x + e[5] * v.y + e[9] * v.z + e[13]) * w,
            (e[2] * v.x + e[6] * v.y + e[10] * v.z + e[14]) * w,
        )
    }

    /// Transform a direction (ignores translation) and normalize.
    pub fn transform_direction(&self, v: &Vector3) -> Vector3 {
        let e = &self.elements;
        Vector3::new(
            e[0] * v.x + e[4] * v.y + e[8] * v.z,
            e[1] * v.x + e[5] * v.y + e[9] * v.z,
            e[2] * v.x + e[6] * v.y + e[10] * v.z,
        )
        .normalized()
    }

    /// Element-wise approximate equality.
    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }

    /// Columns as nested arrays, for uniform structs.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let e = &self.elements;
        [
            [e[0], e[1], e[2], e[3]],
            [e[4], e[5], e[6], e[7]],
            [e[8], e[9], e[10], e[11]],
            [e[12], e[13], e[14], e[15]],
        ]
    }
}

impl std::ops::Mul for Matrix4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl std::ops::Mul<Vector3> for Matrix4 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.transform_point(&rhs)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self::from_cols_array(m.to_cols_array())
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_compose_matches_glam() {
        let pos = Vector3::new(1.0, -2.0, 3.0);
        let q = Quaternion::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0).normalized(), 0.7);
        let scale = Vector3::new(2.0, 0.5, 1.5);
        let ours = Matrix4::compose(&pos, &q, &scale);
        let theirs = glam::Mat4::from_scale_rotation_translation(
            scale.into(),
            glam::Quat::from_xyzw(q.x, q.y, q.z, q.w),
            pos.into(),
        );
        assert!(ours.approx_eq(&theirs.into(), 1e-5));
    }

    #[test]
    fn test_inverse_matches_glam() {
        let m = Matrix4::compose(
            &Vector3::new(4.0, 5.0, -6.0),
            &Quaternion::from_axis_angle(&Vector3::UNIT_Z, 0.3),
            &Vector3::new(1.0, 2.0, 3.0),
        );
        let theirs = glam::Mat4::from(m).inverse();
        assert!(m.inverse().approx_eq(&theirs.into(), 1e-5));
        assert!((m * m.inverse()).approx_eq(&Matrix4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_singular_inverse_is_identity() {
        let m = Matrix4::from_cols_array([0.0; 16]);
        assert_eq!(m.inverse(), Matrix4::IDENTITY);
        assert_eq!(m.determinant(), 0.0);
    }

    #[test]
    fn test_decompose_recovers_parts() {
        let pos = Vector3::new(1.0, 2.0, 3.0);
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
        let scale = Vector3::new(2.0, 2.0, 2.0);
        let (p, r, s) = Matrix4::compose(&pos, &q, &scale).decompose();
        assert!(p.approx_eq(&pos, 1e-5));
        assert!(s.approx_eq(&scale, 1e-5));
        assert!(r.approx_eq(&q, 1e-5));
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = Matrix4::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
        let near = p.transform_point(&Vector3::new(0.0, 0.0, -0.1));
        let far = p.transform_point(&Vector3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vector3::new(3.0, 4.0, 5.0);
        let view = Matrix4::look_at(&eye, &Vector3::ZERO, &Vector3::UP);
        assert!(view.transform_point(&eye).approx_eq(&Vector3::ZERO, 1e-5));
        let target = view.transform_point(&Vector3::ZERO);
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5);
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_max_scale_on_axis() {
        let m = Matrix4::compose(&Vector3::ZERO, &Quaternion::IDENTITY, &Vector3::new(1.0, 4.0, 2.0));
        assert!((m.max_scale_on_axis() - 4.0).abs() < 1e-6);
    }
}
