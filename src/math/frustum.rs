//! View frustum for culling.

use super::{Matrix4, Plane, Sphere, Vector3};
use serde::{Deserialize, Serialize};

/// Six inward-facing planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    /// Bounding planes.
    pub planes: [Plane; 6],
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_matrix(&Matrix4::IDENTITY)
    }
}

impl Frustum {
    /// Extract the planes of a projection-view matrix with 0..1 clip depth.
    pub fn from_matrix(m: &Matrix4) -> Self {
        let e = &m.elements;
        let row = |i: usize| [e[i], e[4 + i], e[8 + i], e[12 + i]];
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let plane = |a: [f32; 4], b: [f32; 4], sign: f32| {
            Plane::new(
                Vector3::new(a[0] + sign * b[0], a[1] + sign * b[1], a[2] + sign * b[2]),
                a[3] + sign * b[3],
            )
            .normalized()
        };

        Self {
            planes: [
                plane(r3, r0, 1.0),
                plane(r3, r0, -1.0),
                plane(r3, r1, 1.0),
                plane(r3, r1, -1.0),
                // z_clip >= 0
                plane(r2, [0.0; 4], 0.0),
                plane(r3, r2, -1.0),
            ],
        }
    }

    /// Whether any part of the sphere is inside. Empty spheres never are.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        if sphere.is_empty() {
            return false;
        }
        self.planes
            .iter()
            .all(|p| p.distance_to_point(&sphere.center) >= -sphere.radius)
    }

    /// Whether the point is inside.
    pub fn contains_point(&self, point: &Vector3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_frustum() -> Frustum {
        let proj = Matrix4::perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Matrix4::look_at(&Vector3::new(0.0, 0.0, 10.0), &Vector3::ZERO, &Vector3::UP);
        Frustum::from_matrix(&(proj * view))
    }

    #[test]
    fn test_sphere_in_front_is_visible() {
        let f = camera_frustum();
        assert!(f.intersects_sphere(&Sphere::new(Vector3::ZERO, 1.0)));
        assert!(f.contains_point(&Vector3::ZERO));
    }

    #[test]
    fn test_sphere_behind_camera_is_culled() {
        let f = camera_frustum();
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, 20.0), 1.0)));
    }

    #[test]
    fn test_sphere_beyond_far_is_culled() {
        let f = camera_frustum();
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(0.0, 0.0, -200.0), 1.0)));
    }

    #[test]
    fn test_sphere_straddling_side_plane_is_visible() {
        let f = camera_frustum();
        // half-width at distance 10 is tan(30deg) * 10 ~= 5.77
        assert!(f.intersects_sphere(&Sphere::new(Vector3::new(6.5, 0.0, 0.0), 1.0)));
        assert!(!f.intersects_sphere(&Sphere::new(Vector3::new(9.0, 0.0, 0.0), 1.0)));
    }
}
