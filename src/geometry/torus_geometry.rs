//! Torus geometry.

use super::Geometry;
use crate::math::Vector3;
use std::f32::consts::PI;

/// Torus around the Z axis, lying in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusGeometry {
    /// Distance from the center to the middle of the tube.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
    /// Segments around the tube.
    pub radial_segments: u32,
    /// Segments along the ring.
    pub tubular_segments: u32,
}

impl Default for TorusGeometry {
    fn default() -> Self {
        Self::new(1.0, 0.4, 16, 48)
    }
}

impl TorusGeometry {
    /// Create a torus description.
    pub fn new(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self {
            radius,
            tube,
            radial_segments: radial_segments.max(3),
            tubular_segments: tubular_segments.max(3),
        }
    }

    /// Generate the triangle data.
    pub fn build(&self) -> Geometry {
        let (radial, tubular) = (self.radial_segments.max(3), self.tubular_segments.max(3));
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * 2.0 * PI;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * 2.0 * PI;
                let ring = self.radius + self.tube * v.cos();
                let p = Vector3::new(ring * u.cos(), ring * u.sin(), self.tube * v.sin());
                let center = Vector3::new(self.radius * u.cos(), self.radius * u.sin(), 0.0);
                positions.push(p.to_array());
                normals.push((p - center).normalized().to_array());
                uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
            }
        }

        let stride = tubular + 1;
        let mut indices = Vec::new();
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Geometry::from_parts(positions, Some(normals), Some(uvs), None, Some(indices))
    }
}

impl From<TorusGeometry> for Geometry {
    fn from(t: TorusGeometry) -> Self {
        t.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_extent() {
        let g = TorusGeometry::new(2.0, 0.5, 8, 24).build();
        assert_eq!(g.vertex_count(), 9 * 25);
        assert_eq!(g.triangle_count(), 8 * 24 * 2);
        let size = g.bounding_box().size();
        assert!((size.x - 5.0).abs() < 1e-4);
        assert!((size.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_winding_matches_normals() {
        let g = TorusGeometry::default().build();
        let pos = g.positions();
        let normals = g.normals().unwrap();
        for tri in g.indices().unwrap().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vector3::from(pos[i as usize]));
            let face = (b - a).cross(&(c - a));
            assert!(face.dot(&Vector3::from(normals[tri[1] as usize])) > 0.0);
        }
    }
}
