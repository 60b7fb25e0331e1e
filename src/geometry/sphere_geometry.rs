//! UV sphere geometry.

use super::Geometry;
use std::f32::consts::PI;

/// Latitude/longitude sphere centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    /// Radius.
    pub radius: f32,
    /// Segments around the equator.
    pub width_segments: u32,
    /// Segments pole to pole.
    pub height_segments: u32,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self::new(1.0, 32, 16)
    }
}

impl SphereGeometry {
    /// Create a sphere description.
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    /// Generate the triangle data.
    pub fn build(&self) -> Geometry {
        let (w, h) = (self.width_segments.max(3), self.height_segments.max(2));
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let (sin_phi, cos_phi) = (v * PI).sin_cos();
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let (sin_theta, cos_theta) = (u * 2.0 * PI).sin_cos();
                let n = [-cos_theta * sin_phi, cos_phi, sin_theta * sin_phi];
                positions.push([n[0] * self.radius, n[1] * self.radius, n[2] * self.radius]);
                normals.push(n);
                uvs.push([u, 1.0 - v]);
            }
        }

        let stride = w + 1;
        let mut indices = Vec::new();
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;
                // pole rows collapse to one triangle
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Geometry::from_parts(positions, Some(normals), Some(uvs), None, Some(indices))
    }
}

impl From<SphereGeometry> for Geometry {
    fn from(s: SphereGeometry) -> Self {
        s.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn test_vertices_on_surface() {
        let g = SphereGeometry::new(2.0, 8, 6).build();
        assert_eq!(g.vertex_count(), 9 * 7);
        for p in g.positions() {
            assert!((Vector3::from(*p).length() - 2.0).abs() < 1e-5);
        }
        assert!((g.bounding_sphere().radius - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_winding_faces_outward() {
        let g = SphereGeometry::new(1.0, 12, 8).build();
        let pos = g.positions();
        for tri in g.indices().unwrap().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vector3::from(pos[i as usize]));
            let face = (b - a).cross(&(c - a));
            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(&centroid) > 0.0);
        }
    }
}
