//! Box geometry (rectangular cuboid).

use super::Geometry;
use crate::math::Vector3;

/// Axis-aligned box centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    /// Size along X.
    pub width: f32,
    /// Size along Y.
    pub height: f32,
    /// Size along Z.
    pub depth: f32,
    /// Grid subdivisions per face edge.
    pub segments: u32,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

// (normal, u axis, v axis) per face, with u x v == normal
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

impl BoxGeometry {
    /// Box with one quad per face.
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            segments: 1,
        }
    }

    /// Subdivide each face into `segments x segments` quads.
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments.max(1);
        self
    }

    /// Generate the triangle data.
    pub fn build(&self) -> Geometry {
        let dims = Vector3::new(self.width, self.height, self.depth);
        let grid = self.segments.max(1);
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();

        for (n, u, v) in FACES {
            let (n, u, v) = (Vector3::from(n), Vector3::from(u), Vector3::from(v));
            let half_n = n.dot(&dims).abs() * 0.5;
            let size_u = u.dot(&dims).abs();
            let size_v = v.dot(&dims).abs();
            let base = positions.len() as u32;

            for iy in 0..=grid {
                let t = iy as f32 / grid as f32;
                for ix in 0..=grid {
                    let s = ix as f32 / grid as f32;
                    let p = n * half_n + u * ((s - 0.5) * size_u) + v * ((t - 0.5) * size_v);
                    positions.push(p.to_array());
                    normals.push(n.to_array());
                    uvs.push([s, 1.0 - t]);
                }
            }
            push_grid_indices(&mut indices, base, grid, grid);
        }

        Geometry::from_parts(positions, Some(normals), Some(uvs), None, Some(indices))
    }
}

/// Two counter-clockwise triangles per cell of a `(cols + 1) x (rows + 1)`
/// vertex grid laid out row by row.
pub(super) fn push_grid_indices(indices: &mut Vec<u32>, base: u32, cols: u32, rows: u32) {
    let stride = cols + 1;
    for iy in 0..rows {
        for ix in 0..cols {
            let a = base + iy * stride + ix;
            let b = a + 1;
            let c = b + stride;
            let d = a + stride;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
}

impl From<BoxGeometry> for Geometry {
    fn from(b: BoxGeometry) -> Self {
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_bounds() {
        let g = BoxGeometry::new(2.0, 4.0, 6.0).build();
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        let b = g.bounding_box();
        assert!(b.min.approx_eq(&Vector3::new(-1.0, -2.0, -3.0), 1e-6));
        assert!(b.max.approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_winding_faces_outward() {
        let g = BoxGeometry::new(1.0, 1.0, 1.0).with_segments(2).build();
        let pos = g.positions();
        let normals = g.normals().unwrap();
        for tri in g.indices().unwrap().chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (Vector3::from(pos[b]) - Vector3::from(pos[a]))
                .cross(&(Vector3::from(pos[c]) - Vector3::from(pos[a])));
            assert!(face.dot(&Vector3::from(normals[a])) > 0.0);
        }
    }

    #[test]
    fn test_generated_data_passes_validation() {
        let g = BoxGeometry::default().build();
        let rebuilt = Geometry::builder(g.positions().to_vec())
            .normals(g.normals().unwrap().to_vec())
            .uvs(g.uvs().unwrap().to_vec())
            .indices(g.indices().unwrap().to_vec())
            .build();
        assert!(rebuilt.is_ok());
    }
}
