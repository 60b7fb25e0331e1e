//! Plane geometry.

use super::box_geometry::push_grid_indices;
use super::Geometry;

/// Flat rectangle in the XY plane facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    /// Size along X.
    pub width: f32,
    /// Size along Y.
    pub height: f32,
    /// Columns.
    pub width_segments: u32,
    /// Rows.
    pub height_segments: u32,
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl PlaneGeometry {
    /// Single-quad plane.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            width_segments: 1,
            height_segments: 1,
        }
    }

    /// Subdivided plane.
    pub fn with_segments(mut self, width_segments: u32, height_segments: u32) -> Self {
        self.width_segments = width_segments.max(1);
        self.height_segments = height_segments.max(1);
        self
    }

    /// Generate the triangle data.
    pub fn build(&self) -> Geometry {
        let (cols, rows) = (self.width_segments.max(1), self.height_segments.max(1));
        let mut positions = Vec::new();
        let mut uvs = Vec::new();

        for iy in 0..=rows {
            let t = iy as f32 / rows as f32;
            for ix in 0..=cols {
                let s = ix as f32 / cols as f32;
                positions.push([(s - 0.5) * self.width, (t - 0.5) * self.height, 0.0]);
                uvs.push([s, 1.0 - t]);
            }
        }
        let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
        let mut indices = Vec::new();
        push_grid_indices(&mut indices, 0, cols, rows);

        Geometry::from_parts(positions, Some(normals), Some(uvs), None, Some(indices))
    }
}

impl From<PlaneGeometry> for Geometry {
    fn from(p: PlaneGeometry) -> Self {
        p.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let g = PlaneGeometry::new(4.0, 2.0).with_segments(4, 2).build();
        assert_eq!(g.vertex_count(), 15);
        assert_eq!(g.triangle_count(), 16);
        assert!((g.bounding_box().size().x - 4.0).abs() < 1e-6);
        assert_eq!(g.bounding_box().size().z, 0.0);
    }
}
