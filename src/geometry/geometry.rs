//! CPU-side triangle geometry.

use super::Vertex;
use crate::math::{Box3, Sphere, Vector3};
use thiserror::Error;

/// Errors raised while validating geometry data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An optional attribute does not have one entry per vertex.
    #[error("attribute `{attribute}` has {actual} entries, expected {expected}")]
    AttributeLength {
        /// Attribute name.
        attribute: &'static str,
        /// Vertex count.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
    /// An index points past the vertex arrays.
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Where it sits in the index array.
        position: usize,
        /// Vertex count.
        vertex_count: usize,
    },
    /// The index array does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),
    /// Non-indexed geometry whose vertex count does not describe whole triangles.
    #[error("non-indexed vertex count {0} is not a multiple of 3")]
    VertexCount(usize),
    /// A position holds NaN or infinity.
    #[error("position {0} is not finite")]
    NonFinitePosition(usize),
}

/// Triangle-list geometry with per-vertex attributes.
///
/// Construction validates every array, so a `Geometry` in hand is always
/// safe to interleave and upload.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    colors: Option<Vec<[f32; 4]>>,
    indices: Option<Vec<u32>>,
    bounding_box: Box3,
    bounding_sphere: Sphere,
}

impl Geometry {
    /// Validated geometry from positions and optional indices.
    pub fn new(positions: Vec<[f32; 3]>, indices: Option<Vec<u32>>) -> Result<Self, GeometryError> {
        let mut builder = GeometryBuilder::new(positions);
        if let Some(indices) = indices {
            builder = builder.indices(indices);
        }
        builder.build()
    }

    /// Start a builder.
    pub fn builder(positions: Vec<[f32; 3]>) -> GeometryBuilder {
        GeometryBuilder::new(positions)
    }

    /// Geometry with no vertices. Valid data; draws nothing.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), None, None, None, None)
    }

    /// Assemble generator output, which is valid by construction.
    pub(super) fn from_parts(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        uvs: Option<Vec<[f32; 2]>>,
        colors: Option<Vec<[f32; 4]>>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let points: Vec<Vector3> = positions.iter().copied().map(Vector3::from).collect();
        let bounding_box = Box3::from_points(&points);
        let bounding_sphere = Sphere::from_points(&points);
        Self {
            positions,
            normals,
            uvs,
            colors,
            indices,
            bounding_box,
            bounding_sphere,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices, zero when non-indexed.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Elements a draw call walks: indices if present, else vertices.
    #[inline]
    pub fn draw_count(&self) -> usize {
        match &self.indices {
            Some(i) => i.len(),
            None => self.positions.len(),
        }
    }

    /// Triangles drawn.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.draw_count() / 3
    }

    /// Whether there is nothing to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.draw_count() == 0
    }

    /// Positions.
    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Normals, if supplied.
    #[inline]
    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    /// Texture coordinates, if supplied.
    #[inline]
    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        self.uvs.as_deref()
    }

    /// Vertex colors, if supplied.
    #[inline]
    pub fn colors(&self) -> Option<&[[f32; 4]]> {
        self.colors.as_deref()
    }

    /// Indices, if any.
    #[inline]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Local-space bounds.
    #[inline]
    pub fn bounding_box(&self) -> &Box3 {
        &self.bounding_box
    }

    /// Local-space bounding sphere; empty for zero vertices.
    #[inline]
    pub fn bounding_sphere(&self) -> &Sphere {
        &self.bounding_sphere
    }

    /// Replace normals with area-weighted face normals accumulated per vertex.
    pub fn compute_vertex_normals(&mut self) {
        let mut acc = vec![Vector3::ZERO; self.positions.len()];
        let tri_indices: Vec<u32> = match &self.indices {
            Some(i) => i.clone(),
            None => (0..self.positions.len() as u32).collect(),
        };
        for tri in tri_indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vector3::from(self.positions[a]);
            let pb = Vector3::from(self.positions[b]);
            let pc = Vector3::from(self.positions[c]);
            let n = (pb - pa).cross(&(pc - pa));
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = Some(acc.into_iter().map(|n| n.normalized().to_array()).collect());
    }

    /// Interleave into the GPU vertex layout.
    ///
    /// Missing normals default to +Z, missing uvs to zero and missing colors
    /// to opaque white.
    pub fn interleave(&self) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| Vertex {
                position: self.positions[i],
                normal: self.normals.as_ref().map_or([0.0, 0.0, 1.0], |n| n[i]),
                uv: self.uvs.as_ref().map_or([0.0, 0.0], |u| u[i]),
                color: self.colors.as_ref().map_or([1.0; 4], |c| c[i]),
            })
            .collect()
    }
}

/// Collects attributes and validates them in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    colors: Option<Vec<[f32; 4]>>,
    indices: Option<Vec<u32>>,
    compute_normals: bool,
}

impl GeometryBuilder {
    /// Builder seeded with positions.
    pub fn new(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    /// Per-vertex normals.
    pub fn normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Per-vertex texture coordinates.
    pub fn uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Per-vertex RGBA colors.
    pub fn colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Triangle-list indices.
    pub fn indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Derive normals from the triangles when none were supplied.
    pub fn compute_normals(mut self) -> Self {
        self.compute_normals = true;
        self
    }

    /// Validate and assemble.
    pub fn build(self) -> Result<Geometry, GeometryError> {
        let count = self.positions.len();

        if let Some(i) = self.positions.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(GeometryError::NonFinitePosition(i));
        }
        check_len("normal", count, self.normals.as_ref().map(Vec::len))?;
        check_len("uv", count, self.uvs.as_ref().map(Vec::len))?;
        check_len("color", count, self.colors.as_ref().map(Vec::len))?;

        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCount(indices.len()));
                }
                if let Some((position, &index)) =
                    indices.iter().enumerate().find(|&(_, &i)| i as usize >= count)
                {
                    return Err(GeometryError::IndexOutOfRange {
                        index,
                        position,
                        vertex_count: count,
                    });
                }
            }
            None if count % 3 != 0 => return Err(GeometryError::VertexCount(count)),
            None => {}
        }

        let needs_normals = self.compute_normals && self.normals.is_none();
        let mut geometry =
            Geometry::from_parts(self.positions, self.normals, self.uvs, self.colors, self.indices);
        if needs_normals {
            geometry.compute_vertex_normals();
        }
        Ok(geometry)
    }
}

fn check_len(attribute: &'static str, expected: usize, actual: Option<usize>) -> Result<(), GeometryError> {
    match actual {
        Some(actual) if actual != expected => Err(GeometryError::AttributeLength {
            attribute,
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}
