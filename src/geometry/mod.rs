//! Geometry module for vertex data and primitives.
//!
//! Geometry is plain CPU data; backends interleave and upload it on first
//! use.

mod box_geometry;
mod geometry;
mod plane_geometry;
mod sphere_geometry;
mod torus_geometry;
mod vertex;

pub use box_geometry::BoxGeometry;
pub use geometry::{Geometry, GeometryBuilder, GeometryError};
pub use plane_geometry::PlaneGeometry;
pub use sphere_geometry::SphereGeometry;
pub use torus_geometry::TorusGeometry;
pub use vertex::Vertex;
