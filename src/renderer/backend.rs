//! The command surface a graphics API has to provide.

use crate::geometry::Geometry;
use crate::light::LightsUniform;
use crate::material::{MaterialUniform, ProgramKey};
use crate::math::Color;
use crate::scene::{GeometryId, TextureId};
use crate::texture::Texture;
use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Errors surfaced by a frame.
///
/// Every variant is per-frame: the caller logs it and renders the next one.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface must be reconfigured before the next frame.
    #[error("Surface lost")]
    SurfaceLost,

    /// Surface no longer matches the window.
    #[error("Surface outdated")]
    SurfaceOutdated,

    /// Acquiring the next frame timed out.
    #[error("Timed out acquiring the next frame")]
    Timeout,

    /// The device ran out of memory.
    #[error("Out of memory")]
    OutOfMemory,

    /// Any other backend failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Context creation failed.
    #[error(transparent)]
    Context(#[from] crate::core::ContextError),
}

impl RenderError {
    /// Whether the surface should be reconfigured before retrying.
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, Self::SurfaceLost | Self::SurfaceOutdated)
    }
}

/// Backend handle of a compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Uniforms shared by every draw of a frame.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    /// View matrix.
    pub view: [[f32; 4]; 4],
    /// Projection matrix.
    pub projection: [[f32; 4]; 4],
    /// Camera world position; w unused.
    pub camera_position: [f32; 4],
    /// Lights of the frame.
    pub lights: LightsUniform,
}

/// Per-draw uniform block.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DrawUniforms {
    /// Model (world) matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix.
    pub normal_matrix: [[f32; 4]; 4],
    /// Material parameters.
    pub material: MaterialUniform,
}

/// Element range and kind of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    /// Indices (when indexed) or vertices drawn.
    pub count: u32,
    /// Whether the bound geometry has an index buffer.
    pub indexed: bool,
}

/// API-agnostic rendering commands.
///
/// The renderer decides what to bind and when; a backend only executes.
/// Binding calls are only issued between `begin_frame` and `end_frame`.
pub trait RenderBackend {
    /// Start a frame, clearing to `clear`.
    fn begin_frame(&mut self, clear: Color) -> Result<(), RenderError>;

    /// Create GPU buffers for a geometry.
    fn upload_geometry(&mut self, id: GeometryId, geometry: &Geometry) -> Result<(), RenderError>;

    /// Create a GPU texture.
    fn upload_texture(&mut self, id: TextureId, texture: &Texture) -> Result<(), RenderError>;

    /// Compile the program variant for `key`.
    fn compile_program(&mut self, key: &ProgramKey) -> Result<ProgramHandle, RenderError>;

    /// Make `program` current.
    fn bind_program(&mut self, program: ProgramHandle);

    /// Make the buffers of `geometry` current.
    fn bind_geometry(&mut self, geometry: GeometryId);

    /// Make a color map current; `None` binds the white fallback.
    fn bind_texture(&mut self, texture: Option<TextureId>);

    /// Set camera and light uniforms for the frame.
    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms);

    /// Draw the bound geometry with the bound program.
    fn draw(&mut self, uniforms: &DrawUniforms, range: DrawRange);

    /// Submit and present.
    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// Resize the render target.
    fn resize(&mut self, width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 192);
        // camera block then lights at a 16-byte boundary
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 144 + std::mem::size_of::<LightsUniform>());
    }

    #[test]
    fn test_reconfigure_errors() {
        assert!(RenderError::SurfaceLost.needs_reconfigure());
        assert!(RenderError::SurfaceOutdated.needs_reconfigure());
        assert!(!RenderError::Timeout.needs_reconfigure());
    }
}
