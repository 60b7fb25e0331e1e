//! Backend that records commands instead of executing them.

use super::{DrawRange, DrawUniforms, FrameUniforms, ProgramHandle, RenderBackend, RenderError};
use crate::geometry::Geometry;
use crate::material::ProgramKey;
use crate::math::Color;
use crate::scene::{GeometryId, TextureId};
use crate::texture::Texture;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `begin_frame` with its clear color.
    BeginFrame(Color),
    /// `upload_geometry`.
    UploadGeometry(GeometryId),
    /// `upload_texture`.
    UploadTexture(TextureId),
    /// `compile_program`.
    CompileProgram(ProgramKey),
    /// `bind_program`.
    BindProgram(ProgramHandle),
    /// `bind_geometry`.
    BindGeometry(GeometryId),
    /// `bind_texture`.
    BindTexture(Option<TextureId>),
    /// `set_frame_uniforms` with the number of lights.
    SetFrameUniforms {
        /// Lights packed for the frame.
        lights: u32,
    },
    /// `draw`.
    Draw {
        /// Model matrix columns.
        model: [[f32; 4]; 4],
        /// Draw range.
        range: DrawRange,
    },
    /// `end_frame`.
    EndFrame,
    /// `resize`.
    Resize(u32, u32),
}

/// Headless backend keeping a log of every call.
///
/// Each `begin_frame` drops the commands of the previous completed frame;
/// anything issued between frames (compiles, resizes) is kept.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    frame_uniforms: Option<FrameUniforms>,
    committed: usize,
    programs: u32,
    frames: u64,
    pending_error: Option<RenderError>,
}

impl RecordingBackend {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the current or last frame.
    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Count commands matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Draw commands of the last frame, in order.
    pub fn draws(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| matches!(c, Command::Draw { .. }))
    }

    /// Frame uniforms of the last frame.
    #[inline]
    pub fn last_frame_uniforms(&self) -> Option<&FrameUniforms> {
        self.frame_uniforms.as_ref()
    }

    /// Completed frames.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Make the next `begin_frame` fail with `error`.
    pub fn fail_next_frame(&mut self, error: RenderError) {
        self.pending_error = Some(error);
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, clear: Color) -> Result<(), RenderError> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        self.commands.drain(..self.committed);
        self.committed = 0;
        self.commands.push(Command::BeginFrame(clear));
        Ok(())
    }

    fn upload_geometry(&mut self, id: GeometryId, _geometry: &Geometry) -> Result<(), RenderError> {
        self.commands.push(Command::UploadGeometry(id));
        Ok(())
    }

    fn upload_texture(&mut self, id: TextureId, _texture: &Texture) -> Result<(), RenderError> {
        self.commands.push(Command::UploadTexture(id));
        Ok(())
    }

    fn compile_program(&mut self, key: &ProgramKey) -> Result<ProgramHandle, RenderError> {
        self.commands.push(Command::CompileProgram(*key));
        let handle = ProgramHandle(self.programs);
        self.programs += 1;
        Ok(handle)
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.commands.push(Command::BindProgram(program));
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        self.commands.push(Command::BindGeometry(geometry));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.commands.push(Command::BindTexture(texture));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.frame_uniforms = Some(*uniforms);
        self.commands.push(Command::SetFrameUniforms {
            lights: uniforms.lights.num_lights,
        });
    }

    fn draw(&mut self, uniforms: &DrawUniforms, range: DrawRange) {
        self.commands.push(Command::Draw {
            model: uniforms.model,
            range,
        });
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.commands.push(Command::EndFrame);
        self.committed = self.commands.len();
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.commands.push(Command::Resize(width, height));
    }
}
