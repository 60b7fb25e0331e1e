//! # Renderer
//!
//! Turns a [`Scene`](crate::scene::Scene) and a camera into draw calls.
//!
//! The [`Renderer`] owns all per-renderer state (uploaded resources, compiled
//! program variants, bound state) and talks to the graphics API only through
//! the [`RenderBackend`] trait. [`WgpuBackend`] renders to a window surface;
//! [`RecordingBackend`] records the command stream for tests and headless use.

mod backend;
mod cache;
mod recording;
mod render_list;
#[allow(clippy::module_inception)]
mod renderer;
mod wgpu_backend;

pub use backend::{
    DrawRange, DrawUniforms, FrameUniforms, ProgramHandle, RenderBackend, RenderError,
};
pub use cache::StateCache;
pub use recording::{Command, RecordingBackend};
pub use render_list::{RenderItem, RenderList, RenderListOptions};
pub use renderer::{RenderInfo, Renderer};
pub use wgpu_backend::WgpuBackend;
