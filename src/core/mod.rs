//! # Core Module
//!
//! wgpu context management, the windowed engine and timing utilities.

mod clock;
mod context;
mod engine;
mod id;

pub use clock::Clock;
pub use context::{Context, ContextError};
pub use engine::{Engine, EngineBuilder};
pub use id::Id;

use crate::math::Color;

/// Render configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Enable 4x multisample anti-aliasing.
    pub antialias: bool,
    /// Premultiplied-alpha surface compositing.
    pub alpha: bool,
    /// Enable depth testing.
    pub depth: bool,
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// Clear color when the scene sets no background.
    pub clear_color: Color,
    /// Skip nodes outside the camera frustum.
    pub frustum_culling: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: false,
            depth: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            clear_color: Color::new(0.1, 0.1, 0.1),
            frustum_culling: true,
        }
    }
}
