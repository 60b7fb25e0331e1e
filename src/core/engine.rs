//! Main engine entry point.

use super::{Clock, Context, ContextError, RenderConfig};
use crate::camera::PerspectiveCamera;
use crate::math::Color;
use crate::renderer::{RenderError, RenderInfo, Renderer, WgpuBackend};
use crate::scene::Scene;

/// A windowed renderer with its clock.
pub struct Engine {
    /// The renderer.
    pub renderer: Renderer<WgpuBackend>,
    /// The clock for timing.
    pub clock: Clock,
}

impl Engine {
    /// Create a new engine from a window handle.
    ///
    /// # Arguments
    /// * `window` - A window handle (e.g., from winit or web_sys::HtmlCanvasElement)
    /// * `width` - Initial width in pixels
    /// * `height` - Initial height in pixels
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        Self::with_config(window, width, height, RenderConfig::default()).await
    }

    /// Create a new engine with custom configuration.
    pub async fn with_config<W>(
        window: W,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let context = Context::new(window, width, height, &config).await?;
        let mut renderer = Renderer::new(WgpuBackend::new(context));
        renderer.set_clear_color(config.clear_color);
        renderer.set_frustum_culling(config.frustum_culling);

        Ok(Self {
            renderer,
            clock: Clock::new(),
        })
    }

    /// The wgpu context.
    #[inline]
    pub fn context(&self) -> &Context {
        self.renderer.backend().context()
    }

    /// Handle resize. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width != self.width() || height != self.height()) {
            self.renderer.resize(width, height);
        }
    }

    /// Reconfigure the surface after a lost or outdated frame.
    pub fn reconfigure(&mut self) {
        self.renderer.backend_mut().reconfigure();
    }

    /// Get current width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.context().width()
    }

    /// Get current height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.context().height()
    }

    /// Get aspect ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.context().aspect_ratio()
    }

    /// Seconds since the last call.
    pub fn delta_time(&mut self) -> f32 {
        self.clock.tick()
    }

    /// Seconds since engine start.
    pub fn elapsed_time(&self) -> f32 {
        self.clock.elapsed()
    }

    /// Render a frame.
    ///
    /// Surface loss is handled here by reconfiguring; the error is still
    /// returned so the caller can log it and carry on with the next frame.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<RenderInfo, RenderError> {
        let result = self.renderer.render(scene, camera);
        if let Err(err) = &result {
            if err.needs_reconfigure() {
                log::warn!("{}, reconfiguring surface", err);
                self.reconfigure();
            }
        }
        result
    }
}

/// Builder for configuring the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: RenderConfig,
}

impl EngineBuilder {
    /// Create a new engine builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set anti-aliasing.
    pub fn antialias(mut self, enabled: bool) -> Self {
        self.config.antialias = enabled;
        self
    }

    /// Set alpha compositing.
    pub fn alpha(mut self, enabled: bool) -> Self {
        self.config.alpha = enabled;
        self
    }

    /// Set depth testing.
    pub fn depth(mut self, enabled: bool) -> Self {
        self.config.depth = enabled;
        self
    }

    /// Set power preference.
    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.config.power_preference = preference;
        self
    }

    /// Set present mode.
    pub fn present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.config.present_mode = mode;
        self
    }

    /// Set clear color.
    pub fn clear_color(mut self, color: Color) -> Self {
        self.config.clear_color = color;
        self
    }

    /// Toggle frustum culling.
    pub fn frustum_culling(mut self, enabled: bool) -> Self {
        self.config.frustum_culling = enabled;
        self
    }

    /// Configuration built so far.
    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build the engine.
    pub async fn build<W>(self, window: W, width: u32, height: u32) -> Result<Engine, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        Engine::with_config(window, width, height, self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_config() {
        let builder = EngineBuilder::new()
            .antialias(false)
            .depth(false)
            .frustum_culling(false)
            .clear_color(Color::WHITE);
        let config = builder.config();
        assert!(!config.antialias);
        assert!(!config.depth);
        assert!(!config.frustum_culling);
        assert_eq!(config.clear_color, Color::WHITE);
    }
}
