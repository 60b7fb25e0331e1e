//! Ambient light.

use crate::math::Color;

/// Uniform light reaching every surface equally.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 0.1)
    }
}

impl AmbientLight {
    /// Create an ambient light.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Color scaled by intensity.
    pub fn effective_color(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}
