//! Point light (omni-directional).

use super::{LightSource, LightType, LightUniform};
use crate::math::{Color, Matrix4};

/// Light radiating from the node's world position.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Cutoff distance; 0 means unbounded.
    pub distance: f32,
    /// Falloff exponent.
    pub decay: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0, 0.0)
    }
}

impl PointLight {
    /// Create a point light with physical (inverse-square) decay.
    pub fn new(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            decay: 2.0,
        }
    }
}

impl LightSource for PointLight {
    fn to_uniform(&self, world: &Matrix4) -> LightUniform {
        LightUniform {
            position: world.get_position().to_array(),
            light_type: LightType::Point as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            range: self.distance,
            params: [0.0, self.decay, 0.0, 0.0],
            ..Default::default()
        }
    }
}
