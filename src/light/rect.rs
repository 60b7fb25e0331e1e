//! Rectangular area light.

use super::{LightSource, LightType, LightUniform};
use crate::math::{Color, Matrix4, Vector3};

/// Flat emitter of `width x height`, centered on the node and emitting
/// along the node's local -Z.
///
/// Width runs along local X, height along local Y. The rectangle itself is
/// invisible; attach a helper mesh to see it.
#[derive(Debug, Clone, PartialEq)]
pub struct RectAreaLight {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Extent along local X.
    pub width: f32,
    /// Extent along local Y.
    pub height: f32,
}

impl Default for RectAreaLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0, 1.0, 1.0)
    }
}

impl RectAreaLight {
    /// Create a rect light.
    pub fn new(color: Color, intensity: f32, width: f32, height: f32) -> Self {
        Self {
            color,
            intensity,
            width,
            height,
        }
    }

    /// Surface area.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// World-space corners, counter-clockwise seen from the lit side.
    pub fn corners(&self, world: &Matrix4) -> [Vector3; 4] {
        let (hw, hh) = (self.width * 0.5, self.height * 0.5);
        // (-x, -y), (-x, +y), (+x, +y), (+x, -y) in local space; looking
        // back along +Z this order turns counter-clockwise
        [
            Vector3::new(-hw, -hh, 0.0),
            Vector3::new(-hw, hh, 0.0),
            Vector3::new(hw, hh, 0.0),
            Vector3::new(hw, -hh, 0.0),
        ]
        .map(|p| world.transform_point(&p))
    }
}

impl LightSource for RectAreaLight {
    fn to_uniform(&self, world: &Matrix4) -> LightUniform {
        let scale = world.get_scale();
        LightUniform {
            position: world.get_position().to_array(),
            light_type: LightType::RectArea as u32,
            color: self.color.to_array(),
            intensity: self.intensity,
            direction: world.transform_direction(&Vector3::FORWARD).to_array(),
            range: 0.0,
            tangent: world.transform_direction(&Vector3::UNIT_X).to_array(),
            width: self.width * scale.x,
            params: [self.height * scale.y, 0.0, 0.0, 0.0],
        }
    }
}
