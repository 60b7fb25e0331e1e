//! Lights attached to scene nodes and their GPU packing.

mod ambient;
mod point;
mod rect;

pub use ambient::AmbientLight;
pub use point::PointLight;
pub use rect::RectAreaLight;

use crate::math::Matrix4;
use bytemuck::{Pod, Zeroable};

/// Maximum number of punctual and area lights per frame.
pub const MAX_LIGHTS: usize = 8;

/// Light type identifier for the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightType {
    /// Point light.
    Point = 0,
    /// Rectangular area light.
    RectArea = 1,
}

/// Closed set of lights a node can carry.
///
/// Position and orientation come from the owning node's world matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Constant fill light.
    Ambient(AmbientLight),
    /// Omni-directional light.
    Point(PointLight),
    /// Rectangular emitter.
    RectArea(RectAreaLight),
}

impl Light {
    /// Pack for the GPU; ambient lights have no per-light slot.
    pub fn to_uniform(&self, world: &Matrix4) -> Option<LightUniform> {
        match self {
            Self::Ambient(_) => None,
            Self::Point(l) => Some(l.to_uniform(world)),
            Self::RectArea(l) => Some(l.to_uniform(world)),
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(l: AmbientLight) -> Self {
        Self::Ambient(l)
    }
}

impl From<PointLight> for Light {
    fn from(l: PointLight) -> Self {
        Self::Point(l)
    }
}

impl From<RectAreaLight> for Light {
    fn from(l: RectAreaLight) -> Self {
        Self::RectArea(l)
    }
}

/// Lights that occupy a slot in [`LightsUniform`].
pub trait LightSource {
    /// Pack the light placed by `world`.
    fn to_uniform(&self, world: &Matrix4) -> LightUniform;
}

/// GPU light record (80 bytes).
///
/// For rect-area lights `direction` is the emitting normal, `tangent` the
/// width axis, `width` and `params[0]` the world-space extent.
/// For point lights `range` is the cutoff distance and `params[1]` the decay.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LightUniform {
    /// World position.
    pub position: [f32; 3],
    /// [`LightType`] discriminant.
    pub light_type: u32,
    /// Linear color.
    pub color: [f32; 3],
    /// Intensity.
    pub intensity: f32,
    /// Emitting direction.
    pub direction: [f32; 3],
    /// Cutoff distance, 0 for unbounded.
    pub range: f32,
    /// Width axis.
    pub tangent: [f32; 3],
    /// Width.
    pub width: f32,
    /// height, decay, unused, unused.
    pub params: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            light_type: LightType::Point as u32,
            color: [1.0; 3],
            intensity: 1.0,
            direction: [0.0, 0.0, -1.0],
            range: 0.0,
            tangent: [1.0, 0.0, 0.0],
            width: 0.0,
            params: [0.0; 4],
        }
    }
}

/// Every light of a frame, laid out for one uniform binding.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LightsUniform {
    /// Summed ambient rgb; w unused.
    pub ambient: [f32; 4],
    /// Active entries in `lights`.
    pub num_lights: u32,
    /// Padding (u32 to match WGSL alignment).
    pub _padding: [u32; 3],
    /// Light records.
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            ambient: [0.0; 4],
            num_lights: 0,
            _padding: [0; 3],
            lights: [LightUniform::default(); MAX_LIGHTS],
        }
    }
}

impl LightsUniform {
    /// Empty light set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect lights with their world matrices. Ambient lights add up;
    /// lights past [`MAX_LIGHTS`] are dropped.
    pub fn gather<'a>(lights: impl IntoIterator<Item = (&'a Light, &'a Matrix4)>) -> Self {
        let mut out = Self::new();
        let mut dropped = 0usize;
        for (light, world) in lights {
            match light {
                Light::Ambient(a) => out.add_ambient(a),
                other => {
                    if let Some(u) = other.to_uniform(world) {
                        if out.add_light(u).is_none() {
                            dropped += 1;
                        }
                    }
                }
            }
        }
        if dropped > 0 {
            log::warn!("{} lights over the limit of {} were dropped", dropped, MAX_LIGHTS);
        }
        out
    }

    /// Accumulate an ambient light.
    pub fn add_ambient(&mut self, light: &AmbientLight) {
        let c = light.effective_color();
        self.ambient[0] += c.r;
        self.ambient[1] += c.g;
        self.ambient[2] += c.b;
    }

    /// Add a light and return its index, or `None` when full.
    pub fn add_light(&mut self, light: LightUniform) -> Option<usize> {
        let index = self.num_lights as usize;
        if index >= MAX_LIGHTS {
            return None;
        }
        self.lights[index] = light;
        self.num_lights += 1;
        Some(index)
    }

    /// Active light records.
    pub fn active(&self) -> &[LightUniform] {
        &self.lights[..self.num_lights as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vector3};

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }

    #[test]
    fn test_gather_accumulates_ambient() {
        let a = Light::from(AmbientLight::new(Color::WHITE, 0.25));
        let b = Light::from(AmbientLight::new(Color::new(1.0, 0.0, 0.0), 0.5));
        let p = Light::from(PointLight::new(Color::WHITE, 2.0, 10.0));
        let world = Matrix4::from_translation(&Vector3::new(1.0, 2.0, 3.0));
        let id = Matrix4::IDENTITY;
        let u = LightsUniform::gather([(&a, &id), (&b, &id), (&p, &world)]);
        assert_eq!(u.num_lights, 1);
        assert!((u.ambient[0] - 0.75).abs() < 1e-6);
        assert!((u.ambient[1] - 0.25).abs() < 1e-6);
        assert_eq!(u.active()[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(u.active()[0].params[1], 2.0);
    }

    #[test]
    fn test_gather_drops_overflow() {
        let p = Light::from(PointLight::default());
        let id = Matrix4::IDENTITY;
        let lights = vec![(&p, &id); MAX_LIGHTS + 3];
        let u = LightsUniform::gather(lights);
        assert_eq!(u.num_lights as usize, MAX_LIGHTS);
    }
}
