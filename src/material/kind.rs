//! Shading parameters per material kind.

use super::ShadingModel;
use crate::math::Color;
use crate::scene::TextureId;
use bytemuck::{Pod, Zeroable};

/// Metal/roughness parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardParams {
    /// Base color.
    pub color: Color,
    /// 0 dielectric, 1 metal.
    pub metalness: f32,
    /// Microfacet roughness, 0..1.
    pub roughness: f32,
    /// Emitted radiance added after lighting.
    pub emissive: Color,
    /// Base color map.
    pub map: Option<TextureId>,
}

impl Default for StandardParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            emissive: Color::BLACK,
            map: None,
        }
    }
}

/// Standard parameters plus the glass and car-paint extras.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalParams {
    /// Base metal/roughness parameters.
    pub standard: StandardParams,
    /// Fraction of light passing through, 0..1.
    pub transmission: f32,
    /// Index of refraction.
    pub ior: f32,
    /// Thickness used to tint transmitted light.
    pub thickness: f32,
    /// Clearcoat layer strength, 0..1.
    pub clearcoat: f32,
    /// Clearcoat layer roughness.
    pub clearcoat_roughness: f32,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            standard: StandardParams::default(),
            transmission: 0.0,
            ior: 1.5,
            thickness: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
        }
    }
}

/// Closed set of shading models.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// Unlit color.
    Basic {
        /// Flat color.
        color: Color,
        /// Optional color map.
        map: Option<TextureId>,
    },
    /// Lit metal/roughness.
    Standard(StandardParams),
    /// Lit with clearcoat and transmission.
    Physical(PhysicalParams),
}

impl MaterialKind {
    /// Lighting model of this kind.
    pub fn shading_model(&self) -> ShadingModel {
        match self {
            Self::Basic { .. } => ShadingModel::Unlit,
            Self::Standard(_) => ShadingModel::Standard,
            Self::Physical(_) => ShadingModel::Physical,
        }
    }

    /// Base color.
    pub fn color(&self) -> Color {
        match self {
            Self::Basic { color, .. } => *color,
            Self::Standard(p) => p.color,
            Self::Physical(p) => p.standard.color,
        }
    }

    /// Color map reference.
    pub fn map(&self) -> Option<TextureId> {
        match self {
            Self::Basic { map, .. } => *map,
            Self::Standard(p) => p.map,
            Self::Physical(p) => p.standard.map,
        }
    }

    /// Transmission, zero for kinds without it.
    pub fn transmission(&self) -> f32 {
        match self {
            Self::Physical(p) => p.transmission,
            _ => 0.0,
        }
    }

    pub(super) fn set_color(&mut self, value: Color) {
        match self {
            Self::Basic { color, .. } => *color = value,
            Self::Standard(p) => p.color = value,
            Self::Physical(p) => p.standard.color = value,
        }
    }

    pub(super) fn set_map(&mut self, value: Option<TextureId>) {
        match self {
            Self::Basic { map, .. } => *map = value,
            Self::Standard(p) => p.map = value,
            Self::Physical(p) => p.standard.map = value,
        }
    }

    fn standard(&self) -> Option<&StandardParams> {
        match self {
            Self::Basic { .. } => None,
            Self::Standard(p) => Some(p),
            Self::Physical(p) => Some(&p.standard),
        }
    }

    /// Pack into the per-draw material block.
    pub fn to_uniform(&self, opacity: f32) -> MaterialUniform {
        let color = self.color().to_rgba(opacity);
        let (emissive, metalness, roughness) = match self.standard() {
            Some(s) => (s.emissive.to_rgba(0.0), s.metalness, s.roughness),
            None => ([0.0; 4], 0.0, 1.0),
        };
        let (extra, ior) = match self {
            Self::Physical(p) => (
                [p.clearcoat, p.clearcoat_roughness, p.thickness, 0.0],
                p.ior,
            ),
            _ => ([0.0; 4], 1.5),
        };
        MaterialUniform {
            color,
            emissive,
            params: [metalness, roughness, self.transmission(), ior],
            extra,
        }
    }
}

/// GPU layout of material parameters.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MaterialUniform {
    /// Base color rgb + opacity.
    pub color: [f32; 4],
    /// Emissive rgb.
    pub emissive: [f32; 4],
    /// metalness, roughness, transmission, ior.
    pub params: [f32; 4],
    /// clearcoat, clearcoat roughness, thickness.
    pub extra: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_packing() {
        let kind = MaterialKind::Physical(PhysicalParams {
            standard: StandardParams {
                color: Color::new(0.5, 0.25, 1.0),
                metalness: 0.3,
                roughness: 0.2,
                ..Default::default()
            },
            transmission: 1.0,
            clearcoat: 0.8,
            ..Default::default()
        });
        let u = kind.to_uniform(0.5);
        assert_eq!(u.color, [0.5, 0.25, 1.0, 0.5]);
        assert_eq!(u.params, [0.3, 0.2, 1.0, 1.5]);
        assert_eq!(u.extra[0], 0.8);
        assert_eq!(kind.shading_model(), ShadingModel::Physical);
    }

    #[test]
    fn test_basic_has_no_lighting_params() {
        let kind = MaterialKind::Basic { color: Color::WHITE, map: None };
        let u = kind.to_uniform(1.0);
        assert_eq!(u.params[0], 0.0);
        assert_eq!(kind.transmission(), 0.0);
    }
}
