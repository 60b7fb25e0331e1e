//! Material: a shading kind plus the render state around it.

use super::{Blending, MaterialKind, PhysicalParams, ProgramKey, StandardParams};
use crate::math::Color;
use crate::scene::TextureId;

/// Which faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Counter-clockwise faces only.
    #[default]
    Front,
    /// Both faces.
    Double,
}

/// A material shared by any number of mesh nodes.
///
/// All edits go through setters so the program key stays in sync; an edit
/// that changes it raises [`needs_recompile`](Self::needs_recompile) until
/// the renderer has compiled the new variant.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    kind: MaterialKind,
    opacity: f32,
    transparent: bool,
    side: Side,
    vertex_colors: bool,
    depth_write: bool,
    program_key: ProgramKey,
    needs_recompile: bool,
}

impl Material {
    /// Material of the given kind with opaque defaults.
    pub fn new(kind: MaterialKind) -> Self {
        let mut m = Self {
            name: String::new(),
            kind,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            vertex_colors: false,
            depth_write: true,
            program_key: ProgramKey {
                shading: super::ShadingModel::Unlit,
                color_map: false,
                vertex_colors: false,
                blending: Blending::Opaque,
                double_sided: false,
                depth_write: true,
            },
            needs_recompile: true,
        };
        m.program_key = m.derive_key();
        m
    }

    /// Unlit color material.
    pub fn basic(color: Color) -> Self {
        Self::new(MaterialKind::Basic { color, map: None })
    }

    /// Lit metal/roughness material.
    pub fn standard(color: Color, metalness: f32, roughness: f32) -> Self {
        Self::new(MaterialKind::Standard(StandardParams {
            color,
            metalness,
            roughness,
            ..Default::default()
        }))
    }

    /// Physical material.
    pub fn physical(params: PhysicalParams) -> Self {
        Self::new(MaterialKind::Physical(params))
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    /// Force alpha blending.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.set_transparent(transparent);
        self
    }

    /// Set face culling.
    pub fn with_side(mut self, side: Side) -> Self {
        self.set_side(side);
        self
    }

    /// Set the color map.
    pub fn with_map(mut self, map: TextureId) -> Self {
        self.set_map(Some(map));
        self
    }

    /// Enable vertex colors.
    pub fn with_vertex_colors(mut self, enabled: bool) -> Self {
        self.set_vertex_colors(enabled);
        self
    }

    /// Name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shading kind.
    #[inline]
    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    /// Opacity, 0..1.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Face culling.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether depth is written.
    #[inline]
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Blended and drawn back to front: flagged transparent, translucent,
    /// or transmissive.
    pub fn is_transparent(&self) -> bool {
        self.transparent || self.opacity < 1.0 || self.kind.transmission() > 0.0
    }

    /// Current shader-variant key.
    #[inline]
    pub fn program_key(&self) -> ProgramKey {
        self.program_key
    }

    /// Whether the renderer still has to compile this material's variant.
    #[inline]
    pub fn needs_recompile(&self) -> bool {
        self.needs_recompile
    }

    /// Called by the renderer once the variant exists.
    pub fn mark_compiled(&mut self) {
        self.needs_recompile = false;
    }

    /// Set the base color.
    pub fn set_color(&mut self, color: Color) {
        self.edit(|m| m.kind.set_color(color));
    }

    /// Set the color map; `None` removes it.
    pub fn set_map(&mut self, map: Option<TextureId>) {
        self.edit(|m| m.kind.set_map(map));
    }

    /// Set opacity; below 1 the material blends.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.edit(|m| m.opacity = opacity.clamp(0.0, 1.0));
    }

    /// Force blending regardless of opacity.
    pub fn set_transparent(&mut self, transparent: bool) {
        self.edit(|m| m.transparent = transparent);
    }

    /// Set face culling.
    pub fn set_side(&mut self, side: Side) {
        self.edit(|m| m.side = side);
    }

    /// Toggle vertex colors.
    pub fn set_vertex_colors(&mut self, enabled: bool) {
        self.edit(|m| m.vertex_colors = enabled);
    }

    /// Toggle depth writes.
    pub fn set_depth_write(&mut self, enabled: bool) {
        self.edit(|m| m.depth_write = enabled);
    }

    /// Replace the shading kind.
    pub fn set_kind(&mut self, kind: MaterialKind) {
        self.edit(|m| m.kind = kind);
    }

    /// Edit kind parameters in place.
    pub fn modify_kind(&mut self, f: impl FnOnce(&mut MaterialKind)) {
        self.edit(|m| f(&mut m.kind));
    }

    fn edit(&mut self, f: impl FnOnce(&mut Self)) {
        f(self);
        let key = self.derive_key();
        if key != self.program_key {
            self.program_key = key;
            self.needs_recompile = true;
        }
    }

    fn derive_key(&self) -> ProgramKey {
        ProgramKey {
            shading: self.kind.shading_model(),
            color_map: self.kind.map().is_some(),
            vertex_colors: self.vertex_colors,
            blending: if self.is_transparent() {
                Blending::Alpha
            } else {
                Blending::Opaque
            },
            double_sided: self.side == Side::Double,
            depth_write: self.depth_write,
        }
    }
}

impl From<MaterialKind> for Material {
    fn from(kind: MaterialKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShadingModel;

    #[test]
    fn test_transparency_sources() {
        assert!(!Material::standard(Color::WHITE, 0.0, 0.5).is_transparent());
        assert!(Material::basic(Color::WHITE).with_opacity(0.5).is_transparent());
        assert!(Material::basic(Color::WHITE).with_transparent(true).is_transparent());
        let glass = Material::physical(PhysicalParams {
            transmission: 1.0,
            ..Default::default()
        });
        assert!(glass.is_transparent());
        assert_eq!(glass.program_key().blending, Blending::Alpha);
    }

    #[test]
    fn test_only_key_changes_need_recompile() {
        let mut m = Material::standard(Color::WHITE, 0.0, 0.5);
        assert!(m.needs_recompile());
        m.mark_compiled();

        m.set_color(Color::new(1.0, 0.0, 0.0));
        m.modify_kind(|k| {
            if let MaterialKind::Standard(p) = k {
                p.roughness = 0.1;
            }
        });
        assert!(!m.needs_recompile());

        m.set_opacity(0.4);
        assert!(m.needs_recompile());
        assert_eq!(m.program_key().blending, Blending::Alpha);
        m.mark_compiled();

        m.set_kind(MaterialKind::Basic { color: Color::WHITE, map: None });
        assert!(m.needs_recompile());
        assert_eq!(m.program_key().shading, ShadingModel::Unlit);
    }

    #[test]
    fn test_side_and_vertex_colors_in_key() {
        let m = Material::basic(Color::WHITE)
            .with_side(Side::Double)
            .with_vertex_colors(true);
        assert!(m.program_key().double_sided);
        assert!(m.program_key().vertex_colors);
    }
}
