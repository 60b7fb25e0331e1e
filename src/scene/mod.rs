//! # Scene Module
//!
//! Arena-backed scene graph. Nodes live in a [`slotmap::SlotMap`] owned by
//! [`Scene`]; parents own their children as [`NodeId`] handles and every
//! node keeps a non-owning back-reference to its parent.
//!
//! The scene also owns the shared assets (geometries, materials, textures)
//! that mesh nodes reference by id, so many nodes can share one material.

mod node;
mod scene;
mod transform;
mod visibility;

pub use node::{NodeKind, SceneNode};
pub use scene::{Background, Scene, SceneError};
pub use transform::Transform;
pub use visibility::Visibility;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`].
    pub struct NodeId;
    /// Handle to a geometry stored in a [`Scene`].
    pub struct GeometryId;
    /// Handle to a material stored in a [`Scene`].
    pub struct MaterialId;
    /// Handle to a texture stored in a [`Scene`].
    pub struct TextureId;
}

/// Layer mask for object visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers {
    mask: u32,
}

impl Default for Layers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Layers {
    /// Only layer 0 enabled.
    pub const DEFAULT: Self = Self { mask: 1 };
    /// No layers enabled.
    pub const NONE: Self = Self { mask: 0 };
    /// Every layer enabled.
    pub const ALL: Self = Self { mask: u32::MAX };

    /// Mask with exactly one layer set. Layers past 31 are ignored.
    pub fn single(layer: u8) -> Self {
        let mut l = Self::NONE;
        l.enable(layer);
        l
    }

    /// Enable a layer.
    #[inline]
    pub fn enable(&mut self, layer: u8) {
        if layer < 32 {
            self.mask |= 1 << layer;
        }
    }

    /// Disable a layer.
    #[inline]
    pub fn disable(&mut self, layer: u8) {
        if layer < 32 {
            self.mask &= !(1 << layer);
        }
    }

    /// Whether a layer is enabled.
    #[inline]
    pub fn test(&self, layer: u8) -> bool {
        layer < 32 && (self.mask & (1 << layer)) != 0
    }

    /// Whether the two masks share a layer.
    #[inline]
    pub fn intersects(&self, other: &Layers) -> bool {
        (self.mask & other.mask) != 0
    }

    /// Raw mask.
    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers() {
        let mut a = Layers::DEFAULT;
        assert!(a.test(0));
        a.enable(3);
        assert!(a.intersects(&Layers::single(3)));
        a.disable(0);
        assert!(!a.intersects(&Layers::DEFAULT));
        a.enable(40);
        assert_eq!(a.mask(), 1 << 3);
    }
}
