//! Visibility settings for scene nodes.

use super::Layers;

/// Whether and where a node is drawn.
#[derive(Debug, Clone)]
pub struct Visibility {
    visible: bool,
    frustum_culled: bool,
    layers: Layers,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            visible: true,
            frustum_culled: true,
            layers: Layers::DEFAULT,
        }
    }
}

impl Visibility {
    /// Whether the node (and so its subtree) is drawn.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the node.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the frustum test may skip this node.
    #[inline]
    pub fn is_frustum_culled(&self) -> bool {
        self.frustum_culled
    }

    /// Opt in or out of frustum culling.
    #[inline]
    pub fn set_frustum_culled(&mut self, culled: bool) {
        self.frustum_culled = culled;
    }

    /// Layer mask.
    #[inline]
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Mutable layer mask.
    #[inline]
    pub fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }

    /// Visible and sharing a layer with the camera.
    #[inline]
    pub fn visible_to_camera(&self, camera_layers: &Layers) -> bool {
        self.visible && self.layers.intersects(camera_layers)
    }
}
