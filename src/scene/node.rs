//! A single node of the scene graph.

use super::{GeometryId, MaterialId, NodeId, Transform, Visibility};
use crate::light::Light;
use crate::math::{Quaternion, Vector3};

/// What a node contributes to the frame.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure transform node.
    Group,
    /// Drawable geometry with a material.
    Mesh {
        /// Shared geometry.
        geometry: GeometryId,
        /// Shared material.
        material: MaterialId,
    },
    /// Light source, placed by the node's world matrix.
    Light(Light),
}

impl NodeKind {
    /// Mesh kind.
    pub fn mesh(geometry: GeometryId, material: MaterialId) -> Self {
        Self::Mesh { geometry, material }
    }

    /// Whether the node issues draw calls.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        matches!(self, Self::Mesh { .. })
    }
}

impl From<Light> for NodeKind {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}

/// A node in the scene graph.
///
/// Hierarchy links are managed by [`Scene`](super::Scene); a node built on
/// its own is detached.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    /// Local transform and cached matrices.
    pub transform: Transform,
    /// Visibility settings.
    pub visibility: Visibility,
    kind: NodeKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl SceneNode {
    /// Detached node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: String::new(),
            transform: Transform::new(),
            visibility: Visibility::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Empty group.
    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    /// Mesh node.
    pub fn mesh(geometry: GeometryId, material: MaterialId) -> Self {
        Self::new(NodeKind::mesh(geometry, material))
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the local position.
    pub fn with_position(mut self, position: Vector3) -> Self {
        self.transform.set_position(position);
        self
    }

    /// Set the local orientation.
    pub fn with_quaternion(mut self, quaternion: Quaternion) -> Self {
        self.transform.set_quaternion(quaternion);
        self
    }

    /// Set the local scale.
    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.transform.set_scale(scale);
        self
    }

    /// Node name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Node kind.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable node kind, for tweaking light or mesh bindings.
    #[inline]
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Parent handle.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in insertion order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl From<NodeKind> for SceneNode {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

impl From<Light> for SceneNode {
    fn from(light: Light) -> Self {
        Self::new(NodeKind::Light(light))
    }
}
