//! Scene container - the node arena plus the shared assets.

use super::{GeometryId, MaterialId, NodeId, NodeKind, SceneNode, TextureId};
use crate::geometry::Geometry;
use crate::material::Material;
use crate::math::{Color, Matrix4, Vector3};
use crate::texture::Texture;
use slotmap::SlotMap;
use thiserror::Error;

/// Errors from hierarchy edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not name a live node.
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    /// The child is attached elsewhere; detach it first.
    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// Node being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// The child is the parent itself or one of its ancestors.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },
    /// The root cannot be detached, removed or re-parented.
    #[error("the scene root cannot be detached or removed")]
    RootImmutable,
}

/// Background type for the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Background {
    /// Solid color clear.
    Color(Color),
    /// Use the renderer's configured clear color.
    #[default]
    None,
}

/// The scene - node arena, root handle and asset storage.
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    geometries: SlotMap<GeometryId, Geometry>,
    materials: SlotMap<MaterialId, Material>,
    textures: SlotMap<TextureId, Texture>,
    background: Background,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding only its root group.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group().with_name("Scene"));
        Self {
            nodes,
            root,
            geometries: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            background: Background::None,
        }
    }

    /// Root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Background.
    #[inline]
    pub fn background(&self) -> Background {
        self.background
    }

    /// Set the background.
    #[inline]
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Number of live nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a detached node.
    pub fn add_node(&mut self, node: impl Into<SceneNode>) -> NodeId {
        let mut node = node.into();
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Insert a node and attach it to the root.
    pub fn add(&mut self, node: impl Into<SceneNode>) -> NodeId {
        let id = self.add_node(node);
        let root = self.root;
        self.link(root, id);
        id
    }

    /// Node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Mutable node by id.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the id names a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of a node; empty for a stale id.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    /// Attach `child` under `parent`.
    ///
    /// The child's local transform is kept as-is, so its world transform
    /// changes with the new parent. Attaching to the current parent is a
    /// no-op.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let current = self
            .nodes
            .get(child)
            .ok_or(SceneError::NodeNotFound(child))?
            .parent;

        if child == self.root {
            return Err(SceneError::RootImmutable);
        }
        match current {
            Some(p) if p == parent => return Ok(()),
            Some(p) => return Err(SceneError::AlreadyParented { child, parent: p }),
            None => {}
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        self.link(parent, child);
        Ok(())
    }

    /// Unlink a node from its parent. Detached nodes stay alive but are not
    /// traversed or drawn.
    pub fn detach(&mut self, child: NodeId) -> Result<(), SceneError> {
        if child == self.root {
            return Err(SceneError::RootImmutable);
        }
        let node = self.nodes.get_mut(child).ok_or(SceneError::NodeNotFound(child))?;
        if let Some(parent) = node.parent.take() {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&c| c != child);
            }
        }
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns how many nodes were freed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        self.detach(id)?;
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.parent(node) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    /// Recompute `node`'s world matrix from `parent_world` and its local
    /// matrix, then walk its subtree depth-first in pre-order.
    ///
    /// Only dirty local matrices are recomposed; world matrices always are.
    pub fn update_world_matrix(
        &mut self,
        node: NodeId,
        parent_world: Option<&Matrix4>,
    ) -> Result<(), SceneError> {
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        let mut stack = vec![(node, parent_world.copied())];
        while let Some((id, parent)) = stack.pop() {
            let Some(n) = self.nodes.get_mut(id) else {
                continue;
            };
            n.transform.update_world_matrix(parent.as_ref());
            let world = *n.transform.world_matrix();
            stack.extend(n.children.iter().rev().map(|&c| (c, Some(world))));
        }
        Ok(())
    }

    /// Per-frame pass from the root.
    pub fn update_world_matrices(&mut self) {
        let root = self.root;
        // root always exists
        let _ = self.update_world_matrix(root, None);
    }

    /// World position as of the last pass.
    pub fn world_position(&self, id: NodeId) -> Option<Vector3> {
        self.nodes.get(id).map(|n| n.transform.world_position())
    }

    /// Visit every node reachable from the root, pre-order.
    pub fn traverse<F>(&self, mut callback: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        self.walk(self.root, false, &mut callback);
    }

    /// Like [`traverse`](Self::traverse), skipping hidden subtrees.
    pub fn traverse_visible<F>(&self, mut callback: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        self.walk(self.root, true, &mut callback);
    }

    fn walk<F>(&self, start: NodeId, visible_only: bool, callback: &mut F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if visible_only && !node.visibility.is_visible() {
                continue;
            }
            callback(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// First node in traversal order with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.traverse(|id, node| {
            if found.is_none() && node.name() == name {
                found = Some(id);
            }
        });
        found
    }

    /// Store a geometry for mesh nodes to share.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    /// Geometry by id.
    #[inline]
    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    /// Store a material for mesh nodes to share.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    /// Material by id.
    #[inline]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Mutable material by id.
    #[inline]
    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// All materials, mutable.
    pub fn materials_mut(&mut self) -> impl Iterator<Item = (MaterialId, &mut Material)> {
        self.materials.iter_mut()
    }

    /// Store an in-memory texture.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    /// Texture by id.
    #[inline]
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    /// Drop a texture. Materials still naming it fall back to flat color.
    pub fn remove_texture(&mut self, id: TextureId) -> Option<Texture> {
        self.textures.remove(id)
    }

    /// Mesh bindings of a node, if it is a mesh.
    pub fn mesh_of(&self, id: NodeId) -> Option<(GeometryId, MaterialId)> {
        match self.nodes.get(id)?.kind() {
            NodeKind::Mesh { geometry, material } => Some((*geometry, *material)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("geometries", &self.geometries.len())
            .field("materials", &self.materials.len())
            .field("textures", &self.textures.len())
            .field("background", &self.background)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quaternion;
    use std::f32::consts::FRAC_PI_2;

    fn group_at(scene: &mut Scene, name: &str, pos: Vector3) -> NodeId {
        scene.add_node(SceneNode::group().with_name(name).with_position(pos))
    }

    #[test]
    fn test_root_rotation_moves_child() {
        let mut scene = Scene::new();
        let parent = scene.add(SceneNode::group());
        let child = group_at(&mut scene, "child", Vector3::new(10.0, 0.0, 0.0));
        scene.add_child(parent, child).unwrap();

        scene
            .node_mut(parent)
            .unwrap()
            .transform
            .set_quaternion(Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2));
        scene.update_world_matrices();

        let pos = scene.world_position(child).unwrap();
        assert!(pos.approx_eq(&Vector3::new(0.0, 0.0, -10.0), 1e-5));
    }

    #[test]
    fn test_world_equals_parent_times_local() {
        let mut scene = Scene::new();
        let a = scene.add(
            SceneNode::group()
                .with_position(Vector3::new(1.0, 2.0, 3.0))
                .with_quaternion(Quaternion::from_axis_angle(&Vector3::UNIT_X, 0.4))
                .with_scale(Vector3::splat(2.0)),
        );
        let b = group_at(&mut scene, "b", Vector3::new(0.0, 1.0, 0.0));
        let c = group_at(&mut scene, "c", Vector3::new(-3.0, 0.0, 1.0));
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        scene.update_world_matrices();

        for (parent, child) in [(a, b), (b, c)] {
            let pw = *scene.node(parent).unwrap().transform.world_matrix();
            let cn = scene.node(child).unwrap();
            let expected = pw * cn.transform.local_matrix();
            assert!(cn.transform.world_matrix().approx_eq(&expected, 1e-5));
        }
    }

    #[test]
    fn test_add_child_rejects_second_parent() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::group());
        let b = scene.add(SceneNode::group());
        let c = scene.add_node(SceneNode::group());
        scene.add_child(a, c).unwrap();
        assert_eq!(scene.add_child(a, c), Ok(()));
        assert_eq!(
            scene.add_child(b, c),
            Err(SceneError::AlreadyParented { child: c, parent: a })
        );
        scene.detach(c).unwrap();
        scene.add_child(b, c).unwrap();
        assert_eq!(scene.parent(c), Some(b));
        assert!(scene.children(a).is_empty());
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.add_node(SceneNode::group());
        let b = scene.add_node(SceneNode::group());
        scene.add_child(a, b).unwrap();
        assert_eq!(
            scene.add_child(b, a),
            Err(SceneError::WouldCreateCycle { parent: b, child: a })
        );
        assert_eq!(
            scene.add_child(a, a),
            Err(SceneError::WouldCreateCycle { parent: a, child: a })
        );
        let root = scene.root();
        assert_eq!(scene.add_child(a, root), Err(SceneError::RootImmutable));
    }

    #[test]
    fn test_reparent_keeps_local_transform() {
        let mut scene = Scene::new();
        let a = group_at(&mut scene, "a", Vector3::new(5.0, 0.0, 0.0));
        let b = group_at(&mut scene, "b", Vector3::new(0.0, 0.0, 7.0));
        let root = scene.root();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        let child = group_at(&mut scene, "child", Vector3::new(1.0, 1.0, 1.0));
        scene.add_child(a, child).unwrap();
        scene.update_world_matrices();
        let local_before = scene.node(child).unwrap().transform.local_matrix();
        let world_before = scene.world_position(child).unwrap();

        scene.detach(child).unwrap();
        scene.add_child(b, child).unwrap();
        scene.update_world_matrices();

        let node = scene.node(child).unwrap();
        assert_eq!(node.transform.local_matrix(), local_before);
        assert_eq!(node.transform.position(), Vector3::new(1.0, 1.0, 1.0));
        assert!(!scene.world_position(child).unwrap().approx_eq(&world_before, 1e-3));
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::group());
        let b = scene.add_node(SceneNode::group());
        let c = scene.add_node(SceneNode::group());
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        assert_eq!(scene.remove(a), Ok(3));
        assert!(!scene.contains(b) && !scene.contains(c));
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.add_child(c, a), Err(SceneError::NodeNotFound(c)));
        assert_eq!(scene.remove(scene.root()), Err(SceneError::RootImmutable));
    }

    #[test]
    fn test_traversal_is_preorder() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::group().with_name("a"));
        let a1 = scene.add_node(SceneNode::group().with_name("a1"));
        scene.add_child(a, a1).unwrap();
        scene.add(SceneNode::group().with_name("b"));

        let mut names = Vec::new();
        scene.traverse(|_, n| names.push(n.name().to_string()));
        assert_eq!(names, ["Scene", "a", "a1", "b"]);
        assert_eq!(scene.find_by_name("a1"), Some(a1));
        assert_eq!(scene.find_by_name("missing"), None);
    }

    #[test]
    fn test_traverse_visible_skips_hidden_subtree() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::group().with_name("a"));
        let a1 = scene.add_node(SceneNode::group().with_name("a1"));
        scene.add_child(a, a1).unwrap();
        scene.node_mut(a).unwrap().visibility.set_visible(false);

        let mut count = 0;
        scene.traverse_visible(|_, _| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_clears_dirty_locals() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::group().with_position(Vector3::ONE));
        assert!(scene.node(a).unwrap().transform.is_local_dirty());
        scene.update_world_matrices();
        assert!(!scene.node(a).unwrap().transform.is_local_dirty());
    }
}
