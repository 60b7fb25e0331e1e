//! Flattened, sorted draw list for one frame.

use crate::camera::PerspectiveCamera;
use crate::material::ProgramKey;
use crate::math::{Matrix4, Sphere};
use crate::scene::{GeometryId, Layers, MaterialId, NodeId, NodeKind, Scene};
use std::cmp::Ordering;

/// Options for building a [`RenderList`].
#[derive(Debug, Clone)]
pub struct RenderListOptions {
    /// Skip nodes whose world bounding sphere lies outside the frustum.
    pub frustum_culling: bool,
    /// Layer mask overriding the camera's.
    pub layers: Option<Layers>,
}

impl Default for RenderListOptions {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            layers: None,
        }
    }
}

/// One draw call worth of state.
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Source node.
    pub node: NodeId,
    /// Geometry drawn.
    pub geometry: GeometryId,
    /// Material used.
    pub material: MaterialId,
    /// Program variant of the material.
    pub program: ProgramKey,
    /// Node world matrix.
    pub world_matrix: Matrix4,
    /// World bounding sphere.
    pub bounds: Sphere,
    /// Camera distance to the bounds center.
    pub distance: f32,
    /// Drawn in the blended pass.
    pub transparent: bool,
}

/// Visible drawables split into an opaque and a transparent pass.
#[derive(Debug, Default)]
pub struct RenderList {
    opaque: Vec<RenderItem>,
    transparent: Vec<RenderItem>,
    culled: u32,
    skipped: u32,
}

impl RenderList {
    /// Collect and sort the drawables of `scene` as seen by `camera`.
    ///
    /// World matrices and camera matrices must be current. Opaque items are
    /// grouped by program, then material, then sorted front to back.
    /// Transparent items follow strictly back to front.
    pub fn build(scene: &Scene, camera: &PerspectiveCamera, options: &RenderListOptions) -> Self {
        let mut list = Self::default();
        let layers = options.layers.unwrap_or(camera.layers);
        let frustum = camera.frustum();
        let eye = camera.world_position();

        scene.traverse_visible(|id, node| {
            let NodeKind::Mesh { geometry, material } = *node.kind() else {
                return;
            };
            if !node.visibility.visible_to_camera(&layers) {
                return;
            }
            let (Some(geo), Some(mat)) = (scene.geometry(geometry), scene.material(material)) else {
                log::warn!("Mesh {:?} references a missing geometry or material", id);
                list.skipped += 1;
                return;
            };
            if geo.is_empty() {
                list.skipped += 1;
                return;
            }

            let world_matrix = *node.transform.world_matrix();
            let bounds = geo.bounding_sphere().apply_matrix4(&world_matrix);
            if options.frustum_culling
                && node.visibility.is_frustum_culled()
                && !frustum.intersects_sphere(&bounds)
            {
                list.culled += 1;
                return;
            }

            let transparent = mat.is_transparent();
            let item = RenderItem {
                node: id,
                geometry,
                material,
                program: mat.program_key(),
                world_matrix,
                bounds,
                distance: eye.distance_to(&bounds.center),
                transparent,
            };
            if transparent {
                list.transparent.push(item);
            } else {
                list.opaque.push(item);
            }
        });

        list.opaque.sort_by(compare_opaque);
        list.transparent.sort_by(compare_transparent);
        list
    }

    /// Opaque items in draw order.
    #[inline]
    pub fn opaque(&self) -> &[RenderItem] {
        &self.opaque
    }

    /// Transparent items in draw order.
    #[inline]
    pub fn transparent(&self) -> &[RenderItem] {
        &self.transparent
    }

    /// Every item in draw order.
    pub fn items(&self) -> impl Iterator<Item = &RenderItem> {
        self.opaque.iter().chain(self.transparent.iter())
    }

    /// Number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    /// Whether nothing is drawn.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items rejected by the frustum test.
    #[inline]
    pub fn culled(&self) -> u32 {
        self.culled
    }

    /// Items with nothing drawable.
    #[inline]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

fn compare_opaque(a: &RenderItem, b: &RenderItem) -> Ordering {
    a.program
        .cmp(&b.program)
        .then_with(|| a.material.cmp(&b.material))
        .then_with(|| a.distance.total_cmp(&b.distance))
}

fn compare_transparent(a: &RenderItem, b: &RenderItem) -> Ordering {
    b.distance
        .total_cmp(&a.distance)
        .then_with(|| a.node.cmp(&b.node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoxGeometry, Geometry};
    use crate::material::Material;
    use crate::math::{Color, Vector3};
    use crate::scene::SceneNode;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 10.0));
        camera.look_at(&Vector3::ZERO);
        camera.update_matrices();
        camera
    }

    fn build(scene: &mut Scene, camera: &PerspectiveCamera) -> RenderList {
        scene.update_world_matrices();
        RenderList::build(scene, camera, &RenderListOptions::default())
    }

    #[test]
    fn test_transparent_back_to_front_after_opaque() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let solid = scene.add_material(Material::standard(Color::WHITE, 0.0, 0.5));
        let glass = scene.add_material(Material::basic(Color::WHITE).with_opacity(0.5));

        let near = scene.add(SceneNode::mesh(geo, glass).with_position(Vector3::new(0.0, 0.0, 4.0)));
        let far = scene.add(SceneNode::mesh(geo, glass).with_position(Vector3::new(0.0, 0.0, -4.0)));
        let mid = scene.add(SceneNode::mesh(geo, glass));
        let wall = scene.add(SceneNode::mesh(geo, solid).with_position(Vector3::new(0.0, 0.0, -8.0)));

        let list = build(&mut scene, &camera());
        let order: Vec<NodeId> = list.items().map(|i| i.node).collect();
        assert_eq!(order, vec![wall, far, mid, near]);
        assert!(list.items().take(1).all(|i| !i.transparent));
    }

    #[test]
    fn test_equal_distance_ties_break_by_node() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let glass = scene.add_material(Material::basic(Color::WHITE).with_transparent(true));
        let a = scene.add(SceneNode::mesh(geo, glass).with_position(Vector3::new(-2.0, 0.0, 0.0)));
        let b = scene.add(SceneNode::mesh(geo, glass).with_position(Vector3::new(2.0, 0.0, 0.0)));

        let list = build(&mut scene, &camera());
        let mut expected = vec![a, b];
        expected.sort();
        let order: Vec<NodeId> = list.items().map(|i| i.node).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_opaque_grouped_by_program() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let lit = scene.add_material(Material::standard(Color::WHITE, 0.0, 0.5));
        let unlit = scene.add_material(Material::basic(Color::WHITE));
        for (i, mat) in [lit, unlit, lit, unlit].into_iter().enumerate() {
            scene.add(SceneNode::mesh(geo, mat).with_position(Vector3::new(i as f32 - 1.5, 0.0, 0.0)));
        }

        let list = build(&mut scene, &camera());
        let programs: Vec<ProgramKey> = list.opaque().iter().map(|i| i.program).collect();
        let switches = programs.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_culling_and_skipping() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let empty = scene.add_geometry(Geometry::empty());
        let mat = scene.add_material(Material::basic(Color::WHITE));
        scene.add(SceneNode::mesh(geo, mat).with_position(Vector3::new(0.0, 0.0, 50.0)));
        scene.add(SceneNode::mesh(empty, mat));
        let pinned = scene.add(SceneNode::mesh(geo, mat).with_position(Vector3::new(0.0, 0.0, 50.0)));
        scene.node_mut(pinned).unwrap().visibility.set_frustum_culled(false);

        let list = build(&mut scene, &camera());
        assert_eq!(list.culled(), 1);
        assert_eq!(list.skipped(), 1);
        assert_eq!(list.len(), 1);

        let all = RenderList::build(
            &scene,
            &camera(),
            &RenderListOptions {
                frustum_culling: false,
                ..Default::default()
            },
        );
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_layers_filter_nodes() {
        let mut scene = Scene::new();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let mat = scene.add_material(Material::basic(Color::WHITE));
        let hidden = scene.add(SceneNode::mesh(geo, mat));
        *scene.node_mut(hidden).unwrap().visibility.layers_mut() = Layers::single(3);
        scene.add(SceneNode::mesh(geo, mat));

        let mut cam = camera();
        cam.layers = Layers::DEFAULT;
        let list = build(&mut scene, &cam);
        assert_eq!(list.len(), 1);
        assert!(list.items().all(|i| i.node != hidden));
    }
}
