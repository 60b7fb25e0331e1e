//! The demo scene: a tiled floor lit by three rect lights, with a glass
//! sphere and a car-paint torus around a central pedestal.

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::{BoxGeometry, PlaneGeometry, SphereGeometry, TorusGeometry};
use crate::light::{AmbientLight, Light, PointLight, RectAreaLight};
use crate::material::{Material, PhysicalParams, Side, StandardParams};
use crate::math::{Color, Quaternion, Vector3};
use crate::scene::{Background, GeometryId, MaterialId, NodeId, Scene, SceneError, SceneNode};
use crate::texture::Texture;
use std::f32::consts::PI;

/// Blocks per floor edge.
pub const GRID_SIZE: usize = 20;

const BLOCK_SIZE: f32 = 1.0;
const BLOCK_GAP: f32 = 0.05;
const SPHERE_HEIGHT: f32 = 2.6;
const LIGHT_ORBIT_RADIUS: f32 = 6.0;
const LIGHT_HEIGHT: f32 = 4.0;

/// Handles to the demo's nodes and shared assets.
#[derive(Debug, Clone)]
pub struct Showcase {
    /// Geometry shared by every floor block.
    pub block_geometry: GeometryId,
    /// Material shared by every floor block.
    pub block_material: MaterialId,
    /// Floor blocks, row-major.
    pub blocks: Vec<NodeId>,
    /// Central pedestal.
    pub pedestal: NodeId,
    /// Transmissive sphere above the pedestal.
    pub glass_sphere: NodeId,
    /// Clearcoated torus.
    pub torus: NodeId,
    /// Rect lights, each with a helper plane child.
    pub rect_lights: [NodeId; 3],
    /// Orbiting point light.
    pub point_light: NodeId,
}

impl Showcase {
    /// Populate `scene` with the demo.
    pub fn build(scene: &mut Scene) -> Result<Self, SceneError> {
        scene.set_background(Background::Color(Color::from_srgb_hex(0x101318)));

        let block_geometry = scene.add_geometry(BoxGeometry::new(BLOCK_SIZE, 0.2, BLOCK_SIZE).into());
        let block_material = scene.add_material(
            Material::standard(Color::from_srgb_hex(0x808890), 0.1, 0.6).with_name("floor"),
        );
        let floor = scene.add(SceneNode::group().with_name("floor"));
        let pitch = BLOCK_SIZE + BLOCK_GAP;
        let half = (GRID_SIZE as f32 - 1.0) * 0.5;
        let mut blocks = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let position = Vector3::new(
                    (col as f32 - half) * pitch,
                    -0.1,
                    (row as f32 - half) * pitch,
                );
                let block = scene.add_node(
                    SceneNode::mesh(block_geometry, block_material)
                        .with_name(format!("block_{row}_{col}"))
                        .with_position(position),
                );
                scene.add_child(floor, block)?;
                blocks.push(block);
            }
        }

        let checker = scene.add_texture(
            Texture::checkerboard(64, 8, [235, 235, 235, 255], [40, 40, 48, 255]).with_label("pedestal"),
        );
        let pedestal_geometry = scene.add_geometry(BoxGeometry::new(2.0, 1.2, 2.0).into());
        let pedestal_material = scene.add_material(
            Material::standard(Color::WHITE, 0.0, 0.4)
                .with_name("pedestal")
                .with_map(checker),
        );
        let pedestal = scene.add(
            SceneNode::mesh(pedestal_geometry, pedestal_material)
                .with_name("pedestal")
                .with_position(Vector3::new(0.0, 0.6, 0.0)),
        );

        let sphere_geometry = scene.add_geometry(SphereGeometry::new(0.9, 48, 32).into());
        let glass = scene.add_material(
            Material::physical(PhysicalParams {
                standard: StandardParams {
                    color: Color::from_srgb_hex(0xddeeff),
                    roughness: 0.05,
                    ..Default::default()
                },
                transmission: 1.0,
                ior: 1.5,
                thickness: 0.5,
                ..Default::default()
            })
            .with_name("glass"),
        );
        let glass_sphere = scene.add(
            SceneNode::mesh(sphere_geometry, glass)
                .with_name("glass_sphere")
                .with_position(Vector3::new(0.0, SPHERE_HEIGHT, 0.0)),
        );

        let torus_geometry = scene.add_geometry(TorusGeometry::new(0.8, 0.3, 24, 96).into());
        let car_paint = scene.add_material(
            Material::physical(PhysicalParams {
                standard: StandardParams {
                    color: Color::from_srgb_hex(0xa01020),
                    metalness: 0.6,
                    roughness: 0.45,
                    ..Default::default()
                },
                clearcoat: 1.0,
                clearcoat_roughness: 0.05,
                ..Default::default()
            })
            .with_name("car_paint"),
        );
        let torus = scene.add(
            SceneNode::mesh(torus_geometry, car_paint)
                .with_name("torus")
                .with_position(Vector3::new(3.0, 1.1, 1.0))
                .with_quaternion(Quaternion::from_axis_angle(&Vector3::UNIT_X, -PI / 3.0)),
        );

        let colors = [0xff0000, 0x00ff00, 0x0000ff].map(Color::from_hex);
        let helper_geometry = scene.add_geometry(PlaneGeometry::new(3.0, 6.0).into());
        let mut rect_lights = [NodeId::default(); 3];
        for (i, color) in colors.into_iter().enumerate() {
            let x = (i as f32 - 1.0) * 4.0;
            let mut node = SceneNode::from(Light::from(RectAreaLight::new(color, 5.0, 3.0, 6.0)))
                .with_name(format!("rect_light_{i}"))
                .with_position(Vector3::new(x, 3.0, -6.0));
            node.transform.look_at(&Vector3::new(x, 3.0, 0.0), &Vector3::UP);
            let light = scene.add(node);

            let helper_material = scene.add_material(
                Material::basic(color)
                    .with_side(Side::Double)
                    .with_name(format!("rect_light_{i}_helper")),
            );
            let helper = scene.add_node(
                SceneNode::mesh(helper_geometry, helper_material).with_name(format!("rect_light_{i}_helper")),
            );
            scene.add_child(light, helper)?;
            rect_lights[i] = light;
        }

        scene.add(SceneNode::from(Light::from(AmbientLight::new(Color::WHITE, 0.15))).with_name("ambient"));
        let point_light = scene.add(
            SceneNode::from(Light::from(PointLight::new(Color::from_srgb_hex(0xffe8c0), 30.0, 20.0)))
                .with_name("point_light")
                .with_position(Vector3::new(LIGHT_ORBIT_RADIUS, LIGHT_HEIGHT, 0.0)),
        );

        log::info!("Showcase built with {} nodes", scene.node_count());

        Ok(Self {
            block_geometry,
            block_material,
            blocks,
            pedestal,
            glass_sphere,
            torus,
            rect_lights,
            point_light,
        })
    }

    /// Camera framing the demo.
    pub fn camera(aspect: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(45.0, aspect, 0.1, 200.0);
        camera.set_position(Vector3::new(0.0, 6.0, 14.0));
        camera.look_at(&Vector3::new(0.0, 1.0, 0.0));
        camera
    }

    /// Controls orbiting the pedestal, kept above the floor.
    pub fn controls() -> OrbitControls {
        let mut controls = OrbitControls::with_target(Vector3::new(0.0, 1.0, 0.0));
        controls.enable_damping = true;
        controls.min_distance = 3.0;
        controls.max_distance = 60.0;
        controls.max_polar_angle = PI * 0.48;
        controls
    }

    /// Advance the animation to `elapsed` seconds: the sphere bobs and the
    /// point light circles the pedestal.
    pub fn animate(&self, scene: &mut Scene, elapsed: f32) {
        if let Some(node) = scene.node_mut(self.glass_sphere) {
            let y = SPHERE_HEIGHT + 0.35 * (elapsed * 1.5).sin();
            node.transform.set_position(Vector3::new(0.0, y, 0.0));
        }
        if let Some(node) = scene.node_mut(self.point_light) {
            let angle = elapsed * 0.6;
            node.transform.set_position(Vector3::new(
                LIGHT_ORBIT_RADIUS * angle.cos(),
                LIGHT_HEIGHT,
                LIGHT_ORBIT_RADIUS * angle.sin(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    #[test]
    fn test_blocks_share_assets() {
        let mut scene = Scene::new();
        let demo = Showcase::build(&mut scene).unwrap();
        assert_eq!(demo.blocks.len(), GRID_SIZE * GRID_SIZE);
        assert!(demo
            .blocks
            .iter()
            .all(|&b| scene.mesh_of(b) == Some((demo.block_geometry, demo.block_material))));
    }

    #[test]
    fn test_rect_lights_have_helpers_and_face_the_stage() {
        let mut scene = Scene::new();
        let demo = Showcase::build(&mut scene).unwrap();
        scene.update_world_matrices();
        for &light in &demo.rect_lights {
            let children = scene.children(light);
            assert_eq!(children.len(), 1);
            assert!(scene.mesh_of(children[0]).is_some());
            let node = scene.node(light).unwrap();
            assert!(matches!(node.kind(), NodeKind::Light(Light::RectArea(_))));
            assert!(node.transform.forward().approx_eq(&Vector3::UNIT_Z, 1e-4));
        }
    }

    #[test]
    fn test_materials_match_roles() {
        let mut scene = Scene::new();
        let demo = Showcase::build(&mut scene).unwrap();
        let (_, glass) = scene.mesh_of(demo.glass_sphere).unwrap();
        assert!(scene.material(glass).unwrap().is_transparent());
        let (_, paint) = scene.mesh_of(demo.torus).unwrap();
        assert!(!scene.material(paint).unwrap().is_transparent());
    }

    #[test]
    fn test_animate_moves_sphere_and_light() {
        let mut scene = Scene::new();
        let demo = Showcase::build(&mut scene).unwrap();
        scene.update_world_matrices();
        let sphere0 = scene.world_position(demo.glass_sphere).unwrap();
        let light0 = scene.world_position(demo.point_light).unwrap();

        demo.animate(&mut scene, 1.0);
        scene.update_world_matrices();
        assert!(scene.world_position(demo.glass_sphere).unwrap().distance_to(&sphere0) > 0.1);
        let light1 = scene.world_position(demo.point_light).unwrap();
        assert!(light1.distance_to(&light0) > 0.1);
        assert!((Vector3::new(light1.x, 0.0, light1.z).length() - LIGHT_ORBIT_RADIUS).abs() < 1e-4);
    }
}
