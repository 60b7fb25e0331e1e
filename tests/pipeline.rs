//! Scene to render list to backend, end to end, without a GPU.

use vitrine::camera::PerspectiveCamera;
use vitrine::geometry::{BoxGeometry, Geometry, SphereGeometry};
use vitrine::material::Material;
use vitrine::math::{Color, Quaternion, Vector3};
use vitrine::renderer::{Command, RecordingBackend, RenderError, RenderList, RenderListOptions, Renderer};
use vitrine::scene::{Scene, SceneNode};
use vitrine::showcase::{Showcase, GRID_SIZE};
use std::f32::consts::FRAC_PI_2;

fn camera_at_origin() -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
    camera.set_position(Vector3::ZERO);
    camera.look_at(&Vector3::new(0.0, 0.0, -1.0));
    camera
}

fn translation_z(command: &Command) -> Option<f32> {
    match command {
        Command::Draw { model, .. } => Some(model[3][2]),
        _ => None,
    }
}

/// Two opaque materials and five glass balls at distances 1, 5, 3, 2, 4.
fn mixed_scene() -> Scene {
    let mut scene = Scene::new();
    let cube = scene.add_geometry(BoxGeometry::new(0.2, 0.2, 0.2).into());
    let ball: Geometry = SphereGeometry::new(0.1, 8, 6).into();
    let ball = scene.add_geometry(ball);

    let red = scene.add_material(Material::standard(Color::new(1.0, 0.0, 0.0), 0.0, 0.5));
    let blue = scene.add_material(Material::basic(Color::new(0.0, 0.0, 1.0)));
    let glass = scene.add_material(Material::basic(Color::WHITE).with_opacity(0.4));

    for (i, material) in [red, blue, red, blue].into_iter().enumerate() {
        scene.add(SceneNode::mesh(cube, material).with_position(Vector3::new(
            i as f32 * 0.5 - 0.75,
            -0.5,
            -6.0,
        )));
    }
    for distance in [1.0, 5.0, 3.0, 2.0, 4.0] {
        scene.add(SceneNode::mesh(ball, glass).with_position(Vector3::new(0.0, 0.0, -distance)));
    }
    scene
}

#[test]
fn transparent_draws_come_last_back_to_front() {
    let mut scene = mixed_scene();
    let mut camera = camera_at_origin();
    let mut renderer = Renderer::new(RecordingBackend::new());

    let info = renderer.render(&mut scene, &mut camera).unwrap();
    assert_eq!(info.draw_calls, 9);
    assert_eq!(info.culled, 0);

    let depths: Vec<f32> = renderer.backend().draws().filter_map(translation_z).collect();
    let transparent: Vec<f32> = depths[4..].iter().map(|z| -z).collect();
    assert_eq!(transparent, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    assert!(depths[..4].iter().all(|&z| (z + 6.0).abs() < 1e-5));
}

#[test]
fn opaque_items_are_grouped_by_material() {
    let mut scene = mixed_scene();
    let mut camera = camera_at_origin();
    scene.update_world_matrices();
    camera.update_matrices();

    let list = RenderList::build(&scene, &camera, &RenderListOptions::default());
    assert_eq!(list.opaque().len(), 4);
    let materials: Vec<_> = list.opaque().iter().map(|item| item.material).collect();
    let changes = materials.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(changes, 1);

    let distances: Vec<f32> = list.transparent().iter().map(|item| item.distance).collect();
    assert!(distances.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn rotating_parent_moves_child() {
    let mut scene = Scene::new();
    let parent = scene.add(SceneNode::group());
    let child = scene.add_node(SceneNode::group().with_position(Vector3::new(10.0, 0.0, 0.0)));
    scene.add_child(parent, child).unwrap();

    scene
        .node_mut(parent)
        .unwrap()
        .transform
        .set_quaternion(Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2));
    scene.update_world_matrices();

    let position = scene.world_position(child).unwrap();
    assert!(position.approx_eq(&Vector3::new(0.0, 0.0, -10.0), 1e-4));
}

#[test]
fn showcase_renders_every_mesh_once() {
    let mut scene = Scene::new();
    let demo = Showcase::build(&mut scene).unwrap();
    let mut camera = Showcase::camera(16.0 / 9.0);
    let mut renderer = Renderer::new(RecordingBackend::new());

    let info = renderer.render(&mut scene, &mut camera).unwrap();
    let meshes = GRID_SIZE * GRID_SIZE + 6;
    assert_eq!((info.draw_calls + info.culled) as usize, meshes);
    assert_eq!(info.skipped, 0);
    assert_eq!(info.programs_compiled, 5);

    let backend = renderer.backend();
    assert_eq!(backend.count(|c| matches!(c, Command::UploadTexture(_))), 1);
    assert_eq!(backend.last_frame_uniforms().unwrap().lights.num_lights, 4);

    let first = renderer.info().clone();
    demo.animate(&mut scene, 2.0);
    let second = renderer.render(&mut scene, &mut camera).unwrap();
    assert_eq!(second.frame, first.frame + 1);
    assert_eq!(second.programs_compiled, 0);
    assert_eq!(
        renderer.backend().count(|c| matches!(c, Command::UploadGeometry(_))),
        0
    );
}

#[test]
fn render_loop_survives_failed_frame() {
    let mut scene = Scene::new();
    Showcase::build(&mut scene).unwrap();
    let mut camera = Showcase::camera(1.0);
    let mut renderer = Renderer::new(RecordingBackend::new());

    renderer.render(&mut scene, &mut camera).unwrap();
    renderer.backend_mut().fail_next_frame(RenderError::OutOfMemory);
    assert!(renderer.render(&mut scene, &mut camera).is_err());

    let info = renderer.render(&mut scene, &mut camera).unwrap();
    assert!(info.draw_calls > 0);
    assert_eq!(renderer.backend().frames(), 2);
}
