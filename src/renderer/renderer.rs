//! The per-frame draw loop.

use super::{
    DrawRange, DrawUniforms, FrameUniforms, RenderBackend, RenderError, RenderList,
    RenderListOptions, StateCache,
};
use crate::camera::PerspectiveCamera;
use crate::light::{Light, LightsUniform};
use crate::material::ProgramKey;
use crate::math::{Color, Matrix4};
use crate::scene::{Background, NodeKind, Scene};

/// Render statistics for the last frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderInfo {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Number of triangles rendered.
    pub triangles: u32,
    /// Program binds issued.
    pub program_binds: u32,
    /// Geometry binds issued.
    pub geometry_binds: u32,
    /// Programs compiled this frame.
    pub programs_compiled: u32,
    /// Items rejected by the frustum test.
    pub culled: u32,
    /// Items with nothing to draw.
    pub skipped: u32,
    /// Frame number.
    pub frame: u64,
}

impl RenderInfo {
    /// Reset the per-frame counters.
    pub fn reset(&mut self) {
        let frame = self.frame;
        *self = Self {
            frame,
            ..Default::default()
        };
    }
}

/// Walks a scene and issues backend commands for it.
///
/// All caches live here; two renderers never share state.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    cache: StateCache,
    options: RenderListOptions,
    clear_color: Color,
    info: RenderInfo,
}

impl<B: RenderBackend> Renderer<B> {
    /// Create a renderer over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: StateCache::new(),
            options: RenderListOptions::default(),
            clear_color: Color::new(0.1, 0.1, 0.1),
            info: RenderInfo::default(),
        }
    }

    /// The backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Resource cache.
    #[inline]
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Statistics of the last frame.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// Render-list options.
    #[inline]
    pub fn options_mut(&mut self) -> &mut RenderListOptions {
        &mut self.options
    }

    /// Toggle frustum culling.
    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.options.frustum_culling = enabled;
    }

    /// Clear color used when the scene has no background.
    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Get the clear color.
    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Resize the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
    }

    /// Render one frame.
    ///
    /// Updates world and camera matrices, compiles pending material
    /// variants, builds the render list and draws it. Errors abort this frame
    /// only; the next call starts clean.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<RenderInfo, RenderError> {
        self.info.reset();
        self.info.frame += 1;
        self.cache.reset_bindings();

        scene.update_world_matrices();
        camera.update_matrices();
        self.compile_pending(scene)?;

        let list = RenderList::build(scene, camera, &self.options);
        self.info.culled = list.culled();
        self.info.skipped = list.skipped();

        let clear = match scene.background() {
            Background::Color(c) => c,
            Background::None => self.clear_color,
        };
        self.backend.begin_frame(clear)?;
        self.backend.set_frame_uniforms(&frame_uniforms(scene, camera));

        for item in list.items() {
            let Some(geometry) = scene.geometry(item.geometry) else {
                self.info.skipped += 1;
                continue;
            };
            let Some(material) = scene.material(item.material) else {
                self.info.skipped += 1;
                continue;
            };

            let program = self.ensure_program(&item.program)?;
            if !self.cache.has_geometry(item.geometry) {
                log::debug!("Uploading geometry {:?}", item.geometry);
                self.backend.upload_geometry(item.geometry, geometry)?;
                self.cache.insert_geometry(item.geometry);
            }
            let texture = match material.kind().map() {
                Some(id) => match scene.texture(id) {
                    Some(texture) => {
                        if !self.cache.has_texture(id) {
                            log::debug!("Uploading texture {:?}", id);
                            self.backend.upload_texture(id, texture)?;
                            self.cache.insert_texture(id);
                        }
                        Some(id)
                    }
                    None => {
                        if self.cache.note_missing_texture(id) {
                            log::warn!("Texture {:?} is missing, drawing flat color", id);
                        }
                        None
                    }
                },
                None => None,
            };

            if self.cache.bind_program(item.program) {
                self.backend.bind_program(program);
                self.info.program_binds += 1;
            }
            if self.cache.bind_geometry(item.geometry) {
                self.backend.bind_geometry(item.geometry);
                self.info.geometry_binds += 1;
            }
            if self.cache.bind_texture(texture) {
                self.backend.bind_texture(texture);
            }

            let uniforms = DrawUniforms {
                model: item.world_matrix.to_cols_array_2d(),
                normal_matrix: item.world_matrix.normal_matrix().to_cols_array_2d(),
                material: material.kind().to_uniform(material.opacity()),
            };
            let range = DrawRange {
                count: geometry.draw_count() as u32,
                indexed: geometry.indices().is_some(),
            };
            self.backend.draw(&uniforms, range);
            self.info.draw_calls += 1;
            self.info.triangles += geometry.triangle_count() as u32;
        }

        self.backend.end_frame()?;
        Ok(self.info.clone())
    }

    /// Compile the variants of materials flagged for recompilation.
    fn compile_pending(&mut self, scene: &mut Scene) -> Result<(), RenderError> {
        for (_, material) in scene.materials_mut() {
            if !material.needs_recompile() {
                continue;
            }
            self.ensure_program(&material.program_key())?;
            material.mark_compiled();
        }
        Ok(())
    }

    fn ensure_program(&mut self, key: &ProgramKey) -> Result<super::ProgramHandle, RenderError> {
        if let Some(handle) = self.cache.program(key) {
            return Ok(handle);
        }
        log::debug!("Compiling program {}", key.label());
        let handle = self.backend.compile_program(key)?;
        self.cache.insert_program(*key, handle);
        self.info.programs_compiled += 1;
        Ok(handle)
    }
}

/// Camera and light uniforms for the frame.
fn frame_uniforms(scene: &Scene, camera: &PerspectiveCamera) -> FrameUniforms {
    let mut lights: Vec<(Light, Matrix4)> = Vec::new();
    scene.traverse_visible(|_, node| {
        if let NodeKind::Light(light) = node.kind() {
            lights.push((light.clone(), *node.transform.world_matrix()));
        }
    });
    let eye = camera.world_position();
    FrameUniforms {
        view: camera.view_matrix().to_cols_array_2d(),
        projection: camera.projection_matrix().to_cols_array_2d(),
        camera_position: [eye.x, eye.y, eye.z, 1.0],
        lights: LightsUniform::gather(lights.iter().map(|(l, m)| (l, m))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxGeometry;
    use crate::light::{AmbientLight, PointLight};
    use crate::material::Material;
    use crate::math::Vector3;
    use crate::renderer::{Command, RecordingBackend};
    use crate::scene::SceneNode;
    use crate::texture::Texture;

    fn setup() -> (Scene, PerspectiveCamera) {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 10.0));
        camera.look_at(&Vector3::ZERO);
        (Scene::new(), camera)
    }

    #[test]
    fn test_shared_state_binds_once() {
        let (mut scene, mut camera) = setup();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let mat = scene.add_material(Material::standard(Color::WHITE, 0.0, 0.5));
        for i in 0..5 {
            scene.add(SceneNode::mesh(geo, mat).with_position(Vector3::new(i as f32 - 2.0, 0.0, 0.0)));
        }

        let mut renderer = Renderer::new(RecordingBackend::new());
        let info = renderer.render(&mut scene, &mut camera).unwrap();
        assert_eq!(info.draw_calls, 5);
        assert_eq!(info.program_binds, 1);
        assert_eq!(info.geometry_binds, 1);
        assert_eq!(info.triangles, 5 * 12);
        assert_eq!(renderer.backend().count(|c| matches!(c, Command::UploadGeometry(_))), 1);
    }

    #[test]
    fn test_recompile_only_on_key_change() {
        let (mut scene, mut camera) = setup();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let mat = scene.add_material(Material::standard(Color::WHITE, 0.0, 0.5));
        scene.add(SceneNode::mesh(geo, mat));

        let mut renderer = Renderer::new(RecordingBackend::new());
        assert_eq!(renderer.render(&mut scene, &mut camera).unwrap().programs_compiled, 1);
        assert!(!scene.material(mat).unwrap().needs_recompile());

        scene.material_mut(mat).unwrap().set_color(Color::new(1.0, 0.0, 0.0));
        assert_eq!(renderer.render(&mut scene, &mut camera).unwrap().programs_compiled, 0);

        scene.material_mut(mat).unwrap().set_opacity(0.5);
        assert_eq!(renderer.render(&mut scene, &mut camera).unwrap().programs_compiled, 1);
        assert_eq!(renderer.cache().program_count(), 2);
    }

    #[test]
    fn test_missing_texture_falls_back() {
        let (mut scene, mut camera) = setup();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let tex = scene.add_texture(Texture::solid([255, 0, 0, 255]));
        let mat = scene.add_material(Material::basic(Color::WHITE).with_map(tex));
        scene.add(SceneNode::mesh(geo, mat));
        scene.remove_texture(tex);

        let mut renderer = Renderer::new(RecordingBackend::new());
        let info = renderer.render(&mut scene, &mut camera).unwrap();
        assert_eq!(info.draw_calls, 1);
        assert!(renderer.backend().commands().contains(&Command::BindTexture(None)));
    }

    #[test]
    fn test_frame_uniforms_collect_lights() {
        let (mut scene, mut camera) = setup();
        scene.add(SceneNode::from(Light::from(AmbientLight::new(Color::WHITE, 0.5))));
        scene.add(
            SceneNode::from(Light::from(PointLight::default()))
                .with_position(Vector3::new(0.0, 4.0, 0.0)),
        );

        let mut renderer = Renderer::new(RecordingBackend::new());
        renderer.render(&mut scene, &mut camera).unwrap();
        let frame = renderer.backend().last_frame_uniforms().unwrap();
        assert_eq!(frame.lights.num_lights, 1);
        assert_eq!(frame.lights.lights[0].position, [0.0, 4.0, 0.0]);
        assert!((frame.lights.ambient[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_backend_error_aborts_frame_only() {
        let (mut scene, mut camera) = setup();
        let geo = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
        let mat = scene.add_material(Material::basic(Color::WHITE));
        scene.add(SceneNode::mesh(geo, mat));

        let mut renderer = Renderer::new(RecordingBackend::new());
        renderer.backend_mut().fail_next_frame(RenderError::SurfaceLost);
        let err = renderer.render(&mut scene, &mut camera).unwrap_err();
        assert!(err.needs_reconfigure());

        let info = renderer.render(&mut scene, &mut camera).unwrap();
        assert_eq!(info.frame, 2);
        assert_eq!(info.draw_calls, 1);
    }
}
