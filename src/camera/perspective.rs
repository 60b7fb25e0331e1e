//! Perspective camera.

use crate::core::Id;
use crate::math::{Frustum, Matrix4, Vector3};
use crate::scene::{Layers, Transform};

/// A perspective projection camera.
///
/// The camera lives outside the scene graph; its [`Transform`] is its world
/// transform. Matrices are refreshed by [`update_matrices`](Self::update_matrices),
/// which the renderer calls once per frame.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Unique ID.
    id: Id,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Up vector used by `look_at`.
    pub up: Vector3,
    /// Layers this camera renders.
    pub layers: Layers,
    transform: Transform,
    view_matrix: Matrix4,
    projection_matrix: Matrix4,
    view_projection_matrix: Matrix4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera at `(0, 0, 5)` looking down -Z.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            id: Id::new(),
            fov,
            aspect,
            near,
            far,
            up: Vector3::UP,
            layers: Layers::ALL,
            transform: Transform::from_position(Vector3::new(0.0, 0.0, 5.0)),
            view_matrix: Matrix4::IDENTITY,
            projection_matrix: Matrix4::IDENTITY,
            view_projection_matrix: Matrix4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Camera transform.
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable camera transform.
    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Camera position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.transform.position()
    }

    /// Set the camera position.
    pub fn set_position(&mut self, position: Vector3) {
        self.transform.set_position(position);
    }

    /// Turn the camera so it faces `target`.
    pub fn look_at(&mut self, target: &Vector3) {
        let up = self.up;
        self.transform.look_at(target, &up);
    }

    /// Set the aspect ratio. Non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Set the field of view in degrees.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Set near and far planes.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Refresh world, view, projection and view-projection matrices.
    pub fn update_matrices(&mut self) {
        self.transform.update_world_matrix(None);
        self.view_matrix = self.transform.world_matrix().inverse();
        self.projection_matrix =
            Matrix4::perspective(self.fov.to_radians(), self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix.multiply(&self.view_matrix);
    }

    /// World matrix as of the last update.
    #[inline]
    pub fn world_matrix(&self) -> &Matrix4 {
        self.transform.world_matrix()
    }

    /// View matrix.
    #[inline]
    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view_matrix
    }

    /// Projection matrix.
    #[inline]
    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix.
    #[inline]
    pub fn view_projection_matrix(&self) -> &Matrix4 {
        &self.view_projection_matrix
    }

    /// Frustum of the current view-projection.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&self.view_projection_matrix)
    }

    /// World position as of the last update.
    #[inline]
    pub fn world_position(&self) -> Vector3 {
        self.transform.world_position()
    }

    /// Viewing direction in world space.
    pub fn forward(&self) -> Vector3 {
        self.transform.forward()
    }

    /// Right direction in world space.
    pub fn right(&self) -> Vector3 {
        self.transform.world_matrix().transform_direction(&Vector3::UNIT_X)
    }

    /// Project a world point to normalized device coordinates.
    pub fn project(&self, point: &Vector3) -> Vector3 {
        self.view_projection_matrix.transform_point(point)
    }
}
