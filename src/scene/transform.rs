//! Local transform of a scene node.

use crate::math::{Matrix4, Quaternion, Vector3};

/// Position, orientation and scale, plus cached local and world matrices.
///
/// Every setter marks the local matrix dirty; it is recomposed on the next
/// world-matrix pass.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3,
    quaternion: Quaternion,
    scale: Vector3,
    local_matrix: Matrix4,
    world_matrix: Matrix4,
    local_dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self {
            position: Vector3::ZERO,
            quaternion: Quaternion::IDENTITY,
            scale: Vector3::ONE,
            local_matrix: Matrix4::IDENTITY,
            world_matrix: Matrix4::IDENTITY,
            local_dirty: false,
        }
    }

    /// Transform translated to `position`.
    pub fn from_position(position: Vector3) -> Self {
        let mut t = Self::new();
        t.set_position(position);
        t
    }

    /// Local position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Local orientation.
    #[inline]
    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    /// Local scale.
    #[inline]
    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// Set the local position.
    #[inline]
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.local_dirty = true;
    }

    /// Set the local orientation.
    #[inline]
    pub fn set_quaternion(&mut self, quaternion: Quaternion) {
        self.quaternion = quaternion;
        self.local_dirty = true;
    }

    /// Set the local scale.
    #[inline]
    pub fn set_scale(&mut self, scale: Vector3) {
        self.scale = scale;
        self.local_dirty = true;
    }

    /// Uniform scale.
    #[inline]
    pub fn set_scale_uniform(&mut self, s: f32) {
        self.set_scale(Vector3::splat(s));
    }

    /// Replace the orientation with a rotation about `axis`.
    pub fn set_rotation_from_axis_angle(&mut self, axis: &Vector3, angle: f32) {
        self.set_quaternion(Quaternion::from_axis_angle(axis, angle));
    }

    /// Rotate about a local axis.
    pub fn rotate_on_axis(&mut self, axis: &Vector3, angle: f32) {
        let q = Quaternion::from_axis_angle(axis, angle);
        self.set_quaternion(self.quaternion.multiply(&q).normalized());
    }

    /// Move by `offset` in parent space.
    pub fn translate(&mut self, offset: &Vector3) {
        self.set_position(self.position + *offset);
    }

    /// Orient local -Z towards `target`, both in parent space.
    pub fn look_at(&mut self, target: &Vector3, up: &Vector3) {
        let rotation = Matrix4::look_rotation(&self.position, target, up);
        self.set_quaternion(Quaternion::from_rotation_matrix(&rotation));
    }

    /// Whether a setter ran since the local matrix was last composed.
    #[inline]
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    /// Local matrix, composed on demand when dirty.
    pub fn local_matrix(&self) -> Matrix4 {
        if self.local_dirty {
            Matrix4::compose(&self.position, &self.quaternion, &self.scale)
        } else {
            self.local_matrix
        }
    }

    /// World matrix as of the last pass.
    #[inline]
    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    /// Recompose the cached local matrix if dirty. Returns whether it did.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.local_dirty {
            return false;
        }
        self.local_matrix = Matrix4::compose(&self.position, &self.quaternion, &self.scale);
        self.local_dirty = false;
        true
    }

    /// `world = parent * local`, or `local` for a root.
    pub fn update_world_matrix(&mut self, parent_world: Option<&Matrix4>) {
        self.update_local_matrix();
        self.world_matrix = match parent_world {
            Some(parent) => parent.multiply(&self.local_matrix),
            None => self.local_matrix,
        };
    }

    /// Translation of the world matrix.
    #[inline]
    pub fn world_position(&self) -> Vector3 {
        self.world_matrix.get_position()
    }

    /// Local -Z in world space.
    pub fn forward(&self) -> Vector3 {
        self.world_matrix.transform_direction(&Vector3::FORWARD)
    }
}
