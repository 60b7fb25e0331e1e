//! Orbit controls for rotating camera around a target.

use super::{Key, Modifiers, PointerButton};
use crate::camera::PerspectiveCamera;
use crate::math::{Spherical, Vector2, Vector3};
use std::f32::consts::PI;

/// What a pointer drag currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Orbiting around the target.
    Rotating,
    /// Moving camera and target sideways.
    Panning,
    /// Moving towards or away from the target.
    Dollying,
}

/// Orbit controls allowing camera rotation around a target point.
///
/// Input calls only accumulate deltas; [`update`](Self::update) applies them
/// to the camera once per frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Target point to orbit around.
    pub target: Vector3,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
    /// Minimum polar angle (radians, 0 = top).
    pub min_polar_angle: f32,
    /// Maximum polar angle (radians, PI = bottom).
    pub max_polar_angle: f32,
    /// Enable rotation.
    pub enable_rotate: bool,
    /// Enable panning.
    pub enable_pan: bool,
    /// Enable zooming.
    pub enable_zoom: bool,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
    /// Enable damping (smooth movement).
    pub enable_damping: bool,
    /// Share of the pending delta applied per frame, 0..1.
    pub damping_factor: f32,
    state: ControlState,
    pointer: Vector2,
    viewport_height: f32,
    spherical_delta: Spherical,
    pan_pixels: Vector2,
    pan_offset: Vector3,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vector3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            key_pan_speed: 7.0,
            enable_damping: false,
            damping_factor: 0.05,
            state: ControlState::Idle,
            pointer: Vector2::ZERO,
            viewport_height: 1.0,
            spherical_delta: Spherical::new(0.0, 0.0, 0.0),
            pan_pixels: Vector2::ZERO,
            pan_offset: Vector3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Create new orbit controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create orbit controls with a target.
    pub fn with_target(target: Vector3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Current drag state.
    #[inline]
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Viewport height in pixels; drag distances are relative to it.
    pub fn set_viewport_height(&mut self, height: f32) {
        if height > 0.0 {
            self.viewport_height = height;
        }
    }

    /// Start a drag. Disabled features leave the state `Idle`.
    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        modifiers: Modifiers,
        position: Vector2,
    ) -> ControlState {
        let wanted = match button {
            PointerButton::Left if modifiers.pans() => ControlState::Panning,
            PointerButton::Left => ControlState::Rotating,
            PointerButton::Middle => ControlState::Dollying,
            PointerButton::Right => ControlState::Panning,
        };
        let allowed = match wanted {
            ControlState::Rotating => self.enable_rotate,
            ControlState::Panning => self.enable_pan,
            ControlState::Dollying => self.enable_zoom,
            ControlState::Idle => true,
        };
        self.state = if allowed { wanted } else { ControlState::Idle };
        self.pointer = position;
        self.state
    }

    /// Apply the drag since the last pointer event.
    pub fn pointer_move(&mut self, position: Vector2) {
        let delta = position - self.pointer;
        self.pointer = position;
        match self.state {
            ControlState::Idle => {}
            ControlState::Rotating => {
                let h = self.viewport_height;
                self.rotate_left(2.0 * PI * delta.x / h * self.rotate_speed);
                self.rotate_up(2.0 * PI * delta.y / h * self.rotate_speed);
            }
            ControlState::Panning => self.pan(delta * self.pan_speed),
            ControlState::Dollying => {
                if delta.y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if delta.y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
        }
    }

    /// End the drag.
    pub fn pointer_up(&mut self) {
        self.state = ControlState::Idle;
    }

    /// Wheel scroll; positive `delta_y` moves away from the target.
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.enable_zoom || self.state != ControlState::Idle {
            return;
        }
        if delta_y < 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta_y > 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Arrow-key panning. Returns whether the key was used.
    pub fn key_down(&mut self, key: Key) -> bool {
        if !self.enable_pan {
            return false;
        }
        let step = self.key_pan_speed;
        let delta = match key {
            Key::ArrowUp => Vector2::new(0.0, step),
            Key::ArrowDown => Vector2::new(0.0, -step),
            Key::ArrowLeft => Vector2::new(step, 0.0),
            Key::ArrowRight => Vector2::new(-step, 0.0),
        };
        self.pan(delta);
        true
    }

    /// Rotate the view left by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Rotate the view up by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Queue a pan of `delta` pixels.
    pub fn pan(&mut self, delta: Vector2) {
        self.pan_pixels = self.pan_pixels + delta;
    }

    /// Move towards the target by `factor` (< 1 is closer).
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Move away from the target by `factor`.
    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Apply accumulated input to the camera. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let old_position = camera.position();
        let offset = old_position - self.target;
        let mut spherical = Spherical::from_vector(&offset);

        self.flush_pan(camera, offset.length());

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.make_safe();
        let (min_polar, max_polar) = ordered(self.min_polar_angle, self.max_polar_angle);
        spherical.phi = spherical.phi.clamp(min_polar, max_polar);

        let (min_distance, max_distance) = ordered(self.min_distance, self.max_distance);
        spherical.radius = (spherical.radius * self.scale).clamp(min_distance, max_distance);
        self.target = self.target + self.pan_offset * step;

        camera.set_position(self.target + spherical.to_vector());
        camera.look_at(&self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset = self.pan_offset * keep;
        } else {
            self.spherical_delta = Spherical::new(0.0, 0.0, 0.0);
            self.pan_offset = Vector3::ZERO;
        }
        self.scale = 1.0;

        camera.position().distance_to_squared(&old_position) > 1e-12
    }

    /// Turn pending pixel pan into a world offset in the camera plane.
    fn flush_pan(&mut self, camera: &PerspectiveCamera, distance: f32) {
        if self.pan_pixels == Vector2::ZERO {
            return;
        }
        let target_distance = distance * (camera.fov.to_radians() * 0.5).tan();
        let local = camera.transform().local_matrix();
        let right = Vector3::new(local.get(0, 0), local.get(1, 0), local.get(2, 0));
        let up = Vector3::new(local.get(0, 1), local.get(1, 1), local.get(2, 1));
        let h = self.viewport_height;
        let pan_left = 2.0 * self.pan_pixels.x * target_distance / h;
        let pan_up = 2.0 * self.pan_pixels.y * target_distance / h;
        self.pan_offset = self.pan_offset + right * -pan_left + up * pan_up;
        self.pan_pixels = Vector2::ZERO;
    }

    /// Drop pending input and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = ControlState::Idle;
        self.spherical_delta = Spherical::new(0.0, 0.0, 0.0);
        self.pan_pixels = Vector2::ZERO;
        self.pan_offset = Vector3::ZERO;
        self.scale = 1.0;
    }
}

/// Limits as `(low, high)`, whichever order they were set in.
fn ordered(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 10.0));
        camera.look_at(&Vector3::ZERO);
        camera
    }

    fn polar(camera: &PerspectiveCamera, target: &Vector3) -> f32 {
        Spherical::from_vector(&(camera.position() - *target)).phi
    }

    #[test]
    fn test_button_to_state() {
        let mut c = OrbitControls::new();
        let at = Vector2::ZERO;
        assert_eq!(c.pointer_down(PointerButton::Left, Modifiers::NONE, at), ControlState::Rotating);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        assert_eq!(c.pointer_down(PointerButton::Left, ctrl, at), ControlState::Panning);
        assert_eq!(c.pointer_down(PointerButton::Middle, Modifiers::NONE, at), ControlState::Dollying);
        assert_eq!(c.pointer_down(PointerButton::Right, Modifiers::NONE, at), ControlState::Panning);
        c.pointer_up();
        assert_eq!(c.state(), ControlState::Idle);

        c.enable_rotate = false;
        assert_eq!(c.pointer_down(PointerButton::Left, Modifiers::NONE, at), ControlState::Idle);
    }

    #[test]
    fn test_polar_angle_stays_clamped() {
        let mut c = OrbitControls::new();
        c.min_polar_angle = 0.3;
        c.max_polar_angle = 2.0;
        c.set_viewport_height(600.0);
        let mut cam = camera();

        for dir in [1.0f32, -1.0] {
            c.pointer_down(PointerButton::Left, Modifiers::NONE, Vector2::ZERO);
            for i in 1..50 {
                c.pointer_move(Vector2::new(0.0, dir * 1.0e4 * i as f32));
                c.update(&mut cam);
                let phi = polar(&cam, &c.target);
                assert!(phi >= 0.3 - 1e-4 && phi <= 2.0 + 1e-4, "phi {phi}");
            }
            c.pointer_up();
        }
    }

    #[test]
    fn test_swapped_limits_still_clamp() {
        let mut c = OrbitControls::new();
        c.min_polar_angle = 2.0;
        c.max_polar_angle = 1.0;
        c.min_distance = 10.0;
        c.max_distance = 5.0;
        let mut cam = camera();
        c.rotate_up(3.0);
        c.update(&mut cam);

        let phi = polar(&cam, &c.target);
        assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&phi));
        let distance = cam.position().distance_to(&c.target);
        assert!((5.0 - 1e-4..=10.0 + 1e-4).contains(&distance));
    }

    #[test]
    fn test_default_limits_avoid_poles() {
        let mut c = OrbitControls::new();
        let mut cam = camera();
        c.rotate_up(100.0);
        c.update(&mut cam);
        cam.update_matrices();
        assert!(cam.position().is_finite());
        assert!(cam.forward().is_finite());
        assert!(cam.position().y > 9.99);
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut c = OrbitControls::new();
        let mut cam = camera();
        c.rotate_left(0.7);
        assert!(c.update(&mut cam));
        assert!((cam.position().length() - 10.0).abs() < 1e-3);
        assert!(cam.position().x.abs() > 1.0);
    }

    #[test]
    fn test_wheel_dolly_respects_limits() {
        let mut c = OrbitControls::new();
        c.min_distance = 8.0;
        let mut cam = camera();
        for _ in 0..20 {
            c.wheel(-1.0);
        }
        c.update(&mut cam);
        assert!((cam.position().length() - 8.0).abs() < 1e-3);

        c.wheel(1.0);
        c.update(&mut cam);
        assert!(cam.position().length() > 8.0);
    }

    #[test]
    fn test_key_pan_moves_target() {
        let mut c = OrbitControls::new();
        let mut cam = camera();
        cam.update_matrices();
        assert!(c.key_down(Key::ArrowRight));
        c.update(&mut cam);
        // panning right moves camera and target towards +X
        assert!(c.target.x > 0.0);
        assert!((cam.position().x - c.target.x).abs() < 1e-4);
    }

    #[test]
    fn test_damping_decays_delta() {
        let mut c = OrbitControls::new();
        c.enable_damping = true;
        c.damping_factor = 0.5;
        let mut cam = camera();
        c.rotate_left(1.0);

        let theta = |cam: &PerspectiveCamera| Spherical::from_vector(&cam.position()).theta;
        c.update(&mut cam);
        let first = theta(&cam);
        c.update(&mut cam);
        let second = theta(&cam) - first;
        assert!((first.abs() - 0.5).abs() < 1e-3);
        assert!((second.abs() - 0.25).abs() < 1e-3);
    }
}
