//! Spherical coordinates, Y up.

use super::Vector3;
use serde::{Deserialize, Serialize};

/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f32,
    /// Polar angle in radians, 0..PI.
    pub phi: f32,
    /// Azimuthal angle in radians.
    pub theta: f32,
}

impl Default for Spherical {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

const POLE_EPSILON: f32 = 1e-6;

impl Spherical {
    /// Create from components.
    #[inline]
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Convert a cartesian offset.
    pub fn from_vector(v: &Vector3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self::new(
            radius,
            (v.y / radius).clamp(-1.0, 1.0).acos(),
            v.x.atan2(v.z),
        )
    }

    /// Back to a cartesian offset.
    pub fn to_vector(&self) -> Vector3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vector3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }

    /// Keep `phi` strictly away from the poles.
    pub fn make_safe(&mut self) -> &mut Self {
        self.phi = self.phi.clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_round_trip() {
        let v = Vector3::new(3.0, 4.0, -5.0);
        let back = Spherical::from_vector(&v).to_vector();
        assert!(back.approx_eq(&v, 1e-4));
    }

    #[test]
    fn test_axes() {
        let s = Spherical::from_vector(&Vector3::new(0.0, 0.0, 2.0));
        assert!((s.phi - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.radius - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_make_safe_leaves_pole() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);
    }
}
