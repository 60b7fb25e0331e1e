//! # Math Module
//!
//! Value types for the render pipeline: vectors, quaternions, column-major
//! matrices and the bounding volumes used for culling.
//!
//! Every type is `Copy` and converts to and from its `glam` counterpart.

mod box3;
mod color;
mod frustum;
mod matrix4;
mod plane;
mod quaternion;
mod sphere;
mod spherical;
mod vector2;
mod vector3;

pub use box3::Box3;
pub use color::Color;
pub use frustum::Frustum;
pub use matrix4::Matrix4;
pub use plane::Plane;
pub use quaternion::Quaternion;
pub use sphere::Sphere;
pub use spherical::Spherical;
pub use vector2::Vector2;
pub use vector3::Vector3;

/// Common math constants.
pub mod consts {
    /// Pi.
    pub const PI: f32 = std::f32::consts::PI;
    /// Half of Pi.
    pub const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
    /// Tolerance used by the approximate comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
