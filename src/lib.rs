//! # Vitrine - a small wgpu scene renderer
//!
//! Vitrine draws a retained scene graph through an API-agnostic backend
//! trait, with a wgpu implementation for windows and canvases.
//!
//! ## Features
//!
//! - **Math**: vectors, matrices, quaternions, spherical coordinates, frustum
//! - **Scene**: arena-backed node hierarchy with cached world matrices
//! - **Materials**: basic, standard and physical shading models
//! - **Renderer**: sorted render lists, state caching, per-frame errors
//! - **Controls**: orbit controls over crate-owned input events
//!
//! ## Example
//!
//! ```ignore
//! use vitrine::prelude::*;
//!
//! let mut engine = EngineBuilder::new().build(window, 1280, 720).await?;
//! let mut scene = Scene::new();
//! let mut camera = PerspectiveCamera::new(45.0, engine.aspect_ratio(), 0.1, 100.0);
//!
//! let geometry = scene.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0).into());
//! let material = scene.add_material(Material::standard(Color::WHITE, 0.0, 0.5));
//! scene.add(SceneNode::mesh(geometry, material));
//!
//! engine.render(&mut scene, &mut camera)?;
//! ```

#![warn(missing_docs)]

#[cfg(feature = "web")]
use wasm_bindgen::prelude::*;

pub mod math;
pub mod core;
pub mod scene;
pub mod geometry;
pub mod texture;
pub mod material;
pub mod camera;
pub mod light;
pub mod renderer;
pub mod controls;
pub mod showcase;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::math::*;
    pub use crate::core::*;
    pub use crate::scene::*;
    pub use crate::geometry::*;
    pub use crate::texture::*;
    pub use crate::material::*;
    pub use crate::camera::*;
    pub use crate::light::*;
    pub use crate::renderer::*;
    pub use crate::controls::*;
}

/// Initialize for WASM environments.
/// Sets up panic hooks for better error messages in the browser console.
#[cfg(feature = "web")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name.
pub const NAME: &str = "Vitrine";
