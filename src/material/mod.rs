//! # Material Module
//!
//! Materials are a closed set of shading models. Each one maps to a
//! [`ProgramKey`], the shader variant the renderer compiles for it; only
//! edits that change the key force a recompile.

mod kind;
mod material;
mod program;

pub use kind::{MaterialKind, MaterialUniform, PhysicalParams, StandardParams};
pub use material::{Material, Side};
pub use program::{Blending, ProgramKey, ShadingModel};
