//! Texture module: in-memory RGBA8 images.
//!
//! Decoding from file formats is left to the caller; the renderer only sees
//! pixels.

mod texture2d;

pub use texture2d::{Texture, TextureError};
