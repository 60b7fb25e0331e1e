//! Renderer-side record of uploaded resources and bound state.

use super::ProgramHandle;
use crate::material::ProgramKey;
use crate::scene::{GeometryId, TextureId};
use std::collections::{HashMap, HashSet};

/// What the backend already holds and what is currently bound.
///
/// Bindings are reset at the start of every frame; uploads and compiled
/// programs persist for the renderer's lifetime.
#[derive(Debug, Default)]
pub struct StateCache {
    geometries: HashSet<GeometryId>,
    textures: HashSet<TextureId>,
    programs: HashMap<ProgramKey, ProgramHandle>,
    bound_program: Option<ProgramKey>,
    bound_geometry: Option<GeometryId>,
    bound_texture: Option<Option<TextureId>>,
    missing_textures: HashSet<TextureId>,
}

impl StateCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget bound state.
    pub fn reset_bindings(&mut self) {
        self.bound_program = None;
        self.bound_geometry = None;
        self.bound_texture = None;
    }

    /// Whether the geometry has buffers on the backend.
    #[inline]
    pub fn has_geometry(&self, id: GeometryId) -> bool {
        self.geometries.contains(&id)
    }

    /// Record an uploaded geometry.
    pub fn insert_geometry(&mut self, id: GeometryId) {
        self.geometries.insert(id);
    }

    /// Whether the texture exists on the backend.
    #[inline]
    pub fn has_texture(&self, id: TextureId) -> bool {
        self.textures.contains(&id)
    }

    /// Record an uploaded texture.
    pub fn insert_texture(&mut self, id: TextureId) {
        self.textures.insert(id);
    }

    /// Remember a texture found missing. Returns `true` the first time.
    pub fn note_missing_texture(&mut self, id: TextureId) -> bool {
        self.missing_textures.insert(id)
    }

    /// Compiled program for a key.
    #[inline]
    pub fn program(&self, key: &ProgramKey) -> Option<ProgramHandle> {
        self.programs.get(key).copied()
    }

    /// Record a compiled program.
    pub fn insert_program(&mut self, key: ProgramKey, handle: ProgramHandle) {
        self.programs.insert(key, handle);
    }

    /// Number of compiled programs.
    #[inline]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of uploaded geometries.
    #[inline]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Mark `key` bound. Returns `false` when it already was.
    pub fn bind_program(&mut self, key: ProgramKey) -> bool {
        if self.bound_program == Some(key) {
            return false;
        }
        self.bound_program = Some(key);
        true
    }

    /// Mark `id` bound. Returns `false` when it already was.
    pub fn bind_geometry(&mut self, id: GeometryId) -> bool {
        if self.bound_geometry == Some(id) {
            return false;
        }
        self.bound_geometry = Some(id);
        true
    }

    /// Mark a color map (or the fallback) bound. Returns `false` when it
    /// already was.
    pub fn bind_texture(&mut self, id: Option<TextureId>) -> bool {
        if self.bound_texture == Some(id) {
            return false;
        }
        self.bound_texture = Some(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_bind_reports_changes_only() {
        let mut ids: SlotMap<GeometryId, ()> = SlotMap::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let mut cache = StateCache::new();
        assert!(cache.bind_geometry(a));
        assert!(!cache.bind_geometry(a));
        assert!(cache.bind_geometry(b));
        cache.reset_bindings();
        assert!(cache.bind_geometry(b));
    }

    #[test]
    fn test_fallback_texture_is_a_binding() {
        let mut cache = StateCache::new();
        assert!(cache.bind_texture(None));
        assert!(!cache.bind_texture(None));
    }
}
