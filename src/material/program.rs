//! Shader-variant keys.

/// Lighting model a program implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShadingModel {
    /// Color only, no lighting.
    Unlit,
    /// Metal/roughness PBR.
    Standard,
    /// Standard plus clearcoat and transmission terms.
    Physical,
}

/// Color blending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Blending {
    /// Overwrite.
    Opaque,
    /// Premultiplied-free `src_alpha, 1 - src_alpha` blending.
    Alpha,
}

/// Everything that selects a distinct compiled program and pipeline.
///
/// Ordering groups opaque draws so equal keys end up adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey {
    /// Lighting model.
    pub shading: ShadingModel,
    /// Samples a color map.
    pub color_map: bool,
    /// Multiplies in vertex colors.
    pub vertex_colors: bool,
    /// Blend state.
    pub blending: Blending,
    /// Back faces drawn.
    pub double_sided: bool,
    /// Depth writes enabled.
    pub depth_write: bool,
}

impl ProgramKey {
    /// WGSL constant block prepended to the shared shader source.
    pub fn shader_defines(&self) -> String {
        let shading = match self.shading {
            ShadingModel::Unlit => 0u32,
            ShadingModel::Standard => 1,
            ShadingModel::Physical => 2,
        };
        format!(
            "const SHADING_MODEL: u32 = {shading}u;\n\
             const USE_COLOR_MAP: bool = {};\n\
             const USE_VERTEX_COLORS: bool = {};\n",
            self.color_map, self.vertex_colors,
        )
    }

    /// Short label for debug output and GPU object names.
    pub fn label(&self) -> String {
        format!(
            "{:?}{}{}{}{}{}",
            self.shading,
            if self.color_map { "+map" } else { "" },
            if self.vertex_colors { "+vcol" } else { "" },
            if self.blending == Blending::Alpha { "+blend" } else { "" },
            if self.double_sided { "+double" } else { "" },
            if self.depth_write { "" } else { "+nodepth" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defines_and_label() {
        let key = ProgramKey {
            shading: ShadingModel::Physical,
            color_map: true,
            vertex_colors: false,
            blending: Blending::Alpha,
            double_sided: false,
            depth_write: false,
        };
        let defines = key.shader_defines();
        assert!(defines.contains("SHADING_MODEL: u32 = 2u"));
        assert!(defines.contains("USE_COLOR_MAP: bool = true"));
        assert_eq!(key.label(), "Physical+map+blend+nodepth");
    }

    #[test]
    fn test_label_tells_depth_write_apart() {
        let key = ProgramKey {
            shading: ShadingModel::Standard,
            color_map: false,
            vertex_colors: false,
            blending: Blending::Opaque,
            double_sided: false,
            depth_write: true,
        };
        let no_depth = ProgramKey { depth_write: false, ..key };
        assert_eq!(key.label(), "Standard");
        assert_ne!(key.label(), no_depth.label());
    }
}
