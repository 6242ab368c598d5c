use std::collections::BTreeSet;

use glgen_registry::GlFile;

/// Name-mangling settings for one family run. Owned by the run's
/// [`GeneratorConfig`] and threaded by reference through the pipeline; there
/// is no process-wide settings singleton.
#[derive(Debug, Clone, Default)]
pub struct MangleSettings {
    pub function_prefix: String,
    pub enum_prefixes: Vec<String>,
    pub extension_prefix: String,
    pub functions_without_prefix: BTreeSet<String>,
    pub enums_without_prefix: BTreeSet<String>,
}

impl MangleSettings {
    /// Strips the family function prefix, e.g. `glDrawArrays -> DrawArrays`.
    /// Allow-listed entry points (WGL reuses some plain win32 names) pass
    /// through unchanged.
    pub fn mangle_function_name(&self, entry_point: &str) -> String {
        if self.functions_without_prefix.contains(entry_point) {
            return entry_point.to_string();
        }
        entry_point
            .strip_prefix(&self.function_prefix)
            .unwrap_or(entry_point)
            .to_string()
    }

    /// Strips the first matching enum prefix (unless allow-listed), then
    /// converts SCREAMING_SNAKE to PascalCase one underscore-separated
    /// segment at a time: `GL_COLOR_BUFFER_BIT -> ColorBufferBit`,
    /// `GL_TEXTURE_2D -> Texture2d`. A name that would start with a digit
    /// gains a leading underscore guard.
    pub fn mangle_enum_name(&self, name: &str) -> String {
        let stripped = if self.enums_without_prefix.contains(name) {
            name
        } else {
            self.enum_prefixes
                .iter()
                .find_map(|prefix| name.strip_prefix(prefix.as_str()))
                .unwrap_or(name)
        };

        let mut mangled = String::with_capacity(stripped.len());
        for segment in stripped.split('_') {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                mangled.extend(first.to_uppercase());
                mangled.push_str(&chars.as_str().to_ascii_lowercase());
            }
        }

        if mangled.starts_with(|c: char| c.is_ascii_digit()) {
            mangled.insert(0, '_');
        }
        mangled
    }

    /// Escapes parameter names that collide with reserved words by
    /// appending an underscore (`type -> type_`).
    pub fn mangle_parameter_name(&self, name: &str) -> String {
        const RESERVED: &[&str] = &[
            "as", "box", "const", "crate", "enum", "fn", "impl", "in", "loop", "match", "mod",
            "move", "mut", "ref", "self", "super", "type", "unsafe", "use", "where",
        ];
        if RESERVED.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }
}

/// Everything one family run needs beyond the registry itself: the mangler
/// settings, the unresolved-reference allow-lists and the handle mapping
/// mode. Constructed once per run via the family presets.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub mangle: MangleSettings,
    /// Entry points a requirement list may reference without the registry
    /// declaring them. Anything else unresolved is a fatal error.
    pub ignore_functions: BTreeSet<String>,
    /// Enumerant references skipped before lookup. Covers the string-valued
    /// GLX extension-name pseudo-enumerant.
    pub ignore_enums: BTreeSet<String>,
    /// When set, typed object handles map to named wrapper structs instead
    /// of collapsing to a plain i32.
    pub typesafe_handles: bool,
}

impl GeneratorConfig {
    pub fn opengl() -> Self {
        GeneratorConfig {
            mangle: MangleSettings {
                function_prefix: "gl".to_string(),
                enum_prefixes: vec!["GL_".to_string()],
                extension_prefix: "GL_".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn wgl() -> Self {
        GeneratorConfig {
            mangle: MangleSettings {
                function_prefix: "wgl".to_string(),
                enum_prefixes: vec!["WGL_".to_string()],
                extension_prefix: "WGL_".to_string(),
                // Plain win32 gdi entry points required by the WGL registry.
                functions_without_prefix: [
                    "ChoosePixelFormat",
                    "DescribePixelFormat",
                    "GetPixelFormat",
                    "SetPixelFormat",
                    "SwapBuffers",
                    "GetEnhMetaFilePixelFormat",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
                enums_without_prefix: [
                    "ERROR_INVALID_VERSION_ARB",
                    "ERROR_INVALID_PROFILE_ARB",
                    "ERROR_INVALID_PIXEL_TYPE_ARB",
                    "ERROR_INCOMPATIBLE_DEVICE_CONTEXTS_ARB",
                    "ERROR_INVALID_PIXEL_TYPE_EXT",
                    "ERROR_INCOMPATIBLE_AFFINITY_MASKS_NV",
                    "ERROR_MISSING_AFFINITY_MASK_NV",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
            },
            ..Default::default()
        }
    }

    pub fn glx() -> Self {
        GeneratorConfig {
            mangle: MangleSettings {
                function_prefix: "glX".to_string(),
                enum_prefixes: vec!["GLX_".to_string(), "__GLX_".to_string()],
                extension_prefix: "GLX_".to_string(),
                ..Default::default()
            },
            // Entry points that only exist when dmedia headers are present.
            ignore_functions: [
                "glXAssociateDMPbufferSGIX",
                "glXCreateGLXVideoSourceSGIX",
                "glXDestroyGLXVideoSourceSGIX",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            // A string constant, not a real enumerant.
            ignore_enums: ["GLX_EXTENSION_NAME".to_string()].into_iter().collect(),
            ..Default::default()
        }
    }

    /// The preset matching one specification file family.
    pub fn for_file(file: GlFile) -> Self {
        match file {
            GlFile::Gl => Self::opengl(),
            GlFile::Wgl => Self::wgl(),
            GlFile::Glx => Self::glx(),
        }
    }
}
