use glgen_registry::{ApiFlags, EnumKind, GlFile, OutputApi, Registry};
use indexmap::IndexMap;

use crate::config::GeneratorConfig;
use crate::error::{ProcessError, ProcessResult};
use crate::output::EnumGroupMember;

/// Per-variant catalog of enum groups and enumerants, built in one pass
/// over the raw entries before any requirement list is consulted.
#[derive(Debug)]
pub struct EnumDirectory {
    /// Per variant: group name -> resolved bitmask flag, in first-seen order.
    groups: IndexMap<OutputApi, IndexMap<String, bool>>,
    /// Per variant: raw enumerant name -> emitted member.
    members: IndexMap<OutputApi, IndexMap<String, EnumGroupMember>>,
}

impl EnumDirectory {
    fn new() -> Self {
        let mut groups = IndexMap::new();
        let mut members = IndexMap::new();
        for api in OutputApi::ALL {
            groups.insert(api, IndexMap::new());
            members.insert(api, IndexMap::new());
        }
        Self { groups, members }
    }

    /// Group catalog for one variant, in declaration order.
    pub fn group_catalog(&self, api: OutputApi) -> &IndexMap<String, bool> {
        &self.groups[&api]
    }

    /// Enumerant catalog for one variant, keyed by raw name.
    pub fn members(&self, api: OutputApi) -> &IndexMap<String, EnumGroupMember> {
        &self.members[&api]
    }

    fn add_group(&mut self, api: OutputApi, name: &str, is_flag: bool) {
        // Sticky promotion: a group seen as a bitmask anywhere stays a
        // bitmask, regardless of entry order. Never regresses.
        let flag = self
            .groups
            .get_mut(&api)
            .expect("directory is initialized for every api")
            .entry(name.to_string())
            .or_insert(false);
        *flag |= is_flag;
    }
}

/// The output variants a group membership declared in `file` widens into.
fn widened_apis(file: GlFile) -> &'static [OutputApi] {
    match file {
        GlFile::Gl => &[
            OutputApi::Gl,
            OutputApi::GlCompat,
            OutputApi::Gles1,
            OutputApi::Gles2,
        ],
        GlFile::Wgl => &[OutputApi::Wgl],
        GlFile::Glx => &[OutputApi::Glx],
    }
}

/// Builds the enum directory for one registry. Fails if an enumerant
/// declares no API applicability at all.
pub fn collect(registry: &Registry, config: &GeneratorConfig) -> ProcessResult<EnumDirectory> {
    let mut directory = EnumDirectory::new();

    for entry in &registry.enums {
        let is_flag = entry.kind == EnumKind::Bitmask;

        for membership in &entry.groups {
            for api in widened_apis(membership.file) {
                directory.add_group(*api, &membership.name, is_flag);
            }
        }

        if entry.apis.is_empty() {
            return Err(ProcessError::DuplicateOrMissingApiFlag {
                name: entry.name.clone(),
            });
        }

        let member = EnumGroupMember {
            name: config.mangle.mangle_enum_name(&entry.name),
            value: entry.value,
            groups: entry.groups.iter().map(|g| g.name.clone()).collect(),
            is_flag,
        };

        for api in OutputApi::ALL {
            if entry.apis.contains(ApiFlags::for_api(api)) {
                directory
                    .members
                    .get_mut(&api)
                    .expect("directory is initialized for every api")
                    .insert(entry.name.clone(), member.clone());
            }
        }
    }

    Ok(directory)
}

#[cfg(test)]
mod tests {
    use glgen_registry::{EnumEntry, GroupMembership};

    use super::*;

    fn entry(name: &str, value: u64, group: &str, file: GlFile, kind: EnumKind) -> EnumEntry {
        EnumEntry {
            name: name.to_string(),
            value,
            groups: vec![GroupMembership {
                name: group.to_string(),
                file,
            }],
            apis: ApiFlags::GL | ApiFlags::GL_COMPAT,
            kind,
        }
    }

    fn registry(enums: Vec<EnumEntry>) -> Registry {
        Registry {
            file: GlFile::Gl,
            commands: vec![],
            enums,
            apis: vec![],
        }
    }

    #[test]
    fn bitmask_promotion_is_sticky_regardless_of_order() {
        let config = GeneratorConfig::opengl();
        let forward = registry(vec![
            entry("GL_NONE", 0, "PathFontStyle", GlFile::Gl, EnumKind::Plain),
            entry("GL_BOLD_BIT_NV", 1, "PathFontStyle", GlFile::Gl, EnumKind::Bitmask),
        ]);
        let backward = registry(vec![
            entry("GL_BOLD_BIT_NV", 1, "PathFontStyle", GlFile::Gl, EnumKind::Bitmask),
            entry("GL_NONE", 0, "PathFontStyle", GlFile::Gl, EnumKind::Plain),
        ]);

        for reg in [forward, backward] {
            let directory = collect(&reg, &config).unwrap();
            for api in [OutputApi::Gl, OutputApi::GlCompat, OutputApi::Gles1, OutputApi::Gles2] {
                assert_eq!(
                    directory.group_catalog(api).get("PathFontStyle"),
                    Some(&true),
                    "group must stay promoted for {api}"
                );
            }
        }
    }

    #[test]
    fn gl_memberships_widen_into_all_gl_family_variants() {
        let config = GeneratorConfig::opengl();
        let reg = registry(vec![entry(
            "GL_TEXTURE_2D",
            0x0DE1,
            "TextureTarget",
            GlFile::Gl,
            EnumKind::Plain,
        )]);
        let directory = collect(&reg, &config).unwrap();
        for api in [OutputApi::Gl, OutputApi::GlCompat, OutputApi::Gles1, OutputApi::Gles2] {
            assert!(directory.group_catalog(api).contains_key("TextureTarget"));
        }
        assert!(!directory.group_catalog(OutputApi::Wgl).contains_key("TextureTarget"));
    }

    #[test]
    fn windowing_memberships_stay_in_their_variant() {
        let config = GeneratorConfig::glx();
        let mut e = entry(
            "GLX_WINDOW_BIT",
            1,
            "GLXDrawableTypeMask",
            GlFile::Glx,
            EnumKind::Bitmask,
        );
        e.apis = ApiFlags::GLX;
        let mut reg = registry(vec![e]);
        reg.file = GlFile::Glx;
        let directory = collect(&reg, &config).unwrap();
        assert!(directory
            .group_catalog(OutputApi::Glx)
            .contains_key("GLXDrawableTypeMask"));
        assert!(directory.group_catalog(OutputApi::Gl).is_empty());
    }

    #[test]
    fn members_are_recorded_only_for_applicable_apis() {
        let config = GeneratorConfig::opengl();
        let mut e = entry("GL_VERTEX_ARRAY", 0x8074, "EnableCap", GlFile::Gl, EnumKind::Plain);
        e.apis = ApiFlags::GL_COMPAT | ApiFlags::GLES1;
        let directory = collect(&registry(vec![e]), &config).unwrap();
        assert!(directory.members(OutputApi::GlCompat).contains_key("GL_VERTEX_ARRAY"));
        assert!(directory.members(OutputApi::Gles1).contains_key("GL_VERTEX_ARRAY"));
        assert!(!directory.members(OutputApi::Gl).contains_key("GL_VERTEX_ARRAY"));
        let member = &directory.members(OutputApi::Gles1)["GL_VERTEX_ARRAY"];
        assert_eq!(member.name, "VertexArray");
        assert_eq!(member.groups, vec!["EnableCap".to_string()]);
    }

    #[test]
    fn entry_without_api_flags_is_rejected() {
        let config = GeneratorConfig::opengl();
        let mut e = entry("GL_BROKEN", 1, "Broken", GlFile::Gl, EnumKind::Plain);
        e.apis = ApiFlags::empty();
        let result = collect(&registry(vec![e]), &config);
        assert_eq!(
            result.unwrap_err(),
            ProcessError::DuplicateOrMissingApiFlag {
                name: "GL_BROKEN".to_string()
            }
        );
    }
}
