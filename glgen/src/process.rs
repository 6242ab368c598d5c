//! The batch pipeline for one specification family: resolve every command,
//! generate overloads, decide per-variant visibility from the requirement
//! lists and assemble the deterministic output namespaces and pointer
//! tables. Three families (GL, WGL, GLX) are three independent runs of
//! [`process_registry`] sharing no mutable state.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use glgen_registry::docs::Documentation;
use glgen_registry::{
    ApiRequires, Command, FunctionReference, GlFile, GlProfile, InputApi, OutputApi, Registry,
};
use indexmap::IndexMap;
use tracing::warn;

use crate::config::GeneratorConfig;
use crate::docs::{documentation_for_native, resolved_documentation};
use crate::enums::{self, EnumDirectory};
use crate::error::{ProcessError, ProcessResult};
use crate::multimap::MultiMap;
use crate::output::{
    EnumGroup, EnumGroupMember, FunctionDocumentation, Namespace, NativeFunction, OutputData,
    OverloadedFunction, Parameter, Pointers, VendorFunctions,
};
use crate::overload::{default_rules, generate_overloads};
use crate::target::target_type;

/// Runs the whole pipeline for one registry. Fatal conditions abort the run
/// with no partial output; warnings are resolved locally.
pub fn process_registry(
    registry: &Registry,
    docs: &Documentation,
    config: &GeneratorConfig,
) -> ProcessResult<OutputData> {
    let rules = default_rules();

    let mut all_functions: IndexMap<String, Rc<OverloadedFunction>> =
        IndexMap::with_capacity(registry.commands.len());
    for command in &registry.commands {
        let native = Rc::new(make_native_function(command, config)?);
        let documentation = documentation_for_native(&native, docs);
        let overloaded = generate_overloads(&native, documentation, &rules);
        all_functions.insert(native.entry_point.clone(), Rc::new(overloaded));
    }

    let directory = enums::collect(registry, config)?;

    let mut namespaces = Vec::new();
    for requires in &registry.apis {
        let api = output_api_for(requires.api);
        namespaces.push(assemble_namespace(
            api,
            requires,
            &all_functions,
            &directory,
            config,
        )?);

        // A GL core namespace is always paired with a compatibility-profile
        // namespace resolved from the same requirement lists.
        if api == OutputApi::Gl {
            namespaces.push(assemble_namespace(
                OutputApi::GlCompat,
                requires,
                &all_functions,
                &directory,
                config,
            )?);
        }
    }

    let pointers = vec![pointer_table(registry.file, &namespaces)];
    Ok(OutputData {
        pointers,
        namespaces,
    })
}

fn output_api_for(api: InputApi) -> OutputApi {
    match api {
        InputApi::Gl => OutputApi::Gl,
        InputApi::Gles1 => OutputApi::Gles1,
        InputApi::Gles2 => OutputApi::Gles2,
        InputApi::Wgl => OutputApi::Wgl,
        InputApi::Glx => OutputApi::Glx,
    }
}

/// Only the core-profile variants drop entries that were removed or are
/// compatibility-only.
fn removes_unavailable_entries(api: OutputApi) -> bool {
    matches!(api, OutputApi::Gl | OutputApi::Gles2)
}

/// Resolves one command into the shared native function record: mapped
/// return and parameter types, mangled names and the deduplicated list of
/// enum groups its signature references.
pub fn make_native_function(
    command: &Command,
    config: &GeneratorConfig,
) -> ProcessResult<NativeFunction> {
    let function_name = config.mangle.mangle_function_name(&command.entry_point);

    let mut referenced_enum_groups: Vec<String> = Vec::new();
    let mut reference_group = |groups: &mut Vec<String>, name: &str| {
        if !groups.iter().any(|existing| existing == name) {
            groups.push(name.to_string());
        }
    };

    let mut parameters = Vec::with_capacity(command.parameters.len());
    for parameter in &command.parameters {
        let ty = target_type(&parameter.ty, config)?;
        if let Some(group) = &parameter.ty.group {
            reference_group(&mut referenced_enum_groups, &group.name);
        }
        parameters.push(Parameter {
            ty,
            name: config.mangle.mangle_parameter_name(&parameter.name),
            flow: parameter.flow,
            kinds: parameter.kinds.clone(),
            length: parameter.length.clone(),
        });
    }

    let return_type = target_type(&command.return_type, config)?;
    if let Some(group) = &command.return_type.group {
        reference_group(&mut referenced_enum_groups, &group.name);
    }

    Ok(NativeFunction {
        entry_point: command.entry_point.clone(),
        function_name,
        parameters,
        return_type,
        referenced_enum_groups,
    })
}

fn assemble_namespace(
    api: OutputApi,
    requires: &ApiRequires,
    all_functions: &IndexMap<String, Rc<OverloadedFunction>>,
    directory: &EnumDirectory,
    config: &GeneratorConfig,
) -> ProcessResult<Namespace> {
    let removes = removes_unavailable_entries(api);

    // Visibility pass over the function references.
    let mut functions_by_vendor: MultiMap<String, Rc<OverloadedFunction>> = MultiMap::new();
    let mut groups_referenced: BTreeSet<String> = BTreeSet::new();

    for reference in &requires.functions {
        let Some(function) = all_functions.get(&reference.entry_point) else {
            if config.ignore_functions.contains(&reference.entry_point) {
                continue;
            }
            return Err(ProcessError::UnresolvedFunctionReference {
                entry_point: reference.entry_point.clone(),
                api,
            });
        };

        let mut referenced = false;

        if reference.added_in.is_some() {
            let dropped = removes
                && (reference.removed_in.is_some()
                    || reference.profile == GlProfile::Compatibility);
            if !dropped {
                functions_by_vendor.push_unique_by(String::new(), Rc::clone(function), Rc::ptr_eq);
                referenced = true;
            }
        }

        // Extension-sourced visibility is independent of removal.
        for extension in &reference.extensions {
            functions_by_vendor.push_unique_by(
                extension.vendor.clone(),
                Rc::clone(function),
                Rc::ptr_eq,
            );
            referenced = true;
        }

        if referenced {
            groups_referenced.extend(function.native.referenced_enum_groups.iter().cloned());
        }
    }

    // Visibility pass over the enumerant references. Removal here has no
    // extension override path; see DESIGN.md for the known asymmetry.
    let catalog = directory.members(api);
    let mut group_members: MultiMap<String, EnumGroupMember> = MultiMap::new();
    let mut all_group: Vec<EnumGroupMember> = Vec::new();

    for reference in &requires.enums {
        if removes
            && (reference.removed_in.is_some() || reference.profile == GlProfile::Compatibility)
        {
            continue;
        }
        if config.ignore_enums.contains(&reference.name) {
            continue;
        }
        let Some(member) = catalog.get(&reference.name) else {
            return Err(ProcessError::UnknownEnumReference {
                name: reference.name.clone(),
                api,
            });
        };

        for group in &member.groups {
            group_members.push_unique_by(group.clone(), member.clone(), |a, b| a.name == b.name);
        }

        // Everything that fits u32 also joins the synthetic All group.
        if member.value <= u64::from(u32::MAX) && !all_group.iter().any(|m| m.name == member.name)
        {
            all_group.push(member.clone());
        }
    }

    // Which native functions use which group, per vendor.
    let mut group_users: MultiMap<String, (String, Rc<NativeFunction>)> = MultiMap::new();
    for (vendor, functions) in functions_by_vendor.iter() {
        for function in functions {
            for group in &function.native.referenced_enum_groups {
                group_users.push_unique_by(
                    group.clone(),
                    (vendor.clone(), Rc::clone(&function.native)),
                    |a, b| a.0 == b.0 && Rc::ptr_eq(&a.1, &b.1),
                );
            }
        }
    }

    let groups = final_groups(api, directory, group_members, group_users, &groups_referenced, all_group);

    // Vendor buckets, core ("") first then lexicographic.
    let mut vendors: BTreeMap<String, VendorFunctions> = BTreeMap::new();
    for (vendor, functions) in functions_by_vendor.iter() {
        let bucket = vendors.entry(vendor.clone()).or_default();
        for function in functions {
            if function.change_native_name {
                bucket
                    .natives_with_postfix
                    .insert(function.native.entry_point.clone());
            }
            bucket.functions.push(Rc::clone(function));
        }
    }
    for bucket in vendors.values_mut() {
        bucket.functions.sort_by(|a, b| {
            a.native
                .function_name
                .cmp(&b.native.function_name)
                .then_with(|| a.native.entry_point.cmp(&b.native.entry_point))
        });
    }

    let documentation = namespace_documentation(api, requires, &vendors)?;

    Ok(Namespace {
        api,
        vendors,
        groups,
        documentation,
    })
}

fn final_groups(
    api: OutputApi,
    directory: &EnumDirectory,
    group_members: MultiMap<String, EnumGroupMember>,
    group_users: MultiMap<String, (String, Rc<NativeFunction>)>,
    groups_referenced: &BTreeSet<String>,
    mut all_group: Vec<EnumGroupMember>,
) -> Vec<EnumGroup> {
    let sort_members = |members: &mut Vec<EnumGroupMember>| {
        members.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.name.cmp(&b.name)));
    };

    sort_members(&mut all_group);
    let mut groups = vec![EnumGroup {
        name: "All".to_string(),
        is_flags: false,
        members: all_group,
        functions_using: None,
    }];

    for (group_name, is_flags) in directory.group_catalog(api) {
        // Out-of-band numeric constants, not a real group. Some of its
        // entries do not even fit the enum storage type.
        if group_name == "SpecialNumbers" {
            continue;
        }

        let mut members = group_members
            .get(group_name)
            .map(<[EnumGroupMember]>::to_vec)
            .unwrap_or_default();

        // Empty groups survive only while some included function still
        // references them (ShaderBinaryFormat in GL 4.1 through 4.5).
        if members.is_empty() && !groups_referenced.contains(group_name) {
            continue;
        }

        let functions_using = group_users.get(group_name).map(|users| {
            let mut users = users.to_vec();
            users.sort_by(|(vendor_a, function_a), (vendor_b, function_b)| {
                match (vendor_a.is_empty(), vendor_b.is_empty()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => function_a.function_name.cmp(&function_b.function_name),
                }
            });
            users
        });

        sort_members(&mut members);
        groups.push(EnumGroup {
            name: group_name.clone(),
            is_flags: *is_flags,
            members,
            functions_using,
        });
    }

    groups
}

fn namespace_documentation(
    api: OutputApi,
    requires: &ApiRequires,
    vendors: &BTreeMap<String, VendorFunctions>,
) -> ProcessResult<IndexMap<String, FunctionDocumentation>> {
    let reference_by_entry: IndexMap<&str, &FunctionReference> = requires
        .functions
        .iter()
        .map(|reference| (reference.entry_point.as_str(), reference))
        .collect();

    let mut documentation = IndexMap::new();
    for (vendor, bucket) in vendors {
        for function in &bucket.functions {
            let entry_point = &function.native.entry_point;
            if documentation.contains_key(entry_point) {
                continue;
            }
            let Some(reference) = reference_by_entry.get(entry_point.as_str()) else {
                return Err(ProcessError::MissingFunctionReference {
                    entry_point: entry_point.clone(),
                });
            };

            let command_doc = function.documentation.get(&api);
            if command_doc.is_none() && vendor.is_empty() {
                // Extensions are documented elsewhere; only core functions
                // are expected to have a reference page.
                warn!("{entry_point} doesn't have any documentation for {api}");
            }
            documentation.insert(
                entry_point.clone(),
                resolved_documentation(&function.native, reference, command_doc),
            );
        }
    }
    Ok(documentation)
}

/// The deterministic union of native entry points across every namespace of
/// one family, for dynamic-loader table emission.
fn pointer_table(file: GlFile, namespaces: &[Namespace]) -> Pointers {
    let mut functions: Vec<Rc<NativeFunction>> = Vec::new();
    for namespace in namespaces {
        if namespace.api.file() != file {
            continue;
        }
        for bucket in namespace.vendors.values() {
            for function in &bucket.functions {
                if !functions.iter().any(|f| Rc::ptr_eq(f, &function.native)) {
                    functions.push(Rc::clone(&function.native));
                }
            }
        }
    }
    functions.sort_by(|a, b| a.entry_point.cmp(&b.entry_point));
    Pointers { file, functions }
}

#[cfg(test)]
mod tests {
    use glgen_registry::{GlParameter, GlType, GroupRef, PrimitiveKind, TypeReference};

    use super::*;

    fn int_type(group: Option<&str>) -> TypeReference {
        TypeReference {
            ty: GlType::Base {
                kind: PrimitiveKind::Uint,
                constant: false,
            },
            handle: None,
            group: group.map(|name| GroupRef {
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn native_function_collects_groups_once() {
        let config = GeneratorConfig::opengl();
        let command = Command {
            entry_point: "glBindThing".to_string(),
            return_type: int_type(Some("ThingTarget")),
            parameters: vec![
                GlParameter {
                    ty: int_type(Some("ThingTarget")),
                    name: "target".to_string(),
                    flow: Default::default(),
                    kinds: vec![],
                    length: None,
                },
                GlParameter {
                    ty: int_type(None),
                    name: "thing".to_string(),
                    flow: Default::default(),
                    kinds: vec![],
                    length: None,
                },
            ],
        };
        let native = make_native_function(&command, &config).unwrap();
        assert_eq!(native.function_name, "BindThing");
        assert_eq!(native.referenced_enum_groups, vec!["ThingTarget".to_string()]);
    }

    #[test]
    fn reserved_parameter_names_are_escaped_in_native_signatures() {
        let config = GeneratorConfig::opengl();
        let command = Command {
            entry_point: "glThing".to_string(),
            return_type: int_type(None),
            parameters: vec![GlParameter {
                ty: int_type(None),
                name: "type".to_string(),
                flow: Default::default(),
                kinds: vec![],
                length: None,
            }],
        };
        let native = make_native_function(&command, &config).unwrap();
        assert_eq!(native.parameters[0].name, "type_");
    }

    #[test]
    fn only_core_profile_variants_remove() {
        assert!(removes_unavailable_entries(OutputApi::Gl));
        assert!(removes_unavailable_entries(OutputApi::Gles2));
        assert!(!removes_unavailable_entries(OutputApi::GlCompat));
        assert!(!removes_unavailable_entries(OutputApi::Gles1));
        assert!(!removes_unavailable_entries(OutputApi::Wgl));
        assert!(!removes_unavailable_entries(OutputApi::Glx));
    }
}
