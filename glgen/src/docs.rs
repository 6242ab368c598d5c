use glgen_registry::docs::{CommandDocumentation, Documentation};
use glgen_registry::{FunctionReference, OutputApi};
use indexmap::IndexMap;
use tracing::warn;

use crate::output::{FunctionDocumentation, NativeFunction};

/// Cross-references one resolved function against every documentation
/// version. Parameter-count and parameter-name mismatches are diagnosed but
/// never fatal; the documentation is merged as-is.
pub fn documentation_for_native(
    native: &NativeFunction,
    docs: &Documentation,
) -> IndexMap<OutputApi, CommandDocumentation> {
    let mut merged = IndexMap::new();

    for (api, version_docs) in &docs.versions {
        let Some(command_doc) = version_docs.commands.get(&native.entry_point) else {
            continue;
        };
        for diagnostic in mismatch_diagnostics(native, command_doc, *api) {
            warn!("{diagnostic}");
        }
        merged.insert(*api, command_doc.clone());
    }

    merged
}

/// The mismatch messages for one (function, documentation) pair. Split out
/// so tests can count them without capturing log output.
pub fn mismatch_diagnostics(
    native: &NativeFunction,
    doc: &CommandDocumentation,
    api: OutputApi,
) -> Vec<String> {
    let mut diagnostics = Vec::new();

    if native.parameters.len() != doc.parameters.len() {
        diagnostics.push(format!(
            "function {} has a different number of parameters than the documentation \
             (registry: {}, documentation: {})",
            native.entry_point,
            native.parameters.len(),
            doc.parameters.len(),
        ));
    }

    let shared = native.parameters.len().min(doc.parameters.len());
    for index in 0..shared {
        let actual = &native.parameters[index].name;
        let documented = &doc.parameters[index].name;
        if actual != documented {
            diagnostics.push(format!(
                "[{api}][{}] parameter '{actual}' is named '{documented}' in the documentation",
                native.entry_point,
            ));
        }
    }

    diagnostics
}

/// The added-in/removed-in history of a function reference, formatted for
/// emission: the introducing version first, then every extension name.
pub fn reference_history(reference: &FunctionReference) -> (Vec<String>, Vec<String>) {
    let mut added_in = Vec::new();
    if let Some(version) = reference.added_in {
        added_in.push(format!("v{version}"));
    }
    for extension in &reference.extensions {
        added_in.push(extension.name.clone());
    }

    let mut removed_in = Vec::new();
    if let Some(version) = reference.removed_in {
        removed_in.push(format!("v{version}"));
    }

    (added_in, removed_in)
}

/// Builds the emitted documentation record for one function in one
/// namespace. With no reference-page record available this synthesizes a
/// placeholder carrying just the entry point and the version history.
pub fn resolved_documentation(
    native: &NativeFunction,
    reference: &FunctionReference,
    doc: Option<&CommandDocumentation>,
) -> FunctionDocumentation {
    let (added_in, removed_in) = reference_history(reference);

    match doc {
        Some(doc) => FunctionDocumentation {
            name: doc.name.clone(),
            purpose: doc.purpose.clone(),
            parameters: doc.parameters.clone(),
            ref_pages_link: doc.ref_pages_link.clone(),
            added_in,
            removed_in,
        },
        None => FunctionDocumentation {
            name: native.entry_point.clone(),
            purpose: String::new(),
            parameters: Vec::new(),
            ref_pages_link: None,
            added_in,
            removed_in,
        },
    }
}
