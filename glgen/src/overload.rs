use std::collections::BTreeSet;
use std::rc::Rc;

use glgen_registry::docs::CommandDocumentation;
use glgen_registry::{FlowDirection, LengthRef, OutputApi};
use indexmap::IndexMap;

use crate::output::{NameTable, NativeFunction, Overload, OverloadedFunction};
use crate::target::{RefKind, TargetPrimitive, TargetType};

/// One signature transformation of the overload pipeline. A rule either
/// declines (`None`, the overload passes through unchanged) or produces
/// one or more replacement overloads. Rules never mutate their input.
pub trait OverloadRule {
    fn name(&self) -> &'static str;
    fn apply(&self, overload: &Overload, native: &NativeFunction) -> Option<Vec<Overload>>;
}

/// The fixed rule list, in declared order. Each rule sees the cumulative
/// output of all rules before it.
pub fn default_rules() -> Vec<Box<dyn OverloadRule>> {
    vec![
        Box::new(TrimNameRule),
        Box::new(StringReturnRule),
        Box::new(SpanForPointerRule),
        Box::new(RefForPointerRule),
    ]
}

/// Runs the rule pipeline for one native function. The seed is a base
/// overload mirroring the native signature; if no rule ever fires the
/// result is an empty overload set, not the base (the native entry point is
/// emitted separately). A produced overload whose name and parameter types
/// still equal the native signature forces the native name to change.
pub fn generate_overloads(
    native: &Rc<NativeFunction>,
    documentation: IndexMap<OutputApi, CommandDocumentation>,
    rules: &[Box<dyn OverloadRule>],
) -> OverloadedFunction {
    let base = Overload {
        input_parameters: native.parameters.clone(),
        return_type: native.return_type.clone(),
        overload_name: native.function_name.clone(),
        name_table: NameTable::default(),
    };

    let mut overloads = vec![base];
    let mut overloaded_once = false;
    for rule in rules {
        let mut next = Vec::with_capacity(overloads.len());
        for overload in &overloads {
            match rule.apply(overload, native) {
                Some(replacements) => {
                    overloaded_once = true;
                    next.extend(replacements);
                }
                None => next.push(overload.clone()),
            }
        }
        overloads = next;
    }

    let overloads = if overloaded_once { overloads } else { Vec::new() };

    let change_native_name = overloads
        .iter()
        .any(|overload| matches_native_signature(native, overload));

    OverloadedFunction {
        native: Rc::clone(native),
        documentation,
        overloads,
        change_native_name,
    }
}

fn matches_native_signature(native: &NativeFunction, overload: &Overload) -> bool {
    native.parameters.len() == overload.input_parameters.len()
        && overload.overload_name == native.function_name
        && native
            .parameters
            .iter()
            .zip(&overload.input_parameters)
            .all(|(native_param, overload_param)| native_param.ty == overload_param.ty)
}

/// Strips a trailing vector type suffix from the generated name, keeping
/// the component count: `Color3fv -> Color3`, `GetIntegerv` is untouched
/// (`er` is not a type suffix).
pub struct TrimNameRule;

impl TrimNameRule {
    fn trimmed(name: &str) -> Option<String> {
        let stem = name.strip_suffix('v')?;
        // Longest suffixes first so `ui64v` does not match as `i64v`.
        const TYPE_SUFFIXES: [&str; 10] =
            ["ui64", "i64", "ub", "us", "ui", "b", "s", "i", "f", "d"];
        for suffix in TYPE_SUFFIXES {
            if let Some(rest) = stem.strip_suffix(suffix) {
                if rest.is_empty() {
                    return None;
                }
                return Some(rest.to_string());
            }
        }
        None
    }
}

impl OverloadRule for TrimNameRule {
    fn name(&self) -> &'static str {
        "trim-name"
    }

    fn apply(&self, overload: &Overload, _native: &NativeFunction) -> Option<Vec<Overload>> {
        let trimmed = Self::trimmed(&overload.overload_name)?;
        let mut replacement = overload.clone();
        replacement.overload_name = trimmed;
        Some(vec![replacement])
    }
}

/// Turns a `const char*` return into a string return. The signature keeps
/// its name and parameters, so this is the rule that typically forces the
/// native entry point to be renamed.
pub struct StringReturnRule;

impl OverloadRule for StringReturnRule {
    fn name(&self) -> &'static str {
        "string-return"
    }

    fn apply(&self, overload: &Overload, _native: &NativeFunction) -> Option<Vec<Overload>> {
        let TargetType::Pointer { inner, .. } = &overload.return_type else {
            return None;
        };
        let TargetType::Primitive {
            kind: TargetPrimitive::Char8,
            constant: true,
        } = **inner
        else {
            return None;
        };

        let mut replacement = overload.clone();
        replacement.return_type = TargetType::String;
        replacement.name_table.return_name = Some("string_result".to_string());
        Some(vec![replacement])
    }
}

fn is_integer_primitive(ty: &TargetType) -> bool {
    matches!(
        ty,
        TargetType::Primitive {
            kind: TargetPrimitive::I8
                | TargetPrimitive::U8
                | TargetPrimitive::I16
                | TargetPrimitive::U16
                | TargetPrimitive::I32
                | TargetPrimitive::U32
                | TargetPrimitive::I64
                | TargetPrimitive::U64
                | TargetPrimitive::IntPtr
                | TargetPrimitive::UIntPtr,
            ..
        }
    )
}

/// Folds every `(pointer, length)` parameter pair whose length names a
/// sibling integer parameter into a single span parameter, dropping the
/// length parameter. Produces one replacement overload covering all pairs.
pub struct SpanForPointerRule;

impl OverloadRule for SpanForPointerRule {
    fn name(&self) -> &'static str {
        "span-for-pointer"
    }

    fn apply(&self, overload: &Overload, _native: &NativeFunction) -> Option<Vec<Overload>> {
        let params = &overload.input_parameters;

        let mut span_indices = BTreeSet::new();
        let mut length_indices = BTreeSet::new();
        for (index, param) in params.iter().enumerate() {
            let TargetType::Pointer { .. } = param.ty else {
                continue;
            };
            let Some(LengthRef::Parameter(length_name)) = &param.length else {
                continue;
            };
            let Some(length_index) = params.iter().position(|p| &p.name == length_name) else {
                continue;
            };
            if !is_integer_primitive(&params[length_index].ty) {
                continue;
            }
            span_indices.insert(index);
            length_indices.insert(length_index);
        }

        if span_indices.is_empty() {
            return None;
        }

        let mut replacement = overload.clone();
        let mut new_parameters = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            if length_indices.contains(&index) {
                continue;
            }
            if span_indices.contains(&index) {
                let TargetType::Pointer { inner, .. } = &param.ty else {
                    unreachable!("span indices only cover pointer parameters");
                };
                let mut span_param = param.clone();
                span_param.ty = TargetType::Span {
                    element: inner.clone(),
                    readonly: inner.is_const(),
                };
                span_param.length = None;
                replacement
                    .name_table
                    .entries
                    .insert(param.name.clone(), format!("{}_ptr", param.name));
                new_parameters.push(span_param);
            } else {
                new_parameters.push(param.clone());
            }
        }
        replacement.input_parameters = new_parameters;
        Some(vec![replacement])
    }
}

/// Surfaces each remaining single-element pointer parameter as a reference:
/// `In` for const pointees, `Out` for out-flow parameters, `Ref` otherwise.
/// Void, char and pointer-to-pointer pointees are left alone.
pub struct RefForPointerRule;

impl OverloadRule for RefForPointerRule {
    fn name(&self) -> &'static str {
        "ref-for-pointer"
    }

    fn apply(&self, overload: &Overload, _native: &NativeFunction) -> Option<Vec<Overload>> {
        let mut replacement = overload.clone();
        let mut renamed = Vec::new();

        for param in &mut replacement.input_parameters {
            if param.length.is_some() {
                continue;
            }
            let TargetType::Pointer { inner, .. } = &param.ty else {
                continue;
            };
            if matches!(
                **inner,
                TargetType::Void
                    | TargetType::Pointer { .. }
                    | TargetType::Primitive {
                        kind: TargetPrimitive::Char8,
                        ..
                    }
            ) {
                continue;
            }

            let kind = if inner.is_const() {
                RefKind::In
            } else if param.flow == FlowDirection::Out {
                RefKind::Out
            } else {
                RefKind::Ref
            };
            let element = inner.clone();
            renamed.push(param.name.clone());
            param.ty = TargetType::Ref { kind, element };
        }

        if renamed.is_empty() {
            return None;
        }
        for name in renamed {
            let pointer_name = format!("{name}_ptr");
            replacement.name_table.entries.insert(name, pointer_name);
        }
        Some(vec![replacement])
    }
}
