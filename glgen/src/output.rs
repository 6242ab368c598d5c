//! The resolved, per-variant model handed to the emission tooling. Every
//! list and map in here is deterministically ordered; emitting the same
//! registry twice produces identical output.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use glgen_registry::docs::{CommandDocumentation, ParameterDocumentation};
use glgen_registry::{FlowDirection, GlFile, LengthRef, OutputApi};
use indexmap::IndexMap;

use crate::target::TargetType;

/// A resolved parameter of a native entry point or generated overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TargetType,
    pub name: String,
    pub flow: FlowDirection,
    pub kinds: Vec<String>,
    pub length: Option<LengthRef>,
}

/// One resolved entry point. Created once per distinct entry point and
/// shared by `Rc` across every output variant that exposes it; the
/// referenced-group list is deduplicated and immutable after construction.
#[derive(Debug, PartialEq, Eq)]
pub struct NativeFunction {
    pub entry_point: String,
    pub function_name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TargetType,
    pub referenced_enum_groups: Vec<String>,
}

/// Temporary names synthesized by overload rules, keyed by the parameter
/// they replace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameTable {
    pub entries: IndexMap<String, String>,
    pub return_name: Option<String>,
}

/// A candidate public-facing signature derived from a native function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub input_parameters: Vec<Parameter>,
    pub return_type: TargetType,
    pub overload_name: String,
    pub name_table: NameTable,
}

/// A native function together with its generated overload set and merged
/// documentation. `change_native_name` marks entry points whose raw name
/// collides with a generated overload and must be renamed at emission time.
#[derive(Debug, PartialEq, Eq)]
pub struct OverloadedFunction {
    pub native: Rc<NativeFunction>,
    pub documentation: IndexMap<OutputApi, CommandDocumentation>,
    pub overloads: Vec<Overload>,
    pub change_native_name: bool,
}

/// One enumerant as emitted into a group. Deduplicated by name within a
/// group; the value plays no part in that identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumGroupMember {
    pub name: String,
    pub value: u64,
    pub groups: Vec<String>,
    pub is_flag: bool,
}

/// A named enum group with its resolved bitmask flag, sorted members and
/// the functions that reference it (core vendor first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumGroup {
    pub name: String,
    pub is_flags: bool,
    pub members: Vec<EnumGroupMember>,
    pub functions_using: Option<Vec<(String, Rc<NativeFunction>)>>,
}

/// One vendor bucket of an assembled namespace.
#[derive(Debug, Default)]
pub struct VendorFunctions {
    pub functions: Vec<Rc<OverloadedFunction>>,
    /// Entry points whose native name gets a disambiguating postfix.
    pub natives_with_postfix: BTreeSet<String>,
}

/// Documentation as emitted next to a function: the merged reference-page
/// record plus the versions and extensions it was added in or removed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDocumentation {
    pub name: String,
    pub purpose: String,
    pub parameters: Vec<ParameterDocumentation>,
    pub ref_pages_link: Option<String>,
    pub added_in: Vec<String>,
    pub removed_in: Vec<String>,
}

/// One fully assembled output variant. `BTreeMap` ordering puts the
/// unqualified `""` core bucket first and the remaining vendors in
/// lexicographic order.
#[derive(Debug)]
pub struct Namespace {
    pub api: OutputApi,
    pub vendors: BTreeMap<String, VendorFunctions>,
    pub groups: Vec<EnumGroup>,
    /// Keyed by entry point.
    pub documentation: IndexMap<String, FunctionDocumentation>,
}

/// One family's entry-point-sorted union of native functions, for
/// dynamic-loader table emission.
#[derive(Debug)]
pub struct Pointers {
    pub file: GlFile,
    pub functions: Vec<Rc<NativeFunction>>,
}

/// The complete result of one family run. This is the sole contract handed
/// to the emission tooling.
#[derive(Debug)]
pub struct OutputData {
    pub pointers: Vec<Pointers>,
    pub namespaces: Vec<Namespace>,
}
