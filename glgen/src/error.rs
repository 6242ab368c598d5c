use glgen_registry::{OutputApi, PrimitiveKind};
use thiserror::Error;

/// Result alias used across the resolution pipeline.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Fatal conditions that abort a whole family run. Warnings (documentation
/// mismatches, missing core documentation) are logged and substituted
/// locally and never show up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    /// A spec type used a primitive kind with no target mapping.
    #[error("no target mapping for primitive kind {kind:?}")]
    UnmappableType { kind: PrimitiveKind },

    /// A requirement list referenced a command the registry never declared
    /// and the ignore-list did not cover.
    #[error("could not resolve function reference '{entry_point}' for {api}")]
    UnresolvedFunctionReference { entry_point: String, api: OutputApi },

    /// A requirement list referenced an enumerant missing from the catalog.
    #[error("could not find any enum called '{name}' for {api}")]
    UnknownEnumReference { name: String, api: OutputApi },

    /// An enumerant declared no API applicability at all.
    #[error("enum '{name}' is not declared for any api")]
    DuplicateOrMissingApiFlag { name: String },

    /// A function record vanished between the resolution and documentation
    /// passes. Internal consistency violation.
    #[error("could not find function reference for '{entry_point}'")]
    MissingFunctionReference { entry_point: String },
}
