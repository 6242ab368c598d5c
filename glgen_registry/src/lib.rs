//! GL Registry Data Model
//!
//! This crate contains the boundary records handed to the binding generator:
//! the command and enumerant catalogs, the per-API require/remove lists and
//! the reference-page documentation records. It provides pure data structures
//! without any XML parsing or code generation logic; pre-parsed registries
//! can be round-tripped as JSON for inspection and testing.

pub mod docs;
pub mod types;

// Re-export commonly used types at the crate root
pub use docs::{CommandDocumentation, Documentation, ParameterDocumentation, VersionDocumentation};
pub use types::*;
