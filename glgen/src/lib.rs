//! GL Binding Resolution Engine
//!
//! This crate turns a pre-parsed registry (commands, enumerants and per-API
//! requirement lists) plus reference-page documentation into a fully resolved
//! per-variant model ready for source emission: feature-gated vendor buckets,
//! generated calling-convention overloads, deduplicated enum groups and
//! function-pointer load tables. Parsing the raw XML and writing source text
//! are the concerns of the surrounding tools, not of this crate.

pub mod config;
pub mod docs;
pub mod enums;
pub mod error;
pub mod multimap;
pub mod output;
pub mod overload;
pub mod process;
pub mod target;

pub use config::{GeneratorConfig, MangleSettings};
pub use error::{ProcessError, ProcessResult};
pub use output::OutputData;
pub use process::process_registry;

// Re-export the boundary data model for convenience
pub use glgen_registry;
