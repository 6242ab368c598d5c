use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

use crate::types::OutputApi;

/// Reference-page documentation for every API version we have sources for.
/// May be empty; the WGL and GLX families have no documentation corpus.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Documentation {
    #[serde(default)]
    pub versions: IndexMap<OutputApi, VersionDocumentation>,
}

/// Documentation records for one API version, keyed by entry point.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct VersionDocumentation {
    #[serde(default)]
    pub commands: IndexMap<String, CommandDocumentation>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDocumentation {
    pub name: String,
    pub purpose: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDocumentation>,
    #[serde(default)]
    pub ref_pages_link: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDocumentation {
    pub name: String,
    pub description: String,
}
