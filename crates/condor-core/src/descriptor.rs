use serde::{Deserialize, Serialize};
use std::path::Path;

use condor_util::errors::CondorError;

use crate::artifact::ArtifactKey;
use crate::declaration::{ModuleDeclaration, UnionDeclaration};

/// A resolution input file: module declarations with their roots, and/or
/// the union release lines to select from.
///
/// TOML by default; files with a `.json` extension are read as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// The application's own direct module declarations.
    #[serde(default)]
    pub roots: Vec<ArtifactKey>,

    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDeclaration>,

    #[serde(default, rename = "union")]
    pub unions: Vec<UnionDeclaration>,
}

impl Descriptor {
    /// Load and parse a descriptor file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CondorError::Descriptor {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            CondorError::Descriptor {
                message: format!("Failed to parse descriptor: {e}"),
            }
            .into()
        })
    }

    pub fn from_json_str(content: &str) -> miette::Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            CondorError::Descriptor {
                message: format!("Failed to parse descriptor: {e}"),
            }
            .into()
        })
    }

    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
