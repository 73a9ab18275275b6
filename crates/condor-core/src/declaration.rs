//! Declarative inputs to the resolver.
//!
//! These are plain records: a collaborator reads them from project or
//! platform descriptors and hands them over as-is. Nothing here validates
//! cross-record consistency; that is the graph builder's and catalog's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::artifact::ArtifactKey;
use crate::version::Version;

/// One module ("extension") with its outgoing edges and capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    pub key: ArtifactKey,

    /// Unconditional edges.
    #[serde(default)]
    pub dependencies: BTreeSet<ArtifactKey>,

    #[serde(default, rename = "conditional")]
    pub conditional_dependencies: Vec<ConditionalDependency>,

    #[serde(default)]
    pub capabilities: Vec<CapabilityDeclaration>,

    /// Artifacts this module removes from the application it is part of.
    #[serde(default)]
    pub excluded: BTreeSet<ArtifactKey>,
}

impl ModuleDeclaration {
    pub fn new(key: ArtifactKey) -> Self {
        Self {
            key,
            dependencies: BTreeSet::new(),
            conditional_dependencies: Vec::new(),
            capabilities: Vec::new(),
            excluded: BTreeSet::new(),
        }
    }

    pub fn depends_on(mut self, key: ArtifactKey) -> Self {
        self.dependencies.insert(key);
        self
    }

    pub fn depends_on_if(
        mut self,
        target: ArtifactKey,
        conditions: impl IntoIterator<Item = ArtifactKey>,
    ) -> Self {
        self.conditional_dependencies.push(ConditionalDependency {
            target,
            conditions: conditions.into_iter().collect(),
        });
        self
    }

    pub fn excludes(mut self, key: ArtifactKey) -> Self {
        self.excluded.insert(key);
        self
    }

    pub fn provides(mut self, capability: impl Into<String>) -> Self {
        self.capabilities
            .push(CapabilityDeclaration::Name(capability.into()));
        self
    }
}

/// An edge to `target` that activates once every key in `conditions` is
/// itself active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalDependency {
    pub target: ArtifactKey,
    #[serde(default)]
    pub conditions: BTreeSet<ArtifactKey>,
}

/// A capability provided by a module, optionally with a label for
/// conflict messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityDeclaration {
    Name(String),
    Labeled {
        name: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl CapabilityDeclaration {
    pub fn name(&self) -> &str {
        match self {
            CapabilityDeclaration::Name(name) => name,
            CapabilityDeclaration::Labeled { name, .. } => name,
        }
    }

    /// The label to show for `provider`, falling back to its key.
    pub fn label_for(&self, provider: &ArtifactKey) -> String {
        match self {
            CapabilityDeclaration::Labeled {
                label: Some(label), ..
            } => label.clone(),
            _ => provider.to_string(),
        }
    }
}

/// Opaque identifier of a requested unit of functionality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(pub String);

impl ElementKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ElementKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A release line and the members it bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionDeclaration {
    pub version: Version,
    #[serde(default, rename = "member")]
    pub members: Vec<MemberDeclaration>,
}

impl UnionDeclaration {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, member: MemberDeclaration) -> Self {
        self.members.push(member);
        self
    }
}

/// A versioned bundle (e.g. a platform BOM) and the elements it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeclaration {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub elements: BTreeSet<ElementKey>,
}

impl MemberDeclaration {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            elements: BTreeSet::new(),
        }
    }

    pub fn element(mut self, key: impl Into<ElementKey>) -> Self {
        self.elements.insert(key.into());
        self
    }
}
