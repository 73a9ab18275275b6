use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Packaging type assumed when a key does not spell one out.
pub const DEFAULT_TYPE: &str = "jar";

/// Identity of a module within a dependency graph.
///
/// Written as `group:name[:classifier[:type]]`. The classifier defaults to
/// empty and the type to `jar`. Equality and ordering are structural, in
/// field order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactKey {
    pub group: String,
    pub name: String,
    pub classifier: String,
    pub kind: String,
}

impl ArtifactKey {
    /// A key with the default classifier and type.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            classifier: String::new(),
            kind: DEFAULT_TYPE.to_string(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Parse `group:name`, `group:name:classifier` or
    /// `group:name:classifier:type`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return None;
        }
        if parts[0].is_empty() || parts[1].is_empty() {
            return None;
        }
        let mut key = Self::new(parts[0], parts[1]);
        if let Some(classifier) = parts.get(2) {
            key.classifier = classifier.to_string();
        }
        if let Some(kind) = parts.get(3) {
            if kind.is_empty() {
                return None;
            }
            key.kind = kind.to_string();
        }
        Some(key)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if self.kind != DEFAULT_TYPE {
            write!(f, ":{}:{}", self.classifier, self.kind)
        } else if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)
        } else {
            Ok(())
        }
    }
}

impl FromStr for ArtifactKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("invalid artifact key `{s}`, expected group:name[:classifier[:type]]")
        })
    }
}

impl TryFrom<String> for ArtifactKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactKey> for String {
    fn from(key: ArtifactKey) -> Self {
        key.to_string()
    }
}
