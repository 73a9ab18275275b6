//! Structured resolution failures.
//!
//! Every variant is fatal to the resolution call and carries the implicated
//! keys; formatting for end users is left to the caller.

use std::fmt;

use condor_core::artifact::ArtifactKey;
use condor_core::declaration::ElementKey;
use condor_core::version::Version;
use miette::Diagnostic;
use thiserror::Error;

/// A module registered as the provider of a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub key: ArtifactKey,
    pub label: String,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label == self.key.to_string() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{} ({})", self.label, self.key)
        }
    }
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Module {key} is declared more than once")]
    #[diagnostic(help("Each module key may appear in exactly one declaration"))]
    DuplicateModule { key: ArtifactKey },

    #[error("Capability {capability} is provided by both {existing} and {new}")]
    #[diagnostic(help("Only one provider of a capability is allowed in an application"))]
    CapabilityConflict {
        capability: String,
        existing: Provider,
        new: Provider,
    },

    #[error("Element {key} is not provided by any union member")]
    UnknownElement { key: ElementKey },

    #[error("Union {union} bundles member {name} at both {first} and {second}")]
    #[diagnostic(help("A release line carries exactly one version of each member"))]
    ConflictingUnionMember {
        union: Version,
        name: String,
        first: Version,
        second: Version,
    },

    #[error("Internal invariant violated: activation did not settle within {bound} passes (ran {passes})")]
    InternalInvariantViolation { passes: usize, bound: usize },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
