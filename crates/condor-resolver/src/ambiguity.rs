//! Duplicate element providers inside a selected union.

use std::fmt;

use condor_core::declaration::ElementKey;

use crate::catalog::Member;

/// Every element of a selection that more than one member could provide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbiguityReport {
    pub ambiguities: Vec<Ambiguity>,
}

/// One requested element, the member elected for it, and the other
/// candidates that also provide it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub element: ElementKey,
    pub chosen: Member,
    pub passed_over: Vec<Member>,
}

impl AmbiguityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ambiguity: Ambiguity) {
        self.ambiguities.push(ambiguity);
    }

    pub fn is_empty(&self) -> bool {
        self.ambiguities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ambiguities.len()
    }
}

impl fmt::Display for AmbiguityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ambiguities.is_empty() {
            return write!(f, "No ambiguous providers.");
        }
        writeln!(f, "Ambiguous providers ({}):", self.ambiguities.len())?;
        for a in &self.ambiguities {
            writeln!(f, "  {a}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let others: Vec<String> = self.passed_over.iter().map(|m| m.to_string()).collect();
        write!(
            f,
            "{}: chose {} over {}",
            self.element,
            self.chosen,
            others.join(", ")
        )
    }
}
