//! Union selection: the newest release line whose members jointly provide
//! every requested element.
//!
//! The scan is linear over union versions, newest first, and stops at the
//! first union that covers the request. Within that union each requested
//! element is assigned to the candidate member that sorts first by
//! `(name, version)`; the other candidates are reported, not returned.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use condor_core::declaration::ElementKey;
use condor_core::version::Version;

use crate::ambiguity::{Ambiguity, AmbiguityReport};
use crate::catalog::{ElementCatalog, Member};
use crate::error::{ResolveError, ResolveResult};

/// The members to import from one union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub union: Version,
    pub members: BTreeSet<Member>,
    /// The member elected for each requested element.
    pub providers: BTreeMap<ElementKey, Member>,
    pub ambiguities: AmbiguityReport,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Union {}", self.union)?;
        writeln!(f, "Members:")?;
        for member in &self.members {
            writeln!(f, "  {member}")?;
        }
        writeln!(f, "Elements:")?;
        for (element, member) in &self.providers {
            writeln!(f, "  {element} -> {member}")?;
        }
        if !self.ambiguities.is_empty() {
            write!(f, "{}", self.ambiguities)?;
        }
        Ok(())
    }
}

/// Select the newest union covering `requested`.
///
/// Returns `Ok(None)` when no union covers the request, including an empty
/// request. Fails with [`ResolveError::UnknownElement`] for the smallest
/// requested key that no member provides.
pub fn select(
    catalog: &ElementCatalog,
    requested: &BTreeSet<ElementKey>,
) -> ResolveResult<Option<Selection>> {
    if let Some(missing) = requested.iter().find(|key| !catalog.contains(key)) {
        return Err(ResolveError::UnknownElement {
            key: missing.clone(),
        });
    }

    let mut candidates: BTreeMap<&Version, BTreeMap<&str, &Member>> = BTreeMap::new();
    for key in requested {
        for member in catalog.get(key).into_iter().flatten() {
            for union in catalog.unions_of(member).into_iter().flatten() {
                candidates
                    .entry(union)
                    .or_default()
                    .insert(member.name.as_str(), member);
            }
        }
    }

    for (union, members) in candidates.iter().rev() {
        let covered: BTreeSet<&ElementKey> = members
            .values()
            .flat_map(|m| catalog.elements_of(m).into_iter().flatten())
            .collect();
        if requested.iter().all(|key| covered.contains(key)) {
            let selection = elect(catalog, union, members, requested);
            tracing::info!(
                "selected union {} with {} member(s)",
                selection.union,
                selection.members.len()
            );
            return Ok(Some(selection));
        }
        tracing::debug!("union {union} does not cover the request");
    }

    tracing::info!("no union covers {} requested element(s)", requested.len());
    Ok(None)
}

fn elect(
    catalog: &ElementCatalog,
    union: &Version,
    candidates: &BTreeMap<&str, &Member>,
    requested: &BTreeSet<ElementKey>,
) -> Selection {
    let mut providers = BTreeMap::new();
    let mut ambiguities = AmbiguityReport::new();

    for element in requested {
        let mut offering: Vec<&Member> = candidates
            .values()
            .copied()
            .filter(|m| catalog.elements_of(m).is_some_and(|e| e.contains(element)))
            .collect();
        offering.sort();
        let Some((chosen, rest)) = offering.split_first() else {
            continue;
        };
        if !rest.is_empty() {
            tracing::debug!(
                "element {element} is provided by {} members of union {union}, choosing {chosen}",
                offering.len()
            );
            ambiguities.add(Ambiguity {
                element: element.clone(),
                chosen: (*chosen).clone(),
                passed_over: rest.iter().map(|m| (*m).clone()).collect(),
            });
        }
        providers.insert(element.clone(), (*chosen).clone());
    }

    Selection {
        union: union.clone(),
        members: providers.values().cloned().collect(),
        providers,
        ambiguities,
    }
}
