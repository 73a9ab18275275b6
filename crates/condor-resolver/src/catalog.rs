//! Element catalog: which members provide an element, and which release
//! lines bundle a member.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use condor_core::declaration::{ElementKey, UnionDeclaration};
use condor_core::version::Version;

use crate::error::{ResolveError, ResolveResult};

/// A versioned bundle of elements. Ordered by name, then version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Member {
    pub name: String,
    pub version: Version,
}

impl Member {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MemberEntry {
    elements: BTreeSet<ElementKey>,
    unions: BTreeSet<Version>,
}

/// The smallest spelling seen for each distinct version.
struct Spellings<'a>(BTreeMap<&'a Version, &'a Version>);

impl<'a> Spellings<'a> {
    fn collect(unions: &'a [UnionDeclaration]) -> Self {
        let mut spellings: BTreeMap<&Version, &Version> = BTreeMap::new();
        let versions = unions
            .iter()
            .flat_map(|u| std::iter::once(&u.version).chain(u.members.iter().map(|m| &m.version)));
        for version in versions {
            let smallest = spellings.entry(version).or_insert(version);
            if version.as_str() < smallest.as_str() {
                *smallest = version;
            }
        }
        Self(spellings)
    }

    fn of(&self, version: &Version) -> Version {
        self.0.get(version).copied().unwrap_or(version).clone()
    }
}

/// Index over a set of unions, built once per selection request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCatalog {
    elements: BTreeMap<ElementKey, BTreeSet<Member>>,
    members: BTreeMap<Member, MemberEntry>,
    unions: BTreeMap<Version, BTreeSet<Member>>,
}

impl ElementCatalog {
    /// Index `unions`.
    ///
    /// Declaring a union, or a member within it, more than once merges the
    /// declarations. A union that bundles two versions of one member name
    /// is rejected. Equal versions written differently (`1`, `1.0`) are
    /// stored under their lexicographically smallest spelling.
    pub fn index(unions: &[UnionDeclaration]) -> ResolveResult<Self> {
        let spellings = Spellings::collect(unions);
        let mut catalog = Self::default();
        let mut names: BTreeMap<&Version, BTreeMap<&str, &Version>> = BTreeMap::new();

        for union in unions {
            let union_version = spellings.of(&union.version);
            let bundled = names.entry(&union.version).or_default();
            for decl in &union.members {
                if let Some(first) = bundled.get(decl.name.as_str()) {
                    if **first != decl.version {
                        return Err(ResolveError::ConflictingUnionMember {
                            union: union_version,
                            name: decl.name.clone(),
                            first: spellings.of(first),
                            second: spellings.of(&decl.version),
                        });
                    }
                }
                bundled.insert(&decl.name, &decl.version);

                let member = Member::new(decl.name.clone(), spellings.of(&decl.version));
                let entry = catalog.members.entry(member.clone()).or_default();
                entry.unions.insert(union_version.clone());
                entry.elements.extend(decl.elements.iter().cloned());
                for element in &decl.elements {
                    catalog
                        .elements
                        .entry(element.clone())
                        .or_default()
                        .insert(member.clone());
                }
                catalog
                    .unions
                    .entry(union_version.clone())
                    .or_default()
                    .insert(member);
            }
        }

        tracing::debug!(
            "indexed {} unions: {} members, {} elements",
            catalog.unions.len(),
            catalog.members.len(),
            catalog.elements.len()
        );
        Ok(catalog)
    }

    /// Members providing `element`, in (name, version) order.
    pub fn get(&self, element: &ElementKey) -> Option<&BTreeSet<Member>> {
        self.elements.get(element)
    }

    pub fn contains(&self, element: &ElementKey) -> bool {
        self.elements.contains_key(element)
    }

    /// Every element the member provides, across all its declarations.
    pub fn elements_of(&self, member: &Member) -> Option<&BTreeSet<ElementKey>> {
        self.members.get(member).map(|e| &e.elements)
    }

    /// Union versions bundling `member`. Never empty for a catalogued member.
    pub fn unions_of(&self, member: &Member) -> Option<&BTreeSet<Version>> {
        self.members.get(member).map(|e| &e.unions)
    }

    /// Members bundled by one union.
    pub fn members_of(&self, union: &Version) -> Option<&BTreeSet<Member>> {
        self.unions.get(union)
    }

    /// Every union version, oldest first.
    pub fn union_versions(&self) -> impl DoubleEndedIterator<Item = &Version> {
        self.unions.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for ElementCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return writeln!(f, "Empty catalog.");
        }
        for (element, members) in &self.elements {
            writeln!(f, "{element}")?;
            for member in members {
                let unions: Vec<String> = self
                    .unions_of(member)
                    .into_iter()
                    .flatten()
                    .map(|v| v.to_string())
                    .collect();
                writeln!(f, "  {member} @ {}", unions.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condor_core::declaration::MemberDeclaration;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn union(version: &str, members: &[(&str, &str, &[&str])]) -> UnionDeclaration {
        let mut union = UnionDeclaration::new(v(version));
        for (name, mv, elements) in members {
            let mut member = MemberDeclaration::new(*name, v(mv));
            for e in *elements {
                member = member.element(*e);
            }
            union = union.member(member);
        }
        union
    }

    #[test]
    fn indexes_members_and_unions() {
        let catalog = ElementCatalog::index(&[
            union("1", &[("core", "1.0", &["a"])]),
            union("2", &[("core", "1.0", &["a"]), ("camel", "2.5", &["b", "c"])]),
        ])
        .unwrap();

        let core = Member::new("core", v("1.0"));
        let providers: Vec<&Member> = catalog.get(&"a".into()).unwrap().iter().collect();
        assert_eq!(providers, vec![&core]);
        assert_eq!(
            catalog.unions_of(&core).unwrap().iter().collect::<Vec<_>>(),
            vec![&v("1"), &v("2")]
        );
        assert_eq!(catalog.elements_of(&Member::new("camel", v("2.5"))).unwrap().len(), 2);
        assert!(catalog.get(&"z".into()).is_none());
        assert_eq!(catalog.union_versions().count(), 2);
        assert_eq!(catalog.members_of(&v("2")).unwrap().len(), 2);
        assert!(catalog.members_of(&v("3")).is_none());
    }

    #[test]
    fn duplicate_declarations_are_merged() {
        let once = ElementCatalog::index(&[union("1", &[("core", "1.0", &["a"])])]).unwrap();
        let twice = ElementCatalog::index(&[
            union("1", &[("core", "1.0", &["a"]), ("core", "1.0", &["a"])]),
            union("1", &[("core", "1.0", &["a"])]),
        ])
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn input_order_does_not_matter() {
        let forward = ElementCatalog::index(&[
            union("1", &[("core", "1.0", &["a"])]),
            union("2", &[("camel", "2.0", &["b"]), ("core", "2.0", &["a"])]),
        ])
        .unwrap();
        let backward = ElementCatalog::index(&[
            union("2", &[("core", "2.0", &["a"]), ("camel", "2.0", &["b"])]),
            union("1", &[("core", "1.0", &["a"])]),
        ])
        .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.to_string(), backward.to_string());
    }

    #[test]
    fn two_versions_of_one_member_in_a_union_conflict() {
        let err = ElementCatalog::index(&[
            union("2", &[("core", "2.0", &["a"])]),
            union("2", &[("core", "2.1", &["a"])]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::ConflictingUnionMember {
                union: v("2"),
                name: "core".into(),
                first: v("2.0"),
                second: v("2.1"),
            }
        );
    }

    #[test]
    fn equal_versions_render_the_same_in_any_order() {
        let forward = ElementCatalog::index(&[
            union("1", &[("core", "1.0", &["a"])]),
            union("1.0", &[("core", "1", &["a"])]),
        ])
        .unwrap();
        let backward = ElementCatalog::index(&[
            union("1.0", &[("core", "1", &["a"])]),
            union("1", &[("core", "1.0", &["a"])]),
        ])
        .unwrap();
        assert_eq!(forward.to_string(), "a\n  core:1 @ 1\n");
        assert_eq!(backward.to_string(), forward.to_string());
        assert_eq!(forward.union_versions().count(), 1);
    }

    #[test]
    fn display_lists_providers_with_unions() {
        let catalog = ElementCatalog::index(&[
            union("1", &[("core", "1.0", &["a"])]),
            union("2", &[("core", "1.0", &["a"])]),
        ])
        .unwrap();
        assert_eq!(catalog.to_string(), "a\n  core:1.0 @ 1, 2\n");
        assert_eq!(ElementCatalog::default().to_string(), "Empty catalog.\n");
    }
}
