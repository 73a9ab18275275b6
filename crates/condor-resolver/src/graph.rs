//! Module graph construction.
//!
//! One node per module, direct and conditional edges stored as petgraph edge
//! weights, and a key index so callers never hold node references across
//! calls. Cycles are a legal shape here; the activation resolver deals with
//! them.

use std::collections::{BTreeMap, BTreeSet};

use condor_core::artifact::ArtifactKey;
use condor_core::declaration::ModuleDeclaration;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::capability::CapabilityRegistry;
use crate::error::{ResolveError, ResolveResult};

/// A node in the module graph. Keys only ever referenced (as a dependency,
/// condition or target) and never declared become leaves with no exclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    pub key: ArtifactKey,
    pub excluded: BTreeSet<ArtifactKey>,
}

/// Edge label in the module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepEdge {
    Direct,
    /// Fires once every condition node is active.
    Conditional { conditions: Vec<NodeIndex> },
}

/// A conditional edge flattened out of the graph, with its endpoints.
#[derive(Debug, Clone)]
pub struct ConditionalEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub conditions: Vec<NodeIndex>,
}

/// The raw module graph for one resolution call.
#[derive(Debug)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, DepEdge>,
    index: BTreeMap<ArtifactKey, NodeIndex>,
    capabilities: CapabilityRegistry,
}

impl ModuleGraph {
    /// Build the graph from module declarations.
    ///
    /// Fails on the first key declared twice and on the first capability
    /// claimed by a second module.
    pub fn build(declarations: &[ModuleDeclaration]) -> ResolveResult<Self> {
        let mut g = Self {
            graph: DiGraph::new(),
            index: BTreeMap::new(),
            capabilities: CapabilityRegistry::new(),
        };

        // Declared nodes first, so that a reference seen earlier in the
        // input never masks a duplicate declaration.
        for decl in declarations {
            if g.index.contains_key(&decl.key) {
                return Err(ResolveError::DuplicateModule {
                    key: decl.key.clone(),
                });
            }
            for capability in &decl.capabilities {
                g.capabilities.register(
                    capability.name(),
                    &decl.key,
                    &capability.label_for(&decl.key),
                )?;
            }
            let idx = g.graph.add_node(ModuleNode {
                key: decl.key.clone(),
                excluded: decl.excluded.clone(),
            });
            g.index.insert(decl.key.clone(), idx);
        }

        for decl in declarations {
            let source = g.index[&decl.key];
            for dep in &decl.dependencies {
                let target = g.intern(dep);
                g.graph.add_edge(source, target, DepEdge::Direct);
            }
            for cond in &decl.conditional_dependencies {
                if decl.dependencies.contains(&cond.target) {
                    tracing::warn!(
                        "{} declares {} both as a direct and a conditional dependency, ignoring the conditional edge",
                        decl.key,
                        cond.target
                    );
                    continue;
                }
                let target = g.intern(&cond.target);
                let conditions: Vec<NodeIndex> =
                    cond.conditions.iter().map(|k| g.intern(k)).collect();
                let edge = DepEdge::Conditional { conditions };
                let already_declared = g
                    .graph
                    .edges_connecting(source, target)
                    .any(|e| *e.weight() == edge);
                if !already_declared {
                    g.graph.add_edge(source, target, edge);
                }
            }
        }

        tracing::debug!(
            "built module graph: {} modules ({} declared), {} edges, {} capabilities",
            g.graph.node_count(),
            declarations.len(),
            g.graph.edge_count(),
            g.capabilities.len()
        );
        Ok(g)
    }

    /// Look up a node, creating an undeclared leaf for unknown keys.
    fn intern(&mut self, key: &ArtifactKey) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(ModuleNode {
            key: key.clone(),
            excluded: BTreeSet::new(),
        });
        self.index.insert(key.clone(), idx);
        idx
    }

    pub fn find(&self, key: &ArtifactKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn key(&self, idx: NodeIndex) -> &ArtifactKey {
        &self.graph[idx].key
    }

    /// All module keys in key order.
    pub fn keys(&self) -> impl Iterator<Item = &ArtifactKey> {
        self.index.keys()
    }

    /// Direct dependencies of a node, in key order.
    pub fn direct_dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| matches!(e.weight(), DepEdge::Direct))
            .map(|e| e.target())
            .collect();
        deps.sort_by(|a, b| self.key(*a).cmp(self.key(*b)));
        deps
    }

    /// Artifacts the module at `idx` excludes from the application.
    pub fn exclusions(&self, idx: NodeIndex) -> &BTreeSet<ArtifactKey> {
        &self.graph[idx].excluded
    }

    /// Every conditional edge, ordered by source key, then target key, then
    /// condition keys, independent of declaration order.
    pub fn conditional_edges(&self) -> Vec<ConditionalEdge> {
        let mut edges: Vec<ConditionalEdge> = self
            .graph
            .edge_references()
            .filter_map(|e| match e.weight() {
                DepEdge::Conditional { conditions } => Some(ConditionalEdge {
                    source: e.source(),
                    target: e.target(),
                    conditions: conditions.clone(),
                }),
                DepEdge::Direct => None,
            })
            .collect();
        edges.sort_by(|a, b| {
            self.key(a.source)
                .cmp(self.key(b.source))
                .then_with(|| self.key(a.target).cmp(self.key(b.target)))
                .then_with(|| self.condition_keys(a).cmp(&self.condition_keys(b)))
        });
        edges
    }

    /// Condition keys of an edge, sorted.
    pub fn condition_keys(&self, edge: &ConditionalEdge) -> Vec<&ArtifactKey> {
        let mut keys: Vec<&ArtifactKey> = edge.conditions.iter().map(|c| self.key(*c)).collect();
        keys.sort();
        keys
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// Number of nodes, declared or not.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condor_core::declaration::CapabilityDeclaration;

    fn key(name: &str) -> ArtifactKey {
        ArtifactKey::new("org.acme", name)
    }

    #[test]
    fn one_node_per_declaration() {
        let g = ModuleGraph::build(&[
            ModuleDeclaration::new(key("a")).depends_on(key("b")),
            ModuleDeclaration::new(key("b")),
        ])
        .unwrap();
        assert_eq!(g.len(), 2);
        let a = g.find(&key("a")).unwrap();
        let b = g.find(&key("b")).unwrap();
        assert_eq!(g.direct_dependencies(a), vec![b]);
        assert!(g.direct_dependencies(b).is_empty());
    }

    #[test]
    fn duplicate_declaration_is_fatal() {
        let err = ModuleGraph::build(&[
            ModuleDeclaration::new(key("a")),
            ModuleDeclaration::new(key("b")),
            ModuleDeclaration::new(key("a")).depends_on(key("c")),
        ])
        .unwrap_err();
        assert_eq!(err, ResolveError::DuplicateModule { key: key("a") });
    }

    #[test]
    fn referenced_before_declared_is_not_a_duplicate() {
        let g = ModuleGraph::build(&[
            ModuleDeclaration::new(key("a")).depends_on(key("b")),
            ModuleDeclaration::new(key("b")).depends_on(key("c")),
        ])
        .unwrap();
        let b = g.find(&key("b")).unwrap();
        let c = g.find(&key("c")).unwrap();
        assert_eq!(g.direct_dependencies(b), vec![c]);
        assert!(g.direct_dependencies(c).is_empty());
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn capability_conflict_surfaces_at_build_time() {
        let err = ModuleGraph::build(&[
            ModuleDeclaration::new(key("classic")).provides("acme.rest"),
            ModuleDeclaration::new(key("reactive")).provides("acme.rest"),
        ])
        .unwrap_err();
        assert!(matches!(err, ResolveError::CapabilityConflict { .. }));
    }

    #[test]
    fn capability_labels_default_to_key() {
        let mut decl = ModuleDeclaration::new(key("h")).provides("acme.h");
        decl.capabilities.push(CapabilityDeclaration::Labeled {
            name: "acme.h2".into(),
            label: Some("Acme H".into()),
        });
        let g = ModuleGraph::build(&[decl]).unwrap();
        assert_eq!(g.capabilities().provider("acme.h").unwrap().label, "org.acme:h");
        assert_eq!(g.capabilities().provider("acme.h2").unwrap().label, "Acme H");
        assert_eq!(g.capabilities().len(), 2);
    }

    #[test]
    fn exclusions_stay_on_their_module() {
        let g = ModuleGraph::build(&[
            ModuleDeclaration::new(key("a"))
                .depends_on(key("b"))
                .excludes(key("x")),
        ])
        .unwrap();
        let a = g.find(&key("a")).unwrap();
        let b = g.find(&key("b")).unwrap();
        assert_eq!(g.exclusions(a).iter().collect::<Vec<_>>(), vec![&key("x")]);
        assert!(g.exclusions(b).is_empty());
        assert!(g.find(&key("x")).is_none());
    }

    #[test]
    fn cycles_are_accepted() {
        let g = ModuleGraph::build(&[
            ModuleDeclaration::new(key("a")).depends_on(key("b")),
            ModuleDeclaration::new(key("b")).depends_on(key("a")),
        ])
        .unwrap();
        let a = g.find(&key("a")).unwrap();
        let b = g.find(&key("b")).unwrap();
        assert_eq!(g.direct_dependencies(a), vec![b]);
        assert_eq!(g.direct_dependencies(b), vec![a]);
    }

    #[test]
    fn conditional_edge_duplicating_direct_edge_is_dropped() {
        let g = ModuleGraph::build(&[ModuleDeclaration::new(key("a"))
            .depends_on(key("b"))
            .depends_on_if(key("b"), [key("c")])])
        .unwrap();
        assert!(g.conditional_edges().is_empty());
        let a = g.find(&key("a")).unwrap();
        assert_eq!(g.direct_dependencies(a).len(), 1);
    }

    #[test]
    fn conditional_edges_are_ordered_by_key() {
        let g = ModuleGraph::build(&[
            ModuleDeclaration::new(key("z")).depends_on_if(key("y"), [key("x")]),
            ModuleDeclaration::new(key("a"))
                .depends_on_if(key("q"), [key("x")])
                .depends_on_if(key("c"), [key("x"), key("w")])
                .depends_on_if(key("c"), [key("x"), key("w")]),
        ])
        .unwrap();
        let edges = g.conditional_edges();
        let rendered: Vec<(String, String)> = edges
            .iter()
            .map(|e| (g.key(e.source).name.clone(), g.key(e.target).name.clone()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("a".to_string(), "c".to_string()),
                ("a".to_string(), "q".to_string()),
                ("z".to_string(), "y".to_string()),
            ]
        );
        assert_eq!(g.condition_keys(&edges[0]), vec![&key("w"), &key("x")]);
    }
}
