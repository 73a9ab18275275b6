//! Conditional activation: fixed-point reachability over the module graph.
//!
//! Roots and everything they reach through direct edges are compile scope.
//! A conditional edge fires once its source and all of its conditions are
//! active; its target, and whatever that target reaches only through
//! direct edges, is runtime scope. Passes repeat until one adds nothing.
//! The active set only grows, so the number of passes is bounded by the
//! module count plus the final, empty pass.
//!
//! Once the set is settled, every artifact excluded by an active module is
//! removed from both scopes. Exclusions do not take part in the passes.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use condor_core::artifact::ArtifactKey;
use petgraph::graph::NodeIndex;

use crate::error::{Provider, ResolveError, ResolveResult};
use crate::graph::{ConditionalEdge, ModuleGraph};

/// Classpath scope of an active module. `Compile` dominates `Runtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Runtime,
    Compile,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Runtime => f.write_str("runtime"),
            Scope::Compile => f.write_str("compile"),
        }
    }
}

/// Why a module is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Declared directly by the application.
    Root,
    /// Direct dependency of an active module.
    Direct { parent: ArtifactKey },
    /// Target of a conditional edge whose conditions were all active.
    Conditional {
        source: ArtifactKey,
        conditions: Vec<ArtifactKey>,
    },
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Root => f.write_str("root"),
            Activation::Direct { parent } => write!(f, "required by {parent}"),
            Activation::Conditional { source, conditions } if conditions.is_empty() => {
                write!(f, "enabled by {source}")
            }
            Activation::Conditional { source, conditions } => {
                let conditions: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
                write!(f, "enabled by {source} (conditions: {})", conditions.join(", "))
            }
        }
    }
}

/// The outcome of activation: disjoint compile and runtime sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGraph {
    compile: BTreeSet<ArtifactKey>,
    runtime: BTreeSet<ArtifactKey>,
    /// Provenance of every module reached, excluded ones included.
    activations: BTreeMap<ArtifactKey, Activation>,
    /// Excluded key to the smallest active module excluding it.
    excluded: BTreeMap<ArtifactKey, ArtifactKey>,
    capabilities: BTreeMap<String, Provider>,
    passes: usize,
}

impl ResolvedGraph {
    pub fn compile_scope(&self) -> &BTreeSet<ArtifactKey> {
        &self.compile
    }

    pub fn runtime_scope(&self) -> &BTreeSet<ArtifactKey> {
        &self.runtime
    }

    pub fn scope_of(&self, key: &ArtifactKey) -> Option<Scope> {
        if self.compile.contains(key) {
            Some(Scope::Compile)
        } else if self.runtime.contains(key) {
            Some(Scope::Runtime)
        } else {
            None
        }
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.compile.contains(key) || self.runtime.contains(key)
    }

    pub fn activation(&self, key: &ArtifactKey) -> Option<&Activation> {
        if !self.contains(key) {
            return None;
        }
        self.activations.get(key)
    }

    /// The active module that excluded `key`, if it was reached and excluded.
    pub fn excluded_by(&self, key: &ArtifactKey) -> Option<&ArtifactKey> {
        self.excluded.get(key)
    }

    /// Excluded keys with their excluding module, in key order.
    pub fn exclusions(&self) -> impl Iterator<Item = (&ArtifactKey, &ArtifactKey)> {
        self.excluded.iter()
    }

    /// The activation chain from a root down to `key`, root first.
    ///
    /// Conditional steps name the edge's source as the predecessor. The chain
    /// may pass through excluded modules.
    pub fn explain(&self, key: &ArtifactKey) -> Option<Vec<(&ArtifactKey, &Activation)>> {
        if !self.contains(key) {
            return None;
        }
        let mut path = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = key;
        loop {
            let (k, activation) = self.activations.get_key_value(current)?;
            if !seen.insert(k) {
                break;
            }
            path.push((k, activation));
            current = match activation {
                Activation::Root => break,
                Activation::Direct { parent } => parent,
                Activation::Conditional { source, .. } => source,
            };
        }
        path.reverse();
        Some(path)
    }

    /// The provider of `capability`, if that provider is active.
    pub fn capability_provider(&self, capability: &str) -> Option<&Provider> {
        self.capabilities.get(capability)
    }

    /// Capabilities present in the resolved set, by name.
    pub fn capabilities(&self) -> impl Iterator<Item = (&str, &Provider)> {
        self.capabilities.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Number of fixed-point passes the resolution took, including the final
    /// pass that found nothing new.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Every active module with its scope, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactKey, Scope)> {
        self.activations
            .keys()
            .filter_map(|k| self.scope_of(k).map(|scope| (k, scope)))
    }

    pub fn len(&self) -> usize {
        self.compile.len() + self.runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compile.is_empty() && self.runtime.is_empty()
    }
}

impl fmt::Display for ResolvedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() && self.excluded.is_empty() {
            return writeln!(f, "No modules activated.");
        }
        for (label, keys) in [("[compile]", &self.compile), ("[runtime]", &self.runtime)] {
            if keys.is_empty() {
                continue;
            }
            writeln!(f, "{label}")?;
            for key in keys {
                writeln!(f, "  {key}")?;
            }
        }
        if !self.excluded.is_empty() {
            writeln!(f, "[excluded]")?;
            for (key, by) in &self.excluded {
                writeln!(f, "  {key} (by {by})")?;
            }
        }
        Ok(())
    }
}

/// Resolve the active module set reachable from `roots`.
///
/// Roots that are not in the graph are treated as leaf modules.
pub fn resolve(graph: &ModuleGraph, roots: &[ArtifactKey]) -> ResolveResult<ResolvedGraph> {
    resolve_bounded(graph, roots, graph.len() + 1)
}

fn resolve_bounded(
    graph: &ModuleGraph,
    roots: &[ArtifactKey],
    bound: usize,
) -> ResolveResult<ResolvedGraph> {
    let roots: BTreeSet<&ArtifactKey> = roots.iter().collect();
    let mut active = ActiveSet::new(graph);
    let mut external_roots = BTreeSet::new();

    let mut seeds = VecDeque::new();
    for root in &roots {
        match graph.find(root) {
            Some(idx) => {
                active.raise(idx, Scope::Compile, Activation::Root);
                seeds.push_back((idx, Scope::Compile));
            }
            None => {
                tracing::debug!("root {root} is not a declared module, treating it as a leaf");
                external_roots.insert((*root).clone());
            }
        }
    }
    active.close(seeds);

    let edges = graph.conditional_edges();
    let mut passes = 0;
    loop {
        passes += 1;
        if passes > bound {
            return Err(ResolveError::InternalInvariantViolation { passes, bound });
        }
        let activated = active.fire_conditional_edges(&edges);
        tracing::debug!("activation pass {passes}: {activated} conditional edge(s) fired");
        if activated == 0 {
            break;
        }
    }

    let resolved = active.finish(external_roots, passes);
    tracing::info!(
        "resolved {} modules ({} compile, {} runtime, {} excluded) in {} passes",
        resolved.len(),
        resolved.compile.len(),
        resolved.runtime.len(),
        resolved.excluded.len(),
        passes
    );
    Ok(resolved)
}

/// Working state for one resolution: scope and provenance per node.
struct ActiveSet<'g> {
    graph: &'g ModuleGraph,
    scopes: Vec<Option<Scope>>,
    activations: Vec<Option<Activation>>,
}

impl<'g> ActiveSet<'g> {
    fn new(graph: &'g ModuleGraph) -> Self {
        Self {
            graph,
            scopes: vec![None; graph.len()],
            activations: vec![None; graph.len()],
        }
    }

    fn is_active(&self, idx: NodeIndex) -> bool {
        self.scopes[idx.index()].is_some()
    }

    /// Activate `idx` at `scope`, or promote it. Never demotes.
    /// Returns whether anything changed.
    fn raise(&mut self, idx: NodeIndex, scope: Scope, activation: Activation) -> bool {
        if let Some(existing) = self.scopes[idx.index()] {
            if existing >= scope {
                return false;
            }
        }
        self.scopes[idx.index()] = Some(scope);
        self.activations[idx.index()] = Some(activation);
        true
    }

    /// Breadth-first closure under direct edges, carrying each seed's scope.
    fn close(&mut self, mut queue: VecDeque<(NodeIndex, Scope)>) {
        while let Some((current, scope)) = queue.pop_front() {
            for dep in self.graph.direct_dependencies(current) {
                let activation = Activation::Direct {
                    parent: self.graph.key(current).clone(),
                };
                if self.raise(dep, scope, activation) {
                    queue.push_back((dep, scope));
                }
            }
        }
    }

    /// One pass over all conditional edges. Edges see activations made
    /// earlier in the same pass. Returns how many edges fired.
    fn fire_conditional_edges(&mut self, edges: &[ConditionalEdge]) -> usize {
        let mut fired = 0;
        for edge in edges {
            if !self.is_active(edge.source) || self.is_active(edge.target) {
                continue;
            }
            if !edge.conditions.iter().all(|c| self.is_active(*c)) {
                continue;
            }
            let source = self.graph.key(edge.source).clone();
            let conditions: Vec<ArtifactKey> = self
                .graph
                .condition_keys(edge)
                .into_iter()
                .cloned()
                .collect();
            tracing::debug!(
                "{} -> {} activated (conditions satisfied)",
                source,
                self.graph.key(edge.target)
            );
            self.raise(
                edge.target,
                Scope::Runtime,
                Activation::Conditional { source, conditions },
            );
            self.close(VecDeque::from([(edge.target, Scope::Runtime)]));
            fired += 1;
        }
        fired
    }

    fn finish(self, external_roots: BTreeSet<ArtifactKey>, passes: usize) -> ResolvedGraph {
        let mut compile = BTreeSet::new();
        let mut runtime = BTreeSet::new();
        let mut activations = BTreeMap::new();
        let mut excluders = Vec::new();

        for (i, (scope, activation)) in self
            .scopes
            .into_iter()
            .zip(self.activations)
            .enumerate()
        {
            let (Some(scope), Some(activation)) = (scope, activation) else {
                continue;
            };
            let idx = NodeIndex::new(i);
            let key = self.graph.key(idx).clone();
            if !self.graph.exclusions(idx).is_empty() {
                excluders.push((key.clone(), self.graph.exclusions(idx)));
            }
            match scope {
                Scope::Compile => compile.insert(key.clone()),
                Scope::Runtime => runtime.insert(key.clone()),
            };
            activations.insert(key, activation);
        }
        for root in external_roots {
            compile.insert(root.clone());
            activations.insert(root, Activation::Root);
        }

        excluders.sort_by(|a, b| a.0.cmp(&b.0));
        let mut excluded = BTreeMap::new();
        for (excluder, keys) in excluders {
            for key in keys {
                if compile.remove(key) || runtime.remove(key) {
                    tracing::debug!("{key} excluded by {excluder}");
                    excluded.insert(key.clone(), excluder.clone());
                }
            }
        }

        let capabilities = self
            .graph
            .capabilities()
            .iter()
            .filter(|(_, provider)| {
                compile.contains(&provider.key) || runtime.contains(&provider.key)
            })
            .map(|(name, provider)| (name.to_string(), provider.clone()))
            .collect();

        ResolvedGraph {
            compile,
            runtime,
            activations,
            excluded,
            capabilities,
            passes,
        }
    }
}
