//! Ordered directed graph.
//!
//! Edges point from a node to the nodes it depends on. Ordered maps keep
//! every traversal deterministic.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A directed graph mapping each node to the set of nodes it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Digraph<N: Ord> {
    edges: BTreeMap<N, BTreeSet<N>>,
}

impl<N: Ord> Default for Digraph<N> {
    fn default() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }
}

impl<N: Ord + Clone> Digraph<N> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without edges. Existing edges are kept.
    pub fn add_node(&mut self, node: N) {
        self.edges.entry(node).or_default();
    }

    /// Adds an edge meaning `from` depends on `to`. Both nodes are added.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.add_node(to.clone());
        self.edges.entry(from).or_default().insert(to);
    }

    /// Returns true if `from` directly depends on `to`.
    #[must_use]
    pub fn has_edge(&self, from: &N, to: &N) -> bool {
        self.edges.get(from).is_some_and(|deps| deps.contains(to))
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.edges.contains_key(node)
    }

    /// Direct dependencies of a node.
    #[must_use]
    pub fn dependencies(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.edges.get(node)
    }

    /// Iterates nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.keys()
    }

    /// Iterates nodes with their dependency sets in order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &BTreeSet<N>)> {
        self.edges.iter()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Computes the transitive closure by fixed-point expansion: each node's
    /// set is repeatedly unioned with its dependencies' sets until stable.
    #[must_use]
    pub fn transitive_closure(&self) -> Self {
        let mut closure = self.edges.clone();
        loop {
            let mut changed = false;
            let nodes: Vec<N> = closure.keys().cloned().collect();
            for node in &nodes {
                let current = closure.get(node).cloned().unwrap_or_default();
                let mut expanded = current.clone();
                for dep in &current {
                    if let Some(transitive) = closure.get(dep) {
                        expanded.extend(transitive.iter().cloned());
                    }
                }
                if expanded.len() != current.len() {
                    closure.insert(node.clone(), expanded);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Self { edges: closure }
    }

    /// Returns the graph with every edge reversed.
    #[must_use]
    pub fn invert(&self) -> Self {
        let mut inverted = Self::new();
        for (node, deps) in &self.edges {
            inverted.add_node(node.clone());
            for dep in deps {
                inverted.add_edge(dep.clone(), node.clone());
            }
        }
        inverted
    }

    /// Groups the nodes that lie on cycles. Each group is one strongly
    /// connected set of mutually reachable nodes, sorted.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<N>> {
        let closure = self.transitive_closure();
        let reaches = |from: &N, to: &N| closure.has_edge(from, to);

        let mut grouped: BTreeSet<N> = BTreeSet::new();
        let mut cycles = Vec::new();
        for node in closure.nodes() {
            if grouped.contains(node) || !reaches(node, node) {
                continue;
            }
            let mut members: Vec<N> = closure
                .dependencies(node)
                .into_iter()
                .flatten()
                .filter(|other| reaches(other, node))
                .cloned()
                .collect();
            members.sort();
            grouped.extend(members.iter().cloned());
            cycles.push(members);
        }
        cycles
    }

    /// Removes every edge implied by a longer path. An edge `a -> d` is
    /// dropped only when another dependency of `a` reaches `d` without
    /// passing back through `a`, so reachability is preserved even when the
    /// graph has cycles.
    #[must_use]
    pub fn transitive_reduction(&self) -> Self {
        let closure = self.transitive_closure();
        let reaches = |from: &N, to: &N| closure.has_edge(from, to);

        let mut reduced = Self::new();
        for (node, deps) in &self.edges {
            reduced.add_node(node.clone());
            for dep in deps {
                let redundant = dep != node
                    && deps.iter().any(|other| {
                        other != dep
                            && other != node
                            && !reaches(other, node)
                            && reaches(other, dep)
                            && !reaches(dep, other)
                    });
                if !redundant {
                    reduced.add_edge(node.clone(), dep.clone());
                }
            }
        }
        reduced
    }
}

impl<N: Ord + Clone> FromIterator<(N, N)> for Digraph<N> {
    fn from_iter<I: IntoIterator<Item = (N, N)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (from, to) in iter {
            graph.add_edge(from, to);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&'static str, &'static str)]) -> Digraph<&'static str> {
        edges.iter().copied().collect()
    }

    #[test]
    fn test_closure_of_chain() {
        let closure = graph(&[("a", "b"), ("b", "c"), ("c", "d")]).transitive_closure();
        assert!(closure.has_edge(&"a", &"d"));
        assert!(closure.has_edge(&"b", &"d"));
        assert!(!closure.has_edge(&"d", &"a"));
        assert_eq!(closure.edge_count(), 6);
    }

    #[test]
    fn test_cycles_grouped() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("x", "y"), ("y", "x"), ("z", "a")]);
        let cycles = g.cycles();
        assert_eq!(cycles, vec![vec!["a", "b", "c"], vec!["x", "y"]]);
    }

    #[test]
    fn test_acyclic_has_no_cycles() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(g.cycles().is_empty());
    }

    #[test]
    fn test_reduction_removes_implied_edges() {
        let g = graph(&[("a", "b"), ("a", "c"), ("a", "d"), ("b", "c"), ("c", "d")]);
        let reduced = g.transitive_reduction();
        assert!(reduced.has_edge(&"a", &"b"));
        assert!(!reduced.has_edge(&"a", &"c"));
        assert!(!reduced.has_edge(&"a", &"d"));
        assert_eq!(reduced.edge_count(), 3);
        assert_eq!(reduced.transitive_closure(), g.transitive_closure());
    }

    #[test]
    fn test_reduction_preserves_reachability_through_cycles() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "a")]);
        let reduced = g.transitive_reduction();
        assert!(reduced.has_edge(&"a", &"c"));
        assert_eq!(reduced.transitive_closure(), g.transitive_closure());
    }

    #[test]
    fn test_invert() {
        let inverted = graph(&[("a", "b"), ("c", "b")]).invert();
        assert!(inverted.has_edge(&"b", &"a"));
        assert!(inverted.has_edge(&"b", &"c"));
        assert_eq!(inverted.len(), 3);
    }
}
