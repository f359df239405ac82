//! Adjacency storage and bounded searches.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;

/// Result of a bounded search: every node reached, mapped to the depth at
/// which it satisfied the predicate, or `None` if it was visited without
/// matching.
pub type SearchResult<N> = IndexMap<N, Option<usize>>;

/// A directed graph with per-edge weights.
///
/// Nodes and edges iterate in insertion order, which fixes the tie-break
/// order of every search.
#[derive(Clone, Debug)]
pub struct WeightedGraph<N, W> {
    adjacency: IndexMap<N, IndexMap<N, W>>,
}

impl<N, W> Default for WeightedGraph<N, W> {
    fn default() -> Self {
        Self {
            adjacency: IndexMap::new(),
        }
    }
}

impl<N: Copy + Eq + Hash, W> WeightedGraph<N, W> {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node`. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: N) -> bool {
        match self.adjacency.entry(node) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(IndexMap::new());
                true
            }
        }
    }

    /// Insert the edge `from → to`, adding either endpoint if missing.
    ///
    /// With `mirror` set, `to → from` is inserted with the same weight.
    /// Re-adding an existing edge replaces its weight.
    pub fn add_edge(&mut self, from: N, to: N, weight: W, mirror: bool)
    where
        W: Clone,
    {
        self.add_node(from);
        self.add_node(to);
        if mirror {
            if let Some(out) = self.adjacency.get_mut(&to) {
                out.insert(from, weight.clone());
            }
        }
        if let Some(out) = self.adjacency.get_mut(&from) {
            out.insert(to, weight);
        }
    }

    /// Whether `node` is present.
    pub fn contains_node(&self, node: N) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.adjacency.keys().copied()
    }

    /// Insertion position of `node`.
    pub fn node_index(&self, node: N) -> Option<usize> {
        self.adjacency.get_index_of(&node)
    }

    pub(crate) fn adjacency_at(&self, index: usize) -> Option<(&N, &IndexMap<N, W>)> {
        self.adjacency.get_index(index)
    }

    /// Outgoing edges of `node` with their weights. Empty for unknown nodes.
    pub fn neighbors(&self, node: N) -> impl Iterator<Item = (N, &W)> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|out| out.iter().map(|(n, w)| (*n, w)))
    }

    /// Number of outgoing edges of `node`.
    pub fn out_degree(&self, node: N) -> usize {
        self.adjacency.get(&node).map_or(0, IndexMap::len)
    }

    /// Weight of `from → to`, if the edge exists.
    pub fn weight(&self, from: N, to: N) -> Option<&W> {
        self.adjacency.get(&from)?.get(&to)
    }

    /// Depth-first search from `seed`.
    ///
    /// A node that satisfies `predicate` is recorded with its depth and not
    /// expanded further; others are expanded until `max_depth`. Nodes
    /// already visited along any branch are not revisited.
    pub fn depth_search<F>(&self, seed: N, max_depth: usize, predicate: F) -> SearchResult<N>
    where
        F: Fn(N) -> bool,
    {
        let mut visited = SearchResult::new();
        if self.contains_node(seed) {
            self.depth_visit(seed, 0, max_depth, &predicate, &mut visited);
        }
        visited
    }

    fn depth_visit<F>(
        &self,
        node: N,
        depth: usize,
        max_depth: usize,
        predicate: &F,
        visited: &mut SearchResult<N>,
    ) where
        F: Fn(N) -> bool,
    {
        if predicate(node) {
            visited.insert(node, Some(depth));
            return;
        }
        visited.insert(node, None);
        if depth >= max_depth {
            return;
        }
        for (next, _) in self.neighbors(node) {
            if !visited.contains_key(&next) {
                self.depth_visit(next, depth + 1, max_depth, predicate, visited);
            }
        }
    }

    /// Breadth-first search expanding whole frontiers from `seeds`.
    ///
    /// Every node of a frontier is tested; as soon as any node of the
    /// frontier at depth `d` satisfies `predicate` the search stops, with
    /// all matches of that frontier recorded as `Some(d)`. Otherwise the
    /// next frontier is the set of unvisited neighbours, until `max_depth`
    /// or exhaustion.
    pub fn frontier_search<F>(&self, seeds: &[N], max_depth: usize, predicate: F) -> SearchResult<N>
    where
        F: Fn(N) -> bool,
    {
        let mut visited = SearchResult::new();
        let mut frontier: IndexSet<N> = seeds
            .iter()
            .copied()
            .filter(|n| self.contains_node(*n))
            .collect();
        let mut depth = 0;
        while !frontier.is_empty() {
            let mut matched = false;
            for &node in &frontier {
                let hit = predicate(node);
                matched |= hit;
                visited.insert(node, hit.then_some(depth));
            }
            if matched || depth >= max_depth {
                break;
            }
            let mut next = IndexSet::new();
            for &node in &frontier {
                for (n, _) in self.neighbors(node) {
                    if !visited.contains_key(&n) {
                        next.insert(n);
                    }
                }
            }
            frontier = next;
            depth += 1;
        }
        visited
    }

    /// Smallest matching depth in a search result.
    pub fn nearest_match(result: &SearchResult<N>) -> Option<usize> {
        result.values().flatten().copied().min()
    }
}
