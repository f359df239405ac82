//! Generation-aware shortest paths.
//!
//! Edge costs are not fixed: each traversal of `u → v` is priced by an
//! [`EdgeCost`] at the generation the walker would arrive at `v`. A walker
//! leaving the source at generation `start` reaches a node `h` hops away at
//! `start + h`, so the same physical edge may cost differently on
//! different routes. The search is a label-setting Dijkstra over this
//! time-expanded view; every node keeps the single label with the lowest
//! cost found, together with its hop count.

use crate::error::GraphError;
use crate::graph::WeightedGraph;
use circulate_core::Generation;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

/// Prices an edge traversal at a given generation.
pub trait EdgeCost<N> {
    /// Cost of moving `from → to`, arriving at `to` at `generation`.
    ///
    /// Return `f64::INFINITY` for an impassable edge; such edges are never
    /// relaxed.
    fn edge_cost(&self, from: N, to: N, generation: Generation) -> f64;
}

impl<N: Copy + Eq + Hash> EdgeCost<N> for WeightedGraph<N, f64> {
    fn edge_cost(&self, from: N, to: N, _generation: Generation) -> f64 {
        self.weight(from, to).copied().unwrap_or(f64::INFINITY)
    }
}

/// Output of [`WeightedGraph::shortest_path_costs`].
#[derive(Clone, Debug)]
pub struct ShortestPaths<N> {
    source: N,
    start: Generation,
    costs: IndexMap<N, f64>,
    hops: IndexMap<N, usize>,
    predecessors: IndexMap<N, N>,
}

impl<N: Copy + Eq + Hash> ShortestPaths<N> {
    /// The search source.
    pub fn source(&self) -> N {
        self.source
    }

    /// Generation at which the walker leaves the source.
    pub fn start(&self) -> Generation {
        self.start
    }

    /// Cumulative cost of the best route to `node`, if reached.
    pub fn cost(&self, node: N) -> Option<f64> {
        self.costs.get(&node).copied()
    }

    /// Hop count of the best route to `node`, if reached.
    pub fn hops(&self, node: N) -> Option<usize> {
        self.hops.get(&node).copied()
    }

    /// Every reached node with its cumulative cost.
    pub fn costs(&self) -> &IndexMap<N, f64> {
        &self.costs
    }

    /// Predecessor links of the shortest-path tree.
    pub fn predecessors(&self) -> &IndexMap<N, N> {
        &self.predecessors
    }

    /// Route from the source to `goal`.
    pub fn path_to(&self, goal: N) -> Result<Vec<N>, GraphError<N>> {
        reconstruct_path(self.source, goal, &self.predecessors)
    }
}

/// Walk predecessor links from `goal` back to `source` and return the
/// route in travel order, `source` first.
///
/// Fails with [`GraphError::NoPath`] if the chain from `goal` does not
/// lead back to `source`.
pub fn reconstruct_path<N: Copy + Eq + Hash>(
    source: N,
    goal: N,
    predecessors: &IndexMap<N, N>,
) -> Result<Vec<N>, GraphError<N>> {
    let mut route = vec![goal];
    let mut current = goal;
    while current != source {
        match predecessors.get(&current) {
            // A chain longer than the tree means a malformed predecessor map.
            Some(&prev) if route.len() <= predecessors.len() => {
                route.push(prev);
                current = prev;
            }
            _ => {
                return Err(GraphError::NoPath {
                    from: source,
                    to: goal,
                })
            }
        }
    }
    route.reverse();
    Ok(route)
}

/// Min-heap entry ordered by cost, then by node insertion index.
#[derive(Debug)]
struct Frontier {
    cost: f64,
    order: usize,
    hops: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl<N: Copy + Eq + Hash, W> WeightedGraph<N, W> {
    /// Single-source Dijkstra from `source`, leaving at generation `start`.
    ///
    /// The edge `u → v` is priced by `cost` at generation
    /// `start + hops(u) + 1`, where `hops(u)` is the length of the best
    /// route found to `u`. When `goal` is given the search stops as soon as
    /// the goal is settled. Ties are broken by node insertion order.
    pub fn shortest_path_costs<C>(
        &self,
        source: N,
        start: Generation,
        goal: Option<N>,
        cost: &C,
    ) -> Result<ShortestPaths<N>, GraphError<N>>
    where
        C: EdgeCost<N> + ?Sized,
    {
        let source_order = self
            .node_index(source)
            .ok_or(GraphError::UnknownNode { node: source })?;

        let n = self.node_count();
        let mut best = vec![f64::INFINITY; n];
        let mut settled = vec![false; n];
        let mut paths = ShortestPaths {
            source,
            start,
            costs: IndexMap::new(),
            hops: IndexMap::new(),
            predecessors: IndexMap::new(),
        };

        best[source_order] = 0.0;
        paths.costs.insert(source, 0.0);
        paths.hops.insert(source, 0);

        let mut heap = BinaryHeap::new();
        heap.push(Frontier {
            cost: 0.0,
            order: source_order,
            hops: 0,
        });

        while let Some(Frontier { cost: d, order, hops }) = heap.pop() {
            if settled[order] {
                continue;
            }
            settled[order] = true;
            let Some((&node, out)) = self.adjacency_at(order) else {
                continue;
            };
            if goal == Some(node) {
                break;
            }
            let arrival = start.after(hops + 1);
            for &next in out.keys() {
                let Some(next_order) = self.node_index(next) else {
                    continue;
                };
                if settled[next_order] {
                    continue;
                }
                let step = cost.edge_cost(node, next, arrival);
                if !step.is_finite() {
                    continue;
                }
                let total = d + step;
                if total < best[next_order] {
                    best[next_order] = total;
                    paths.costs.insert(next, total);
                    paths.hops.insert(next, hops + 1);
                    paths.predecessors.insert(next, node);
                    heap.push(Frontier {
                        cost: total,
                        order: next_order,
                        hops: hops + 1,
                    });
                }
            }
        }
        Ok(paths)
    }

    /// Shortest route `source → goal` leaving at generation `start`.
    pub fn shortest_path<C>(
        &self,
        source: N,
        goal: N,
        start: Generation,
        cost: &C,
    ) -> Result<Vec<N>, GraphError<N>>
    where
        C: EdgeCost<N> + ?Sized,
    {
        if !self.contains_node(goal) {
            return Err(GraphError::UnknownNode { node: goal });
        }
        self.shortest_path_costs(source, start, Some(goal), cost)?
            .path_to(goal)
    }
}
