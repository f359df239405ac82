//! The coarse waypoint graph.
//!
//! Agents decide *where* to go next on a graph over named nodes. Each
//! coarse edge stores the fine-grid route between its endpoints, computed
//! once at build time on an empty map; only the route's length is used,
//! to rank candidates nearest first. Actual movement is always re-routed
//! on the live map.

use crate::diagnostic::Diagnostic;
use crate::node::Node;
use circulate_core::{CellId, Generation, NodeId, TemplateProfile};
use circulate_graph::{GraphError, ShortestPaths, WeightedGraph};
use circulate_space::FloorIndex;
use rayon::prelude::*;
use tracing::warn;

/// Generation-0 shortest-path trees, one per placed node.
#[derive(Clone, Debug)]
pub struct RouteTables {
    tables: Vec<Option<ShortestPaths<CellId>>>,
}

impl RouteTables {
    /// Run one Dijkstra per placed node on its floor's current map.
    pub fn compute(nodes: &[Node], floors: &[FloorIndex], parallel: bool) -> Self {
        let solve = |node: &Node| {
            let placement = node.placement()?;
            floors
                .get(placement.floor.index())?
                .map()
                .shortest_path_costs(placement.cell, Generation::ZERO)
                .ok()
        };
        let tables = if parallel {
            nodes.par_iter().map(solve).collect()
        } else {
            nodes.iter().map(solve).collect()
        };
        Self { tables }
    }

    /// Fine route `from → to`.
    ///
    /// `None` when the nodes are not placed on the same floor.
    pub fn route(
        &self,
        nodes: &[Node],
        from: NodeId,
        to: NodeId,
    ) -> Option<Result<Vec<CellId>, GraphError<CellId>>> {
        let a = nodes.get(from.index())?.placement()?;
        let b = nodes.get(to.index())?.placement()?;
        if a.floor != b.floor {
            return None;
        }
        let table = self.tables.get(from.index())?.as_ref()?;
        Some(table.path_to(b.cell))
    }
}

/// Graph over named nodes whose edge weights are fine-grid routes.
#[derive(Clone, Debug, Default)]
pub struct CoarseGraph {
    graph: WeightedGraph<NodeId, Vec<CellId>>,
}

impl CoarseGraph {
    fn with_placed(nodes: &[Node]) -> Self {
        let mut graph = WeightedGraph::new();
        for node in nodes.iter().filter(|n| n.placement().is_some()) {
            graph.add_node(node.id());
        }
        Self { graph }
    }

    /// Connect every ordered pair of distinct nodes sharing a floor.
    ///
    /// Unreachable pairs get no edge and a [`Diagnostic::NoPath`].
    pub fn fully_connected(nodes: &[Node], tables: &RouteTables) -> (Self, Vec<Diagnostic>) {
        let mut coarse = Self::with_placed(nodes);
        let mut diagnostics = Vec::new();
        for a in nodes {
            for b in nodes {
                if a.id() != b.id() {
                    coarse.connect(nodes, tables, a, b, false, &mut diagnostics);
                }
            }
        }
        (coarse, diagnostics)
    }

    /// Connect the node pairs listed by `templates`.
    ///
    /// Each endpoint name matches every node carrying it. An undirected
    /// template inserts both directions; a directed one only `from → to`.
    pub fn from_templates(
        templates: &[TemplateProfile],
        nodes: &[Node],
        tables: &RouteTables,
    ) -> (Self, Vec<Diagnostic>) {
        let mut coarse = Self::with_placed(nodes);
        let mut diagnostics = Vec::new();
        for template in templates {
            for (from, to) in &template.edges {
                for a in nodes.iter().filter(|n| n.carries(from)) {
                    for b in nodes.iter().filter(|n| n.carries(to)) {
                        if a.id() == b.id() {
                            continue;
                        }
                        let mirror = !template.directed;
                        coarse.connect(nodes, tables, a, b, mirror, &mut diagnostics);
                    }
                }
            }
        }
        (coarse, diagnostics)
    }

    fn connect(
        &mut self,
        nodes: &[Node],
        tables: &RouteTables,
        a: &Node,
        b: &Node,
        mirror: bool,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match tables.route(nodes, a.id(), b.id()) {
            Some(Ok(route)) => self.graph.add_edge(a.id(), b.id(), route, mirror),
            Some(Err(_)) => {
                warn!(from = a.name(), to = b.name(), "no route between nodes");
                diagnostics.push(Diagnostic::NoPath {
                    from: a.name().to_string(),
                    to: b.name().to_string(),
                });
            }
            None => {}
        }
    }

    /// Outgoing coarse edges of `node` with the hop length of each route.
    pub fn candidates(&self, node: NodeId) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.graph
            .neighbors(node)
            .map(|(n, route)| (n, route.len().saturating_sub(1)))
    }

    /// Stored fine route `from → to`, if the edge exists.
    pub fn route(&self, from: NodeId, to: NodeId) -> Option<&[CellId]> {
        self.graph.weight(from, to).map(Vec::as_slice)
    }

    /// Number of directed coarse edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every edge as `(from, to, route)`, in insertion order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, Vec<CellId>)> {
        self.graph
            .nodes()
            .flat_map(|a| {
                self.graph
                    .neighbors(a)
                    .map(move |(b, route)| (a, b, route.clone()))
            })
            .collect()
    }

    /// The underlying graph.
    pub fn graph(&self) -> &WeightedGraph<NodeId, Vec<CellId>> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Placement;
    use circulate_core::{FloorId, NodeProfile, Point2, Polygon};
    use circulate_space::SquareGrid;

    fn floor() -> FloorIndex {
        let b = Polygon::rectangle(Point2::new(0.0, 0.0), Point2::new(5.0, 3.0)).unwrap();
        FloorIndex::new("ground", b, 1.0, &SquareGrid).unwrap()
    }

    fn node(f: &FloorIndex, id: u32, name: &str, x: f64, y: f64) -> Node {
        let p = Point2::new(x, y);
        let placement = f.cell_at(&p).ok().map(|cell| Placement {
            floor: FloorId(0),
            cell,
        });
        Node::new(NodeId(id), NodeProfile::new(name), p, placement)
    }

    fn scene() -> (Vec<FloorIndex>, Vec<Node>) {
        let f = floor();
        let nodes = vec![
            node(&f, 0, "a", 0.5, 1.5),
            node(&f, 1, "b", 4.5, 1.5),
            node(&f, 2, "c", 2.5, 0.5),
            node(&f, 3, "lost", 40.0, 40.0),
        ];
        (vec![f], nodes)
    }

    #[test]
    fn fully_connected_links_every_placed_pair() {
        let (floors, nodes) = scene();
        let tables = RouteTables::compute(&nodes, &floors, false);
        let (coarse, diags) = CoarseGraph::fully_connected(&nodes, &tables);
        assert!(diags.is_empty());
        assert_eq!(coarse.edge_count(), 6);
        assert!(!coarse.graph().contains_node(NodeId(3)));
        let route = coarse.route(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(route.len(), 5);
        let hops: Vec<_> = coarse.candidates(NodeId(0)).collect();
        assert_eq!(hops, vec![(NodeId(1), 4), (NodeId(2), 2)]);
    }

    #[test]
    fn fully_connected_is_idempotent() {
        let (floors, nodes) = scene();
        let tables = RouteTables::compute(&nodes, &floors, true);
        let (first, _) = CoarseGraph::fully_connected(&nodes, &tables);
        let (second, _) = CoarseGraph::fully_connected(&nodes, &tables);
        assert_eq!(first.edges(), second.edges());
        let serial = RouteTables::compute(&nodes, &floors, false);
        let (third, _) = CoarseGraph::fully_connected(&nodes, &serial);
        assert_eq!(first.edges(), third.edges());
    }

    #[test]
    fn directed_templates_insert_one_direction() {
        let (floors, nodes) = scene();
        let tables = RouteTables::compute(&nodes, &floors, false);
        let directed = TemplateProfile {
            edges: vec![("a".into(), "b".into())],
            directed: true,
        };
        let (coarse, _) = CoarseGraph::from_templates(&[directed], &nodes, &tables);
        assert!(coarse.route(NodeId(0), NodeId(1)).is_some());
        assert!(coarse.route(NodeId(1), NodeId(0)).is_none());

        let undirected = TemplateProfile {
            edges: vec![("a".into(), "b".into())],
            directed: false,
        };
        let (coarse, _) = CoarseGraph::from_templates(&[undirected], &nodes, &tables);
        assert!(coarse.route(NodeId(1), NodeId(0)).is_some());
        assert_eq!(coarse.edge_count(), 2);
    }

    #[test]
    fn blocked_pairs_are_diagnosed() {
        let (mut floors, nodes) = scene();
        let wall = Polygon::rectangle(Point2::new(3.0, 0.0), Point2::new(4.0, 3.0)).unwrap();
        floors[0].mark_barrier(&wall);
        let tables = RouteTables::compute(&nodes, &floors, false);
        let (coarse, diags) = CoarseGraph::fully_connected(&nodes, &tables);
        // b is cut off from a and c in both directions.
        assert_eq!(diags.len(), 4);
        assert!(diags.contains(&Diagnostic::NoPath {
            from: "a".into(),
            to: "b".into()
        }));
        assert_eq!(coarse.edge_count(), 2);
    }
}
