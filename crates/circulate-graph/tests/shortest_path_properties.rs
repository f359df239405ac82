use circulate_core::Generation;
use circulate_graph::{reconstruct_path, EdgeCost, WeightedGraph};
use proptest::prelude::*;

/// Static weight plus a per-generation surcharge on odd nodes.
struct Pulsing<'a> {
    graph: &'a WeightedGraph<u32, f64>,
}

impl EdgeCost<u32> for Pulsing<'_> {
    fn edge_cost(&self, from: u32, to: u32, generation: Generation) -> f64 {
        let base = self.graph.edge_cost(from, to, generation);
        if to % 2 == 1 {
            base + (generation.0 % 3) as f64
        } else {
            base
        }
    }
}

fn arb_graph() -> impl Strategy<Value = WeightedGraph<u32, f64>> {
    (2u32..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n, 0.1f64..10.0, any::<bool>()), 1..40).prop_map(
            move |edges| {
                let mut g = WeightedGraph::new();
                for i in 0..n {
                    g.add_node(i);
                }
                for (a, b, w, mirror) in edges {
                    if a != b {
                        g.add_edge(a, b, w, mirror);
                    }
                }
                g
            },
        )
    })
}

proptest! {
    #[test]
    fn reconstructed_paths_run_source_to_goal_with_rising_cost(
        g in arb_graph(),
        start in 0u32..6,
    ) {
        let cost = Pulsing { graph: &g };
        let paths = g.shortest_path_costs(0, Generation(start), None, &cost).unwrap();
        for goal in g.nodes() {
            match reconstruct_path(0, goal, paths.predecessors()) {
                Ok(route) => {
                    prop_assert_eq!(route.first().copied(), Some(0));
                    prop_assert_eq!(route.last().copied(), Some(goal));
                    prop_assert_eq!(paths.hops(goal), Some(route.len() - 1));
                    let mut previous = 0.0;
                    for node in &route {
                        let c = paths.cost(*node).unwrap();
                        prop_assert!(c >= previous);
                        previous = c;
                    }
                }
                Err(_) => prop_assert!(paths.cost(goal).is_none()),
            }
        }
    }

    #[test]
    fn static_costs_match_exhaustive_relaxation(g in arb_graph()) {
        // Bellman-Ford over the same weights as an independent oracle.
        let n = g.node_count();
        let mut dist = vec![f64::INFINITY; n];
        dist[0] = 0.0;
        for _ in 0..n {
            for u in g.nodes() {
                for (v, w) in g.neighbors(u) {
                    let d = dist[u as usize] + w;
                    if d < dist[v as usize] {
                        dist[v as usize] = d;
                    }
                }
            }
        }
        let paths = g.shortest_path_costs(0, Generation::ZERO, None, &g).unwrap();
        for v in g.nodes() {
            match paths.cost(v) {
                Some(c) => prop_assert!((c - dist[v as usize]).abs() < 1e-9),
                None => prop_assert!(dist[v as usize].is_infinite()),
            }
        }
    }
}
