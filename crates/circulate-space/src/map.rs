//! The fine routing graph of one floor and its per-cell state.
//!
//! [`SpatialMap`] binds a [`WeightedGraph`] over cells to three per-cell
//! quantities:
//!
//! - a static barrier weight (`0` by default, `+∞` for impassable cells,
//!   a small repulsion near walls once the barrier field is built);
//! - a generation-indexed **density** counter, the number of agents that
//!   have reserved the cell for that generation;
//! - a generation-indexed **occupancy** counter, the number of agents that
//!   have actually been positioned on the cell at that generation.
//!
//! The traversal cost of `u → v` arriving at generation `g` is
//! `base(u, v) + barrier(v) + density(v, g)`.

use crate::error::SpaceError;
use circulate_core::{CellId, Generation};
use circulate_graph::{EdgeCost, GraphError, ShortestPaths, WeightedGraph};

/// Per-generation per-cell counters, grown on demand.
#[derive(Clone, Debug, Default)]
struct GenerationCounters {
    cells: usize,
    layers: Vec<Vec<u32>>,
}

impl GenerationCounters {
    fn new(cells: usize) -> Self {
        Self {
            cells,
            layers: Vec::new(),
        }
    }

    fn get(&self, cell: CellId, generation: Generation) -> u32 {
        self.layers
            .get(generation.index())
            .and_then(|layer| layer.get(cell.index()))
            .copied()
            .unwrap_or(0)
    }

    fn increment(&mut self, cell: CellId, generation: Generation) {
        let g = generation.index();
        if self.layers.len() <= g {
            let cells = self.cells;
            self.layers.resize_with(g + 1, || vec![0; cells]);
        }
        self.layers[g][cell.index()] += 1;
    }

    fn decrement(&mut self, cell: CellId, generation: Generation) -> Result<(), SpaceError> {
        match self
            .layers
            .get_mut(generation.index())
            .and_then(|layer| layer.get_mut(cell.index()))
        {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            _ => Err(SpaceError::ReservationUnderflow { cell, generation }),
        }
    }

    fn layer(&self, generation: Generation) -> Vec<u32> {
        self.layers
            .get(generation.index())
            .cloned()
            .unwrap_or_else(|| vec![0; self.cells])
    }

    fn totals(&self) -> Vec<u64> {
        let mut out = vec![0u64; self.cells];
        for layer in &self.layers {
            for (sum, &v) in out.iter_mut().zip(layer) {
                *sum += u64::from(v);
            }
        }
        out
    }

    fn sum(&self) -> u64 {
        self.layers.iter().flatten().map(|&v| u64::from(v)).sum()
    }
}

/// Fine routing graph of one floor.
#[derive(Clone, Debug)]
pub struct SpatialMap {
    graph: WeightedGraph<CellId, f64>,
    barrier: Vec<f64>,
    density: GenerationCounters,
    occupancy: GenerationCounters,
}

impl SpatialMap {
    /// Build a map over `cell_count` cells from an undirected adjacency
    /// list. Cells are inserted in id order, so graph order equals id order.
    pub fn new(cell_count: usize, adjacency: &[(CellId, CellId, f64)]) -> Self {
        let mut graph = WeightedGraph::new();
        for i in 0..cell_count {
            graph.add_node(CellId(i as u32));
        }
        for &(a, b, w) in adjacency {
            graph.add_edge(a, b, w, true);
        }
        Self {
            graph,
            barrier: vec![0.0; cell_count],
            density: GenerationCounters::new(cell_count),
            occupancy: GenerationCounters::new(cell_count),
        }
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.barrier.len()
    }

    /// The underlying cell graph with base distances.
    pub fn graph(&self) -> &WeightedGraph<CellId, f64> {
        &self.graph
    }

    fn check(&self, cell: CellId) -> Result<(), SpaceError> {
        if cell.index() < self.cell_count() {
            Ok(())
        } else {
            Err(SpaceError::CellOutOfRange {
                cell,
                cells: self.cell_count(),
            })
        }
    }

    // ── Barrier field ───────────────────────────────────────────

    /// Static barrier weight of `cell` (`0` for unknown cells).
    pub fn barrier(&self, cell: CellId) -> f64 {
        self.barrier.get(cell.index()).copied().unwrap_or(0.0)
    }

    /// Whether `cell` is impassable.
    pub fn is_blocked(&self, cell: CellId) -> bool {
        self.barrier(cell) == f64::INFINITY
    }

    /// Accumulate `weight` into the barrier weight of `cell`.
    pub fn add_barrier(&mut self, cell: CellId, weight: f64) -> Result<(), SpaceError> {
        self.check(cell)?;
        self.barrier[cell.index()] += weight;
        Ok(())
    }

    /// Accumulate one weight per cell, in cell order.
    ///
    /// Blocked cells stay blocked; weights past the last cell are ignored.
    pub fn soften(&mut self, weights: &[f64]) {
        for (barrier, &w) in self.barrier.iter_mut().zip(weights) {
            *barrier += w;
        }
    }

    /// Mark `cell` impassable.
    pub fn block(&mut self, cell: CellId) -> Result<(), SpaceError> {
        self.check(cell)?;
        self.barrier[cell.index()] = f64::INFINITY;
        Ok(())
    }

    /// Per-cell barrier weights in cell order.
    pub fn barrier_field(&self) -> &[f64] {
        &self.barrier
    }

    // ── Density and occupancy ───────────────────────────────────

    /// Reservations on `cell` at `generation`.
    pub fn density(&self, cell: CellId, generation: Generation) -> u32 {
        self.density.get(cell, generation)
    }

    /// Agents positioned on `cell` at `generation`.
    pub fn occupancy(&self, cell: CellId, generation: Generation) -> u32 {
        self.occupancy.get(cell, generation)
    }

    /// Reserve `cell` for one agent at `generation`.
    pub fn add_density(&mut self, cell: CellId, generation: Generation) -> Result<(), SpaceError> {
        self.check(cell)?;
        self.density.increment(cell, generation);
        Ok(())
    }

    /// Record one agent positioned on `cell` at `generation`.
    pub fn add_occupancy(
        &mut self,
        cell: CellId,
        generation: Generation,
    ) -> Result<(), SpaceError> {
        self.check(cell)?;
        self.occupancy.increment(cell, generation);
        Ok(())
    }

    /// Move one reservation at `generation` from `from` to `to`.
    ///
    /// Fails with [`SpaceError::ReservationUnderflow`] if `from` holds no
    /// reservation at that generation; nothing is changed in that case.
    pub fn move_density(
        &mut self,
        from: CellId,
        to: CellId,
        generation: Generation,
    ) -> Result<(), SpaceError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return if self.density(from, generation) > 0 {
                Ok(())
            } else {
                Err(SpaceError::ReservationUnderflow {
                    cell: from,
                    generation,
                })
            };
        }
        self.density.decrement(from, generation)?;
        self.density.increment(to, generation);
        Ok(())
    }

    /// Number of generations with any recorded density or occupancy.
    pub fn generations(&self) -> usize {
        self.density.layers.len().max(self.occupancy.layers.len())
    }

    /// Density of every cell at `generation`.
    pub fn density_at(&self, generation: Generation) -> Vec<u32> {
        self.density.layer(generation)
    }

    /// Occupancy of every cell at `generation`.
    pub fn occupancy_at(&self, generation: Generation) -> Vec<u32> {
        self.occupancy.layer(generation)
    }

    /// Per-cell density summed over all generations.
    pub fn total_density(&self) -> Vec<u64> {
        self.density.totals()
    }

    /// Per-cell occupancy summed over all generations.
    pub fn total_occupancy(&self) -> Vec<u64> {
        self.occupancy.totals()
    }

    /// Sum of every density counter.
    pub fn density_sum(&self) -> u64 {
        self.density.sum()
    }

    // ── Routing ─────────────────────────────────────────────────

    /// Dijkstra from `source` leaving at generation `start`, priced by the
    /// current barrier field and density.
    pub fn shortest_path_costs(
        &self,
        source: CellId,
        start: Generation,
    ) -> Result<ShortestPaths<CellId>, GraphError<CellId>> {
        self.graph.shortest_path_costs(source, start, None, self)
    }

    /// Cheapest route `source → goal` leaving at generation `start`.
    pub fn shortest_path(
        &self,
        source: CellId,
        goal: CellId,
        start: Generation,
    ) -> Result<Vec<CellId>, GraphError<CellId>> {
        self.graph.shortest_path(source, goal, start, self)
    }
}

impl EdgeCost<CellId> for SpatialMap {
    fn edge_cost(&self, from: CellId, to: CellId, generation: Generation) -> f64 {
        match self.graph.weight(from, to) {
            Some(base) => base + self.barrier(to) + f64::from(self.density(to, generation)),
            None => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three cells in a row: 0 - 1 - 2.
    fn strip() -> SpatialMap {
        SpatialMap::new(3, &[(CellId(0), CellId(1), 1.0), (CellId(1), CellId(2), 1.0)])
    }

    // ── Counters ────────────────────────────────────────────────

    #[test]
    fn counters_default_to_zero_and_grow() {
        let mut m = strip();
        assert_eq!(m.density(CellId(1), Generation(40)), 0);
        m.add_density(CellId(1), Generation(3)).unwrap();
        m.add_density(CellId(1), Generation(3)).unwrap();
        m.add_occupancy(CellId(2), Generation(1)).unwrap();
        assert_eq!(m.density(CellId(1), Generation(3)), 2);
        assert_eq!(m.occupancy(CellId(2), Generation(1)), 1);
        assert_eq!(m.generations(), 4);
        assert_eq!(m.density_at(Generation(3)), vec![0, 2, 0]);
        assert_eq!(m.occupancy_at(Generation(9)), vec![0, 0, 0]);
        assert_eq!(m.total_density(), vec![0, 2, 0]);
        assert_eq!(m.total_occupancy(), vec![0, 0, 1]);
        assert_eq!(m.density_sum(), 2);
    }

    #[test]
    fn soften_adds_per_cell_and_keeps_blocks() {
        let mut m = strip();
        m.block(CellId(2)).unwrap();
        m.soften(&[0.5, 0.25, 1.0, 9.0]);
        assert_eq!(m.barrier_field(), &[0.5, 0.25, f64::INFINITY]);
        m.soften(&[0.5]);
        assert_eq!(m.barrier(CellId(0)), 1.0);
    }

    #[test]
    fn out_of_range_cells_rejected() {
        let mut m = strip();
        match m.add_density(CellId(3), Generation::ZERO) {
            Err(SpaceError::CellOutOfRange { cells: 3, .. }) => {}
            other => panic!("expected CellOutOfRange, got {other:?}"),
        }
        assert!(m.block(CellId(7)).is_err());
    }

    #[test]
    fn move_density_relocates_one_reservation() {
        let mut m = strip();
        m.add_density(CellId(2), Generation(1)).unwrap();
        m.move_density(CellId(2), CellId(1), Generation(1)).unwrap();
        assert_eq!(m.density(CellId(2), Generation(1)), 0);
        assert_eq!(m.density(CellId(1), Generation(1)), 1);
        assert_eq!(m.density_sum(), 1);
    }

    #[test]
    fn move_density_underflow_leaves_state_untouched() {
        let mut m = strip();
        m.add_density(CellId(1), Generation(0)).unwrap();
        match m.move_density(CellId(2), CellId(1), Generation(0)) {
            Err(SpaceError::ReservationUnderflow { cell, generation }) => {
                assert_eq!(cell, CellId(2));
                assert_eq!(generation, Generation(0));
            }
            other => panic!("expected ReservationUnderflow, got {other:?}"),
        }
        assert_eq!(m.density(CellId(1), Generation(0)), 1);
        assert!(m.move_density(CellId(0), CellId(0), Generation(5)).is_err());
    }

    // ── Routing ─────────────────────────────────────────────────

    #[test]
    fn cost_adds_barrier_and_density() {
        let mut m = strip();
        m.add_barrier(CellId(1), 0.25).unwrap();
        m.add_density(CellId(1), Generation(2)).unwrap();
        assert_eq!(m.edge_cost(CellId(0), CellId(1), Generation(1)), 1.25);
        assert_eq!(m.edge_cost(CellId(0), CellId(1), Generation(2)), 2.25);
        assert_eq!(m.edge_cost(CellId(0), CellId(2), Generation(0)), f64::INFINITY);
    }

    #[test]
    fn blocked_cells_cut_routes() {
        let mut m = strip();
        assert_eq!(
            m.shortest_path(CellId(0), CellId(2), Generation::ZERO).unwrap(),
            vec![CellId(0), CellId(1), CellId(2)]
        );
        m.block(CellId(1)).unwrap();
        assert!(m.is_blocked(CellId(1)));
        match m.shortest_path(CellId(0), CellId(2), Generation::ZERO) {
            Err(GraphError::NoPath { .. }) => {}
            other => panic!("expected NoPath, got {other:?}"),
        }
    }

    #[test]
    fn density_diverts_routes_in_time() {
        // 0 - 1 - 3 and 0 - 2 - 3, with 2 slightly longer.
        let mut m = SpatialMap::new(
            4,
            &[
                (CellId(0), CellId(1), 1.0),
                (CellId(1), CellId(3), 1.0),
                (CellId(0), CellId(2), 1.2),
                (CellId(2), CellId(3), 1.2),
            ],
        );
        // Leaving at generation 5, cell 1 is reached at generation 6.
        m.add_density(CellId(1), Generation(6)).unwrap();
        assert_eq!(
            m.shortest_path(CellId(0), CellId(3), Generation(5)).unwrap(),
            vec![CellId(0), CellId(2), CellId(3)]
        );
        // A reservation at another generation does not matter.
        assert_eq!(
            m.shortest_path(CellId(0), CellId(3), Generation(0)).unwrap(),
            vec![CellId(0), CellId(1), CellId(3)]
        );
    }
}
