//! A named floor: its raster, point lookup and barrier field.

use crate::error::SpaceError;
use crate::map::SpatialMap;
use crate::partition::{Partition, SpatialPartitioner};
use circulate_core::{Bounds2, CellId, GridCoord, Point2, Polygon};
use circulate_graph::WeightedGraph;
use indexmap::IndexMap;
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

/// Owns one floor's [`SpatialMap`] and the mapping between world points
/// and cells.
#[derive(Clone, Debug)]
pub struct FloorIndex {
    name: String,
    boundary: Polygon,
    partition: Partition,
    lookup: IndexMap<GridCoord, CellId>,
    map: SpatialMap,
}

impl FloorIndex {
    /// Rasterize `boundary` at `cell_size` with `partitioner`.
    pub fn new(
        name: impl Into<String>,
        boundary: Polygon,
        cell_size: f64,
        partitioner: &dyn SpatialPartitioner,
    ) -> Result<Self, SpaceError> {
        let partition = partitioner.partition(&boundary, cell_size)?;
        let lookup = partition
            .coords
            .iter()
            .enumerate()
            .map(|(i, &coord)| (coord, CellId(i as u32)))
            .collect();
        let map = SpatialMap::new(partition.cell_count(), &partition.adjacency);
        let name = name.into();
        debug!(floor = %name, cells = partition.cell_count(), "floor rasterized");
        Ok(Self {
            name,
            boundary,
            partition,
            lookup,
            map,
        })
    }

    /// Floor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Floor boundary.
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    /// Side length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.partition.cell_size
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.partition.cell_count()
    }

    /// The floor's routing map.
    pub fn map(&self) -> &SpatialMap {
        &self.map
    }

    /// Mutable access to the routing map.
    pub fn map_mut(&mut self) -> &mut SpatialMap {
        &mut self.map
    }

    /// Whether `point` lies inside the floor boundary.
    pub fn contains_point(&self, point: &Point2) -> bool {
        self.boundary.contains(point)
    }

    /// Grid coordinate of `point`.
    pub fn coord_of(&self, point: &Point2) -> GridCoord {
        self.partition.coord_of(point)
    }

    /// Cell containing `point`.
    pub fn cell_at(&self, point: &Point2) -> Result<CellId, SpaceError> {
        self.lookup
            .get(&self.coord_of(point))
            .copied()
            .ok_or(SpaceError::PointOutsideFloor {
                x: point.x,
                y: point.y,
            })
    }

    /// Cell at grid coordinate `coord`, if it is part of the floor.
    pub fn cell_at_coord(&self, coord: GridCoord) -> Option<CellId> {
        self.lookup.get(&coord).copied()
    }

    /// Centre of `cell`.
    pub fn center(&self, cell: CellId) -> Result<Point2, SpaceError> {
        self.partition
            .centers
            .get(cell.index())
            .copied()
            .ok_or(SpaceError::CellOutOfRange {
                cell,
                cells: self.cell_count(),
            })
    }

    /// Grid coordinate of `cell`.
    pub fn coord(&self, cell: CellId) -> Option<GridCoord> {
        self.partition.coords.get(cell.index()).copied()
    }

    /// All cell centres in cell order.
    pub fn centers(&self) -> &[Point2] {
        &self.partition.centers
    }

    /// Cell neighbours of `cell`.
    pub fn neighbours(&self, cell: CellId) -> SmallVec<[CellId; 8]> {
        self.map.graph().neighbors(cell).map(|(n, _)| n).collect()
    }

    /// Block every cell overlapped by `barrier`.
    ///
    /// A cell is blocked when its centre lies inside the barrier, or when
    /// the barrier's bounds overlap the cell and one of the cell's corners
    /// lies inside the barrier. Returns the number of newly blocked cells.
    pub fn mark_barrier(&mut self, barrier: &Polygon) -> usize {
        let size = self.cell_size();
        let hit: Vec<CellId> = self
            .partition
            .centers
            .iter()
            .enumerate()
            .filter(|(_, center)| {
                if barrier.contains(center) {
                    return true;
                }
                let cell = Bounds2::from_center(**center, size, size);
                barrier.bounds().intersects(&cell)
                    && cell.corners().iter().any(|corner| barrier.contains(corner))
            })
            .map(|(i, _)| CellId(i as u32))
            .collect();
        let mut blocked = 0;
        for cell in hit {
            if !self.map.is_blocked(cell) && self.map.block(cell).is_ok() {
                blocked += 1;
            }
        }
        blocked
    }

    /// Soften the approach to walls and obstacles.
    ///
    /// For every passable cell, a frontier search finds the nearest depth
    /// `d` at which a cell is on an edge (fewer than eight neighbours) or
    /// touches a blocked cell, and `1 / (cell_size * (d + 1))` is added to
    /// its barrier weight. Blocked cells are left at `+∞`. Searches are
    /// capped at `max_depth` and run on the rayon pool when `parallel` is
    /// set; results are identical either way.
    pub fn build_barrier_field(&mut self, max_depth: usize, parallel: bool) {
        let size = self.cell_size();
        let map = &self.map;
        let weigh = |i: usize| -> f64 {
            let cell = CellId(i as u32);
            if map.is_blocked(cell) {
                return 0.0;
            }
            let graph = map.graph();
            let on_edge = |c: CellId| {
                graph.out_degree(c) != 8 || graph.neighbors(c).any(|(n, _)| map.is_blocked(n))
            };
            let found = graph.frontier_search(&[cell], max_depth, on_edge);
            WeightedGraph::<CellId, f64>::nearest_match(&found)
                .map_or(0.0, |d| 1.0 / (size * (d as f64 + 1.0)))
        };
        let n = self.cell_count();
        let weights: Vec<f64> = if parallel {
            (0..n).into_par_iter().map(weigh).collect()
        } else {
            (0..n).map(weigh).collect()
        };
        self.map.soften(&weights);
        debug!(floor = %self.name, "barrier field built");
    }

    /// Static per-cell barrier weights in cell order.
    pub fn barrier_field(&self) -> &[f64] {
        self.map.barrier_field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SquareGrid;

    fn floor(w: f64, h: f64) -> FloorIndex {
        let boundary = Polygon::rectangle(Point2::new(0.0, 0.0), Point2::new(w, h)).unwrap();
        FloorIndex::new("ground", boundary, 1.0, &SquareGrid).unwrap()
    }

    // ── Lookup ──────────────────────────────────────────────────

    #[test]
    fn points_map_to_cells() {
        let f = floor(4.0, 3.0);
        assert_eq!(f.cell_count(), 12);
        assert_eq!(f.cell_at(&Point2::new(0.5, 0.5)).unwrap(), CellId(0));
        assert_eq!(f.cell_at(&Point2::new(3.2, 2.9)).unwrap(), CellId(11));
        assert_eq!(f.center(CellId(5)).unwrap(), Point2::new(1.5, 1.5));
        assert_eq!(f.coord(CellId(5)), Some((1, 1)));
        match f.cell_at(&Point2::new(-0.5, 1.0)) {
            Err(SpaceError::PointOutsideFloor { .. }) => {}
            other => panic!("expected PointOutsideFloor, got {other:?}"),
        }
        assert!(f.center(CellId(12)).is_err());
    }

    #[test]
    fn neighbours_are_8_connected() {
        let f = floor(3.0, 3.0);
        assert_eq!(f.neighbours(CellId(4)).len(), 8);
        assert_eq!(f.neighbours(CellId(0)).len(), 3);
    }

    // ── Barriers ────────────────────────────────────────────────

    #[test]
    fn barrier_blocks_covered_cells() {
        let mut f = floor(5.0, 5.0);
        let wall = Polygon::rectangle(Point2::new(0.0, 2.2), Point2::new(5.0, 2.8)).unwrap();
        // Centres at y = 2.5 fall inside the wall.
        assert_eq!(f.mark_barrier(&wall), 5);
        assert!(f.map().is_blocked(f.cell_at(&Point2::new(3.5, 2.5)).unwrap()));
        assert!(!f.map().is_blocked(f.cell_at(&Point2::new(3.5, 1.5)).unwrap()));
        // Marking twice blocks nothing new.
        assert_eq!(f.mark_barrier(&wall), 0);
    }

    #[test]
    fn thin_barrier_blocks_by_corner() {
        let mut f = floor(4.0, 4.0);
        // A sliver straddling the line y = 2 misses every centre.
        let sliver = Polygon::rectangle(Point2::new(0.0, 1.9), Point2::new(4.0, 2.1)).unwrap();
        assert_eq!(f.mark_barrier(&sliver), 8);
    }

    #[test]
    fn barrier_field_decays_from_edges() {
        let mut f = floor(7.0, 7.0);
        f.build_barrier_field(usize::MAX, false);
        let edge = f.cell_at(&Point2::new(0.5, 3.5)).unwrap();
        let inner = f.cell_at(&Point2::new(1.5, 3.5)).unwrap();
        let centre = f.cell_at(&Point2::new(3.5, 3.5)).unwrap();
        assert_eq!(f.barrier_field()[edge.index()], 1.0);
        assert_eq!(f.barrier_field()[inner.index()], 0.5);
        assert_eq!(f.barrier_field()[centre.index()], 0.25);
    }

    #[test]
    fn barrier_field_skips_blocked_cells_and_softens_neighbours() {
        let mut f = floor(7.0, 7.0);
        let pillar = Polygon::rectangle(Point2::new(3.2, 3.2), Point2::new(3.8, 3.8)).unwrap();
        assert_eq!(f.mark_barrier(&pillar), 1);
        f.build_barrier_field(usize::MAX, false);
        let centre = f.cell_at(&Point2::new(3.5, 3.5)).unwrap();
        let beside = f.cell_at(&Point2::new(2.5, 3.5)).unwrap();
        assert_eq!(f.barrier_field()[centre.index()], f64::INFINITY);
        // Touches the pillar directly.
        assert_eq!(f.barrier_field()[beside.index()], 1.0);
    }

    #[test]
    fn parallel_and_serial_fields_agree() {
        let mut a = floor(9.0, 6.0);
        let mut b = a.clone();
        a.build_barrier_field(usize::MAX, false);
        b.build_barrier_field(usize::MAX, true);
        assert_eq!(a.barrier_field(), b.barrier_field());
    }

    #[test]
    fn depth_cap_limits_softening() {
        let mut f = floor(7.0, 7.0);
        f.build_barrier_field(1, false);
        let centre = f.cell_at(&Point2::new(3.5, 3.5)).unwrap();
        assert_eq!(f.barrier_field()[centre.index()], 0.0);
    }
}
