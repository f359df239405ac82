//! The spatial partitioner seam.
//!
//! A [`SpatialPartitioner`] turns a floor boundary and a cell size into a
//! [`Partition`]: ordered cell centres, their integer grid coordinates and
//! the base adjacency between them. [`SquareGrid`](crate::SquareGrid) is
//! the bundled implementation.

use crate::error::SpaceError;
use circulate_core::{CellId, GridCoord, Point2, Polygon};

/// A rasterized floor as produced by a partitioner.
#[derive(Clone, Debug)]
pub struct Partition {
    /// World position of grid coordinate `(0, 0)`'s lower-left corner.
    pub origin: Point2,
    /// Side length of a cell.
    pub cell_size: f64,
    /// Cell centres; `centers[i]` belongs to `CellId(i)`.
    pub centers: Vec<Point2>,
    /// Grid coordinates; `coords[i]` belongs to `CellId(i)`.
    pub coords: Vec<GridCoord>,
    /// Undirected adjacency with base distances, each pair listed once.
    pub adjacency: Vec<(CellId, CellId, f64)>,
}

impl Partition {
    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.centers.len()
    }

    /// Grid coordinate of the cell containing `point`, whether or not that
    /// cell is part of the floor.
    pub fn coord_of(&self, point: &Point2) -> GridCoord {
        let col = ((point.x - self.origin.x) / self.cell_size).floor();
        let row = ((point.y - self.origin.y) / self.cell_size).floor();
        (col as i32, row as i32)
    }
}

/// Rasterizes a floor boundary into cells.
///
/// Implementations must be deterministic: the same boundary and cell size
/// always yield the same cell order.
pub trait SpatialPartitioner: Send + Sync {
    /// Rasterize `boundary` at `cell_size`.
    fn partition(&self, boundary: &Polygon, cell_size: f64) -> Result<Partition, SpaceError>;
}
