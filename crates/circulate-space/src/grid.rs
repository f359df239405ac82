//! Square raster with 8-connected neighbourhood (cardinal + diagonal).

use crate::error::SpaceError;
use crate::partition::{Partition, SpatialPartitioner};
use circulate_core::{CellId, GridCoord, Point2, Polygon};
use indexmap::IndexMap;
use std::f64::consts::SQRT_2;

/// All 8 offsets as `(column, row)`: W, E, S, N, SW, NW, SE, NE.
const OFFSETS_8: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Square-cell partitioner.
///
/// The boundary's bounding box is covered by square cells starting at its
/// lower-left corner; a cell belongs to the floor when its centre lies
/// inside the boundary. Cells are numbered row-major from the bottom row.
///
/// Every cell is linked to each of its up to eight floor neighbours. The
/// base distance is the centre-to-centre distance divided by the cell
/// diagonal, so a diagonal step costs 1 and a cardinal step `1/√2`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquareGrid;

impl SquareGrid {
    /// Create the partitioner.
    pub fn new() -> Self {
        Self
    }
}

impl SpatialPartitioner for SquareGrid {
    fn partition(&self, boundary: &Polygon, cell_size: f64) -> Result<Partition, SpaceError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpaceError::InvalidCellSize { value: cell_size });
        }
        let bounds = boundary.bounds();
        let (width, height) = (bounds.width(), bounds.height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SpaceError::DegeneratePolygon {
                vertices: boundary.vertices().len(),
            });
        }
        let cols = (width / cell_size).ceil();
        let rows = (height / cell_size).ceil();
        if cols * rows > u32::MAX as f64 {
            return Err(SpaceError::InvalidCellSize { value: cell_size });
        }
        let (cols, rows) = (cols as i32, rows as i32);
        let origin = bounds.min;

        let mut lookup: IndexMap<GridCoord, CellId> = IndexMap::new();
        let mut centers = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let center = Point2::new(
                    origin.x + (col as f64 + 0.5) * cell_size,
                    origin.y + (row as f64 + 0.5) * cell_size,
                );
                if boundary.contains(&center) {
                    lookup.insert((col, row), CellId(centers.len() as u32));
                    centers.push(center);
                }
            }
        }
        if centers.is_empty() {
            return Err(SpaceError::EmptyFloor);
        }

        let diagonal = cell_size * SQRT_2;
        let mut adjacency = Vec::with_capacity(centers.len() * 4);
        for (&(col, row), &cell) in &lookup {
            for (dc, dr) in OFFSETS_8 {
                if let Some(&other) = lookup.get(&(col + dc, row + dr)) {
                    if other > cell {
                        let d = centers[cell.index()].distance(&centers[other.index()]);
                        adjacency.push((cell, other, d / diagonal));
                    }
                }
            }
        }

        Ok(Partition {
            origin,
            cell_size,
            centers,
            coords: lookup.keys().copied().collect(),
            adjacency,
        })
    }
}
