//! Error types for floor construction and cell accounting.

use circulate_core::{CellId, Generation};
use std::fmt;

/// Errors arising from rasterizing floors or updating cell counters.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Cell size is NaN, infinite, zero or negative, or so small that the
    /// cell count overflows `u32`.
    InvalidCellSize {
        /// The rejected cell size.
        value: f64,
    },
    /// The boundary contains no cell centre at this resolution.
    EmptyFloor,
    /// The boundary has non-finite or zero-area bounds.
    DegeneratePolygon {
        /// Number of boundary vertices.
        vertices: usize,
    },
    /// A cell id does not belong to this floor.
    CellOutOfRange {
        /// The offending cell.
        cell: CellId,
        /// Number of cells on the floor.
        cells: usize,
    },
    /// A point maps to no cell of this floor.
    PointOutsideFloor {
        /// Horizontal component.
        x: f64,
        /// Vertical component.
        y: f64,
    },
    /// A density reservation was released that was never made.
    ReservationUnderflow {
        /// Cell whose counter would go negative.
        cell: CellId,
        /// Generation of the counter.
        generation: Generation,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { value } => {
                write!(f, "cell size must be finite and positive, got {value}")
            }
            Self::EmptyFloor => write!(f, "floor boundary contains no cells"),
            Self::DegeneratePolygon { vertices } => {
                write!(f, "boundary with {vertices} vertices has degenerate bounds")
            }
            Self::CellOutOfRange { cell, cells } => {
                write!(f, "cell {cell} out of range for floor with {cells} cells")
            }
            Self::PointOutsideFloor { x, y } => {
                write!(f, "point ({x}, {y}) lies outside the floor grid")
            }
            Self::ReservationUnderflow { cell, generation } => {
                write!(
                    f,
                    "density underflow at cell {cell}, generation {generation}"
                )
            }
        }
    }
}

impl std::error::Error for SpaceError {}
