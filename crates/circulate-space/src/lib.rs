//! Spatial layer for Circulate: rasterized floors and their routing maps.
//!
//! A floor boundary is rasterized by a [`SpatialPartitioner`] into square
//! cells. Each [`FloorIndex`] owns a [`SpatialMap`], the fine cell graph
//! whose edge cost depends on the generation it is traversed at, plus the
//! static barrier field built once at setup.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod floor;
pub mod grid;
pub mod map;
pub mod partition;

pub use error::SpaceError;
pub use floor::FloorIndex;
pub use grid::SquareGrid;
pub use map::SpatialMap;
pub use partition::{Partition, SpatialPartitioner};
