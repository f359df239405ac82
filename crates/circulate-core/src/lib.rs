//! Core types for the Circulate simulation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the workspace: typed ids,
//! planar geometry, and the flat entity profiles a scene is described in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod profile;

pub use error::ProfileError;
pub use geometry::{Bounds2, Point2, Polygon};
pub use id::{AgentId, CellId, FloorId, Generation, GridCoord, NodeId};
pub use profile::{
    AgentProfile, BarrierProfile, EntityDescriptor, EntityKind, FloorProfile, NodeProfile,
    TemplateProfile,
};
