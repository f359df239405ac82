//! Circulate: pedestrian circulation simulation on rasterized floor plans.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Circulate sub-crates. For most users, adding `circulate` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use circulate::prelude::*;
//!
//! let rect = |x0, y0, x1, y1| {
//!     Polygon::rectangle(Point2::new(x0, y0), Point2::new(x1, y1)).unwrap()
//! };
//! let scene = vec![
//!     EntityDescriptor::Floor {
//!         profile: FloorProfile { name: "hall".into() },
//!         boundary: rect(0.0, 0.0, 10.0, 4.0),
//!     },
//!     EntityDescriptor::Node {
//!         profile: NodeProfile::new("entry"),
//!         position: Point2::new(0.5, 1.5),
//!     },
//!     EntityDescriptor::Node {
//!         profile: NodeProfile::new("exit"),
//!         position: Point2::new(9.5, 1.5),
//!     },
//!     EntityDescriptor::Agent {
//!         profile: AgentProfile::new("visitor", "entry", "exit"),
//!     },
//! ];
//! let config = EnvironmentConfig {
//!     resolution: 1.0,
//!     initial_wait: 1..=1,
//!     ..Default::default()
//! };
//! let mut env = Environment::build(config, scene).unwrap();
//! let report = env.run().unwrap();
//! assert_eq!(report.count_in(AgentState::Complete), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `circulate-core` | IDs, geometry, entity profiles |
//! | [`graph`] | `circulate-graph` | Weighted graphs, searches, time-dependent Dijkstra |
//! | [`space`] | `circulate-space` | Partitioners, floor maps, barrier fields |
//! | [`engine`] | `circulate-engine` | Agents, environment, reports |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core ids, geometry and entity profiles (`circulate-core`).
pub use circulate_core as types;

/// Weighted graphs and generation-aware shortest paths (`circulate-graph`).
///
/// [`graph::WeightedGraph`] is generic over node and weight types; the
/// [`graph::EdgeCost`] trait is the extension point for custom pricing.
pub use circulate_graph as graph;

/// Floor rasterization and per-cell state (`circulate-space`).
///
/// Implement [`space::SpatialPartitioner`] to rasterize floors with
/// something other than [`space::SquareGrid`].
pub use circulate_space as space;

/// Agents, the environment and run reports (`circulate-engine`).
pub use circulate_engine as engine;

/// Common imports for typical usage.
///
/// ```rust
/// use circulate::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use circulate_core::{
        AgentId, AgentProfile, BarrierProfile, CellId, EntityDescriptor, EntityKind, FloorId,
        FloorProfile, Generation, NodeId, NodeProfile, Point2, Polygon, TemplateProfile,
    };

    // Space
    pub use circulate_space::{FloorIndex, SpaceError, SpatialMap, SpatialPartitioner, SquareGrid};

    // Engine
    pub use circulate_engine::{
        Agent, AgentState, BuildError, Diagnostic, Environment, EnvironmentConfig, RunReport,
        StepError, TickMetrics, Waypoint,
    };
}
