//! Weighted graphs for Circulate routing.
//!
//! [`WeightedGraph`] is a directed adjacency container with deterministic
//! (insertion-ordered) iteration. It offers two bounded searches, a
//! single-seed [`depth_search`](WeightedGraph::depth_search) and a
//! breadth-wise [`frontier_search`](WeightedGraph::frontier_search), and a
//! generation-aware Dijkstra whose edge costs are supplied by an
//! [`EdgeCost`] implementation evaluated at the generation the edge is
//! traversed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod path;

pub use error::GraphError;
pub use graph::{SearchResult, WeightedGraph};
pub use path::{reconstruct_path, EdgeCost, ShortestPaths};
