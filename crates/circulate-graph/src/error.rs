//! Error types for graph queries.

use std::error::Error;
use std::fmt;

/// Errors arising from graph searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError<N> {
    /// The node is not part of the graph.
    UnknownNode {
        /// The missing node.
        node: N,
    },
    /// The goal was never reached from the source.
    NoPath {
        /// Search source.
        from: N,
        /// Unreachable goal.
        to: N,
    },
}

impl<N: fmt::Debug> fmt::Display for GraphError<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { node } => write!(f, "node {node:?} is not in the graph"),
            Self::NoPath { from, to } => write!(f, "no path from {from:?} to {to:?}"),
        }
    }
}

impl<N: fmt::Debug> Error for GraphError<N> {}
