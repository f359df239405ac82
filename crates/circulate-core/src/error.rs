//! Error types for profile and geometry validation.

use std::error::Error;
use std::fmt;

/// Errors raised while assembling or validating scene entities.
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileError {
    /// A polygon has fewer than three vertices, a non-finite coordinate,
    /// or zero-area bounds.
    DegeneratePolygon {
        /// Number of vertices supplied.
        vertices: usize,
    },
    /// A probability attribute is outside `[0, 100]`.
    PercentOutOfRange {
        /// Attribute name (a destination name or `"queuing"`).
        name: String,
        /// The offending value.
        value: f64,
    },
    /// An agent profile requests zero agents.
    ZeroCount {
        /// Name of the agent profile.
        name: String,
    },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegeneratePolygon { vertices } => {
                write!(f, "degenerate polygon with {vertices} vertices")
            }
            Self::PercentOutOfRange { name, value } => {
                write!(f, "attribute '{name}' must be within [0, 100], got {value}")
            }
            Self::ZeroCount { name } => write!(f, "agent profile '{name}' spawns zero agents"),
        }
    }
}

impl Error for ProfileError {}
