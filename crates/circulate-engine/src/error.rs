//! Error types for environment construction and stepping.

use crate::config::ConfigError;
use circulate_core::{EntityKind, ProfileError};
use circulate_space::SpaceError;
use std::error::Error;
use std::fmt;

/// Fatal errors while building an [`Environment`](crate::Environment).
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The scene has no floor.
    NoFloor,
    /// The scene has fewer than two nodes.
    TooFewNodes {
        /// Nodes found.
        found: usize,
    },
    /// A barrier names a floor that does not exist.
    FloorNotFound {
        /// The unknown floor name.
        name: String,
    },
    /// Two entities of a kind that must be uniquely named share a name.
    DuplicateName {
        /// Entity kind.
        kind: EntityKind,
        /// The repeated name.
        name: String,
    },
    /// A floor could not be rasterized.
    Space(SpaceError),
    /// An agent profile failed validation.
    Profile(ProfileError),
    /// An agent profile carries more transition entries than allowed.
    ProfileLimit {
        /// Profile name.
        profile: String,
        /// Entries present.
        entries: usize,
        /// Configured cap.
        limit: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NoFloor => write!(f, "environment needs at least one floor"),
            Self::TooFewNodes { found } => {
                write!(f, "environment needs at least two nodes, found {found}")
            }
            Self::FloorNotFound { name } => write!(f, "floor '{name}' not found"),
            Self::DuplicateName { kind, name } => {
                write!(f, "{kind:?} name '{name}' is not unique")
            }
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Profile(e) => write!(f, "profile: {e}"),
            Self::ProfileLimit {
                profile,
                entries,
                limit,
            } => write!(
                f,
                "agent profile '{profile}' has {entries} transition entries, limit is {limit}"
            ),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Profile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SpaceError> for BuildError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ProfileError> for BuildError {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

/// Errors that abort a tick.
///
/// These signal broken accounting, never congestion or unreachable goals,
/// which are routine and reported as [`Diagnostic`](crate::Diagnostic)s.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A counter update was rejected by the floor map.
    Space(SpaceError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "space: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
        }
    }
}

impl From<SpaceError> for StepError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}
