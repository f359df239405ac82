//! Strongly-typed identifiers and the [`GridCoord`] type alias.

use std::fmt;

/// Integer `(column, row)` coordinate of a cell on a floor's raster grid.
pub type GridCoord = (i32, i32);

/// Identifies one cell of a floor's rasterized grid.
///
/// `CellId(n)` is the n-th cell in the order produced by the spatial
/// partitioner. Cells are created once per floor and never destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    /// The cell's position in per-cell arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a named waypoint within an environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node's position in the environment's node list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an agent. Agents are processed in ascending id order
/// whenever shared state is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a floor within an environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorId(pub u32);

impl FloorId {
    /// The floor's position in the environment's floor list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FloorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One discrete simulation time step.
///
/// Used as the time index into per-cell density and occupancy counters
/// and into an agent's position history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u32);

impl Generation {
    /// The first generation of every run.
    pub const ZERO: Generation = Generation(0);

    /// The generation immediately after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The generation `steps` after this one.
    pub fn after(self, steps: usize) -> Self {
        Self(self.0 + steps as u32)
    }

    /// Position in generation-indexed arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Generation {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
