//! Named waypoints placed on floors.

use circulate_core::{CellId, FloorId, NodeId, NodeProfile, Point2};

/// Where a node sits in the raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Floor containing the node.
    pub floor: FloorId,
    /// Cell containing the node.
    pub cell: CellId,
}

/// A named point of interest.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    profile: NodeProfile,
    position: Point2,
    placement: Option<Placement>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        profile: NodeProfile,
        position: Point2,
        placement: Option<Placement>,
    ) -> Self {
        Self {
            id,
            profile,
            position,
            placement,
        }
    }

    /// Node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Node attributes.
    pub fn profile(&self) -> &NodeProfile {
        &self.profile
    }

    /// World position.
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Floor and cell, or `None` for a node off every floor.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Capacity cap, if any.
    pub fn capacity(&self) -> Option<u32> {
        self.profile.capacity
    }

    /// Whether the node carries `tag` as its name or a tag.
    pub fn carries(&self, tag: &str) -> bool {
        self.profile.carries(tag)
    }

    /// Placement on `floor`, if the node lies there.
    pub fn placement_on(&self, floor: FloorId) -> Option<Placement> {
        self.placement.filter(|p| p.floor == floor)
    }
}
