//! Who stands at which node, and for which generations.
//!
//! Cell occupancy is written one generation at a time as agents step, so
//! it cannot tell an arriving agent whether someone will still be standing
//! at a node when it gets there. The roster can: a [`Stay`] opens the
//! moment an agent arrives and stays open until it steps off, so a stay
//! covers every generation the agent will spend at the node, including
//! ones its plan has not reached yet.
//!
//! Only agents standing at a node as a node waypoint are counted. Agents
//! walking through the node's cell on the way elsewhere are not.

use circulate_core::{AgentId, Generation, NodeId};

/// One agent's visit to a node: generations `from..until`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stay {
    /// The visitor.
    pub agent: AgentId,
    /// First generation at the node.
    pub from: Generation,
    /// First generation after leaving, or `None` while still there.
    pub until: Option<Generation>,
}

impl Stay {
    /// Whether the agent is at the node during `generation`.
    pub fn covers(&self, generation: Generation) -> bool {
        self.from <= generation && self.until.is_none_or(|u| generation < u)
    }

    /// Whether any part of the stay lies at or after `generation`.
    pub fn reaches(&self, generation: Generation) -> bool {
        self.until.is_none_or(|u| generation < u)
    }
}

/// Stays per node, indexed by [`NodeId`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeRoster {
    stays: Vec<Vec<Stay>>,
}

impl NodeRoster {
    pub(crate) fn new(nodes: usize) -> Self {
        Self {
            stays: vec![Vec::new(); nodes],
        }
    }

    /// Open a stay for `agent` at `node` starting at `at`.
    pub(crate) fn enter(&mut self, node: NodeId, agent: AgentId, at: Generation) {
        if let Some(stays) = self.stays.get_mut(node.index()) {
            stays.push(Stay {
                agent,
                from: at,
                until: None,
            });
        }
    }

    /// Close `agent`'s open stay at `node`; `at` is its first generation away.
    pub(crate) fn leave(&mut self, node: NodeId, agent: AgentId, at: Generation) {
        let open = self
            .stays
            .get_mut(node.index())
            .and_then(|stays| {
                stays
                    .iter_mut()
                    .rev()
                    .find(|s| s.agent == agent && s.until.is_none())
            });
        if let Some(stay) = open {
            stay.until = Some(at.max(stay.from));
        }
    }

    /// Every stay recorded at `node`, in arrival order.
    pub fn stays(&self, node: NodeId) -> &[Stay] {
        self.stays.get(node.index()).map_or(&[], Vec::as_slice)
    }

    /// Agents at `node` during `generation`.
    pub fn present(&self, node: NodeId, generation: Generation) -> u32 {
        self.stays(node).iter().filter(|s| s.covers(generation)).count() as u32
    }

    /// Stays at `node` that are open or end after `generation`.
    ///
    /// An arrival at `generation` starts an open stay, so it can only be
    /// admitted while this is below the node's capacity: every generation
    /// from then on is shared with at most these stays.
    pub fn booked_from(&self, node: NodeId, generation: Generation) -> u32 {
        self.stays(node)
            .iter()
            .filter(|s| s.reaches(generation))
            .count() as u32
    }

    /// Agents present at `node` for each of the first `generations`.
    pub fn series(&self, node: NodeId, generations: usize) -> Vec<u32> {
        let mut counts = vec![0u32; generations];
        for stay in self.stays(node) {
            let end = stay.until.map_or(generations, Generation::index);
            for count in counts
                .iter_mut()
                .take(end.min(generations))
                .skip(stay.from.index())
            {
                *count += 1;
            }
        }
        counts
    }
}
