//! Run results for external consumers.
//!
//! A [`RunReport`] is a plain-data copy of everything a caller needs
//! after a run: where every agent walked, how busy every cell and node
//! was at every generation, and what went wrong along the way.

use crate::agent::{Agent, AgentState, Waypoint};
use crate::diagnostic::Diagnostic;
use crate::metrics::RunMetrics;
use crate::node::Node;
use crate::roster::NodeRoster;
use circulate_core::{AgentId, FloorId, Generation, NodeId, Point2};
use circulate_space::FloorIndex;

/// The walk of one agent.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentTrace {
    /// The agent.
    pub agent: AgentId,
    /// Name of the profile it was spawned from.
    pub profile: String,
    /// State at the end of the run.
    pub state: AgentState,
    /// Floor it walked on, if it was ever placed.
    pub floor: Option<FloorId>,
    /// One physical position per generation: node positions for node
    /// waypoints, cell centres otherwise.
    pub points: Vec<Point2>,
    /// Congestion shifts taken.
    pub shifts: u32,
}

impl AgentTrace {
    pub(crate) fn capture(agent: &Agent, nodes: &[Node], floors: &[FloorIndex]) -> Self {
        let floor = agent.floor().and_then(|f| floors.get(f.index()));
        let points = agent
            .history()
            .iter()
            .filter_map(|w| match *w {
                Waypoint::Node { id, .. } => nodes.get(id.index()).map(Node::position),
                Waypoint::Cell(cell) => floor?.centers().get(cell.index()).copied(),
            })
            .collect();
        Self {
            agent: agent.id(),
            profile: agent.profile().name.clone(),
            state: agent.state(),
            floor: agent.floor(),
            points,
            shifts: agent.shifts(),
        }
    }
}

/// Per-cell activity on one floor.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorActivity {
    /// Floor id.
    pub floor: FloorId,
    /// Floor name.
    pub name: String,
    /// `density[g][c]`: reservations of cell `c` for generation `g`.
    pub density: Vec<Vec<u32>>,
    /// `occupancy[g][c]`: agents positioned on cell `c` at generation `g`.
    pub occupancy: Vec<Vec<u32>>,
    /// Density summed over all generations, per cell.
    pub total_density: Vec<u64>,
    /// Occupancy summed over all generations, per cell.
    pub total_occupancy: Vec<u64>,
    /// Static barrier weight per cell.
    pub barrier: Vec<f64>,
}

impl FloorActivity {
    pub(crate) fn capture(id: FloorId, floor: &FloorIndex) -> Self {
        let map = floor.map();
        let generations = (0..map.generations()).map(|g| Generation(g as u32));
        Self {
            floor: id,
            name: floor.name().to_string(),
            density: generations.clone().map(|g| map.density_at(g)).collect(),
            occupancy: generations.map(|g| map.occupancy_at(g)).collect(),
            total_density: map.total_density(),
            total_occupancy: map.total_occupancy(),
            barrier: floor.barrier_field().to_vec(),
        }
    }

    /// Highest occupancy of `cell` over all generations.
    pub fn peak_occupancy(&self, cell: usize) -> u32 {
        self.occupancy
            .iter()
            .filter_map(|layer| layer.get(cell))
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// Visitors standing at one node, per generation.
///
/// Only agents at the node as a waypoint count; agents crossing its cell
/// on the way elsewhere show up in [`FloorActivity::occupancy`] instead.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeActivity {
    /// The node.
    pub node: NodeId,
    /// Node name.
    pub name: String,
    /// `occupancy[g]`: agents at the node at generation `g`, over the
    /// generations its floor recorded. Empty for an unplaced node.
    pub occupancy: Vec<u32>,
}

impl NodeActivity {
    pub(crate) fn capture(node: &Node, roster: &NodeRoster, floors: &[FloorIndex]) -> Self {
        let generations = node
            .placement()
            .and_then(|p| floors.get(p.floor.index()))
            .map_or(0, |f| f.map().generations());
        Self {
            node: node.id(),
            name: node.name().to_string(),
            occupancy: roster.series(node.id(), generations),
        }
    }

    /// Highest occupancy over all generations.
    pub fn peak(&self) -> u32 {
        self.occupancy.iter().copied().max().unwrap_or(0)
    }

    /// Mean occupancy per generation.
    ///
    /// With `occupied_only`, generations nobody stood at the node are left
    /// out of the mean. Zero when nothing is left to average.
    pub fn mean(&self, occupied_only: bool) -> f64 {
        let counted: Vec<u32> = self
            .occupancy
            .iter()
            .copied()
            .filter(|&c| !occupied_only || c > 0)
            .collect();
        if counted.is_empty() {
            return 0.0;
        }
        f64::from(counted.iter().sum::<u32>()) / counted.len() as f64
    }
}

/// Everything a finished (or capped) run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Ticks executed.
    pub ticks: u64,
    /// Whether the run stopped at the tick cap with agents still active.
    pub cap_reached: bool,
    /// One trace per agent, in id order.
    pub agents: Vec<AgentTrace>,
    /// One activity record per floor, in id order.
    pub floors: Vec<FloorActivity>,
    /// One activity record per node, in id order.
    pub nodes: Vec<NodeActivity>,
    /// Build and run diagnostics, in the order they were recorded.
    pub diagnostics: Vec<Diagnostic>,
    /// Aggregated tick metrics.
    pub metrics: RunMetrics,
}

impl RunReport {
    /// Agents that ended in `state`.
    pub fn count_in(&self, state: AgentState) -> usize {
        self.agents.iter().filter(|a| a.state == state).count()
    }

    /// Trace of `agent`, if it exists.
    pub fn agent(&self, agent: AgentId) -> Option<&AgentTrace> {
        self.agents.get(agent.0 as usize)
    }

    /// Per-generation visitor counts at `node`, if it exists.
    pub fn node_occupancy(&self, node: NodeId) -> Option<&[u32]> {
        self.nodes.get(node.index()).map(|n| n.occupancy.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(occupancy: Vec<u32>) -> NodeActivity {
        NodeActivity {
            node: NodeId(0),
            name: "kiosk".into(),
            occupancy,
        }
    }

    #[test]
    fn node_mean_over_all_or_occupied_generations() {
        let a = activity(vec![0, 2, 0, 1, 0, 3]);
        assert_eq!(a.peak(), 3);
        assert!((a.mean(false) - 1.0).abs() < 1e-12);
        assert!((a.mean(true) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_node_means_zero() {
        let a = activity(vec![0, 0]);
        assert_eq!(a.mean(true), 0.0);
        assert_eq!(activity(Vec::new()).mean(false), 0.0);
        assert_eq!(a.peak(), 0);
    }
}
