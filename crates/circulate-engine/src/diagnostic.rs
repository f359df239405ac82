//! Non-fatal conditions recorded during build and run.

use circulate_core::AgentId;
use std::fmt;

/// A condition worth reporting that does not stop the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A node lies outside every floor and is left out of routing.
    NodeOffFloor {
        /// Node name.
        node: String,
    },
    /// Two nodes on one floor have no route between them, so the coarse
    /// graph has no edge for the pair.
    NoPath {
        /// Source node name.
        from: String,
        /// Target node name.
        to: String,
    },
    /// No node carries an agent's origin tag.
    OriginNotFound {
        /// The agent.
        agent: AgentId,
        /// The origin tag.
        origin: String,
    },
    /// An agent could reach neither a candidate nor a destination.
    Stranded {
        /// The agent.
        agent: AgentId,
        /// Name of the node it is stuck at.
        at: String,
    },
    /// The run hit the tick cap with agents still active.
    TickCapReached {
        /// Ticks executed.
        ticks: u64,
        /// Agents still active.
        active: usize,
    },
    /// The scene has no agents.
    NoAgents,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeOffFloor { node } => write!(f, "node '{node}' is not on a floor"),
            Self::NoPath { from, to } => write!(f, "no path from '{from}' to '{to}'"),
            Self::OriginNotFound { agent, origin } => {
                write!(f, "agent {agent}: no node carries origin '{origin}'")
            }
            Self::Stranded { agent, at } => write!(f, "agent {agent} stranded at '{at}'"),
            Self::TickCapReached { ticks, active } => {
                write!(f, "tick cap of {ticks} reached with {active} agents active")
            }
            Self::NoAgents => write!(f, "no agents in environment"),
        }
    }
}
