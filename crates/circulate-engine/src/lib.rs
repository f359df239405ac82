//! Agent state machine and tick loop for Circulate environments.
//!
//! Provides [`Environment`], which builds a scene from entity descriptors
//! and steps a population of [`Agent`]s through it until every agent has
//! finished or the tick cap is reached.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod coarse;
pub mod config;
pub mod diagnostic;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod node;
pub mod report;
pub mod roster;

pub use agent::{Agent, AgentState, Waypoint};
pub use coarse::{CoarseGraph, RouteTables};
pub use config::{ConfigError, EnvironmentConfig};
pub use diagnostic::Diagnostic;
pub use environment::Environment;
pub use error::{BuildError, StepError};
pub use metrics::{RunMetrics, TickMetrics};
pub use node::{Node, Placement};
pub use report::{AgentTrace, FloorActivity, NodeActivity, RunReport};
pub use roster::{NodeRoster, Stay};
