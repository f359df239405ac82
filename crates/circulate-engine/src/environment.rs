//! The environment: scene construction and the tick loop.
//!
//! [`Environment`] owns every floor, node and agent of a scene. It is
//! built once from a list of [`EntityDescriptor`]s and then stepped until
//! no agent is active or the tick cap is reached.
//!
//! # Build order
//!
//! 1. Validate the [`EnvironmentConfig`].
//! 2. Rasterize every floor.
//! 3. Place every node on the first floor that contains it.
//! 4. Mark barrier cells, then build each floor's barrier field.
//! 5. Compute per-node distance tables and the coarse graph.
//! 6. Spawn agents from their profiles.
//!
//! Distance tables are computed after barriers so that coarse edges never
//! cross a wall.
//!
//! # Ticks
//!
//! Each [`step()`](Environment::step) runs a read-only planning phase,
//! in parallel on the rayon pool when configured, followed by a serial
//! commit phase in ascending agent id. Results depend only on the seed.

use crate::agent::{Agent, Scene};
use crate::coarse::{CoarseGraph, RouteTables};
use crate::config::EnvironmentConfig;
use crate::diagnostic::Diagnostic;
use crate::error::{BuildError, StepError};
use crate::metrics::{RunMetrics, TickMetrics};
use crate::node::{Node, Placement};
use crate::report::{AgentTrace, FloorActivity, NodeActivity, RunReport};
use crate::roster::NodeRoster;
use circulate_core::{
    AgentId, AgentProfile, BarrierProfile, EntityDescriptor, EntityKind, FloorId, NodeId,
    Polygon, TemplateProfile,
};
use circulate_space::{FloorIndex, SpatialPartitioner, SquareGrid};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A built scene and its agent population.
#[derive(Debug)]
pub struct Environment {
    config: EnvironmentConfig,
    floors: Vec<FloorIndex>,
    nodes: Vec<Node>,
    templates: Vec<TemplateProfile>,
    coarse: CoarseGraph,
    agents: Vec<Agent>,
    roster: NodeRoster,
    diagnostics: Vec<Diagnostic>,
    tick: u64,
    cap_reached: bool,
    metrics: RunMetrics,
}

impl Environment {
    /// Build an environment on square grids.
    pub fn build(
        config: EnvironmentConfig,
        entities: Vec<EntityDescriptor>,
    ) -> Result<Self, BuildError> {
        Self::build_with(config, entities, &SquareGrid)
    }

    /// Build an environment, rasterizing floors with `partitioner`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, a scene without floors or with fewer
    /// than two nodes, duplicate floor names, a barrier bound to an unknown
    /// floor, an unrasterizable floor, or an invalid agent profile. Nodes
    /// off every floor and unreachable node pairs are only diagnosed.
    pub fn build_with(
        config: EnvironmentConfig,
        entities: Vec<EntityDescriptor>,
        partitioner: &dyn SpatialPartitioner,
    ) -> Result<Self, BuildError> {
        config.validate()?;

        let mut floor_specs = Vec::new();
        let mut node_specs = Vec::new();
        let mut barrier_specs: Vec<(BarrierProfile, Polygon)> = Vec::new();
        let mut templates = Vec::new();
        let mut profiles: Vec<AgentProfile> = Vec::new();
        for entity in entities {
            match entity {
                EntityDescriptor::Floor { profile, boundary } => {
                    floor_specs.push((profile, boundary))
                }
                EntityDescriptor::Node { profile, position } => {
                    node_specs.push((profile, position))
                }
                EntityDescriptor::Barrier { profile, boundary } => {
                    barrier_specs.push((profile, boundary))
                }
                EntityDescriptor::Template { profile } => templates.push(profile),
                EntityDescriptor::Agent { profile } => profiles.push(profile),
            }
        }

        if floor_specs.is_empty() {
            return Err(BuildError::NoFloor);
        }
        if node_specs.len() < 2 {
            return Err(BuildError::TooFewNodes {
                found: node_specs.len(),
            });
        }

        let mut diagnostics = Vec::new();

        // Floors.
        let mut floors: Vec<FloorIndex> = Vec::with_capacity(floor_specs.len());
        for (profile, boundary) in floor_specs {
            if floors.iter().any(|f| f.name() == profile.name) {
                return Err(BuildError::DuplicateName {
                    kind: EntityKind::Floor,
                    name: profile.name,
                });
            }
            floors.push(FloorIndex::new(
                profile.name,
                boundary,
                config.resolution,
                partitioner,
            )?);
        }

        // Nodes.
        let mut nodes = Vec::with_capacity(node_specs.len());
        for (i, (profile, position)) in node_specs.into_iter().enumerate() {
            let placement = floors.iter().enumerate().find_map(|(f, floor)| {
                floor.cell_at(&position).ok().map(|cell| Placement {
                    floor: FloorId(f as u32),
                    cell,
                })
            });
            if placement.is_none() {
                warn!(node = %profile.name, "node is not on any floor");
                diagnostics.push(Diagnostic::NodeOffFloor {
                    node: profile.name.clone(),
                });
            }
            nodes.push(Node::new(NodeId(i as u32), profile, position, placement));
        }

        // Barriers, then the repulsion field they shape.
        for (profile, boundary) in &barrier_specs {
            let targets: Vec<usize> = match &profile.floor {
                Some(name) => {
                    let found = floors.iter().position(|f| f.name() == name.as_str());
                    vec![found.ok_or_else(|| BuildError::FloorNotFound { name: name.clone() })?]
                }
                None => (0..floors.len()).collect(),
            };
            for f in targets {
                let blocked = floors[f].mark_barrier(boundary);
                info!(
                    barrier = profile.name.as_deref().unwrap_or("unnamed"),
                    floor = floors[f].name(),
                    blocked,
                    "barrier marked"
                );
            }
        }
        for floor in &mut floors {
            floor.build_barrier_field(config.barrier_search_depth, config.parallel);
        }

        // Coarse graph.
        let tables = RouteTables::compute(&nodes, &floors, config.parallel);
        let (coarse, coarse_diagnostics) = if templates.is_empty() {
            CoarseGraph::fully_connected(&nodes, &tables)
        } else {
            CoarseGraph::from_templates(&templates, &nodes, &tables)
        };
        diagnostics.extend(coarse_diagnostics);

        // Agents.
        let mut agents = Vec::new();
        for profile in profiles {
            profile.validate()?;
            if profile.transitions.len() > config.max_profile_attributes {
                return Err(BuildError::ProfileLimit {
                    entries: profile.transitions.len(),
                    limit: config.max_profile_attributes,
                    profile: profile.name,
                });
            }
            let profile = Arc::new(profile);
            for _ in 0..profile.count {
                let id = AgentId(agents.len() as u32);
                agents.push(Agent::new(id, Arc::clone(&profile), config.seed));
            }
        }
        if agents.is_empty() {
            warn!("environment has no agents");
            diagnostics.push(Diagnostic::NoAgents);
        }

        info!(
            floors = floors.len(),
            nodes = nodes.len(),
            coarse_edges = coarse.edge_count(),
            agents = agents.len(),
            diagnostics = diagnostics.len(),
            "environment built"
        );

        let roster = NodeRoster::new(nodes.len());
        Ok(Self {
            config,
            floors,
            nodes,
            templates,
            coarse,
            agents,
            roster,
            diagnostics,
            tick: 0,
            cap_reached: false,
            metrics: RunMetrics::default(),
        })
    }

    // ── Stepping ────────────────────────────────────────────────

    /// Execute one tick.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] only when counter accounting breaks; the
    /// environment should not be stepped further after an error.
    pub fn step(&mut self) -> Result<TickMetrics, StepError> {
        let start = Instant::now();
        let scene = Scene {
            nodes: &self.nodes,
            coarse: &self.coarse,
            config: &self.config,
        };

        // Phase 1: decide against the start-of-tick map.
        let floors: &[FloorIndex] = &self.floors;
        let roster = &self.roster;
        if self.config.parallel {
            self.agents
                .par_iter_mut()
                .for_each(|agent| agent.plan(&scene, floors, roster));
        } else {
            for agent in &mut self.agents {
                agent.plan(&scene, floors, roster);
            }
        }
        let planning_us = start.elapsed().as_micros() as u64;

        // Phase 2: commit in id order.
        let mut metrics = TickMetrics {
            tick: self.tick,
            planning_us,
            ..TickMetrics::default()
        };
        for agent in &mut self.agents {
            let events = agent.step(&scene, &mut self.floors, &mut self.roster)?;
            metrics.routed += usize::from(events.routed);
            metrics.shifts += usize::from(events.shifted);
            metrics.finished += usize::from(events.finished);
            if let Some(diagnostic) = events.diagnostic {
                warn!(tick = self.tick, %diagnostic, "agent diagnostic");
                self.diagnostics.push(diagnostic);
            }
        }

        metrics.active = self.agents.iter().filter(|a| a.is_active()).count();
        metrics.total_us = start.elapsed().as_micros() as u64;
        self.metrics.record(&metrics);
        self.tick += 1;
        Ok(metrics)
    }

    /// Step until no agent is active or `max_ticks` ticks have run.
    ///
    /// Hitting the cap is recorded as a [`Diagnostic::TickCapReached`];
    /// the report still reflects the state at cutoff.
    pub fn run(&mut self) -> Result<RunReport, StepError> {
        info!(agents = self.agents.len(), max_ticks = self.config.max_ticks, "run started");
        while self.active_count() > 0 {
            if self.tick >= self.config.max_ticks {
                if !self.cap_reached {
                    let diagnostic = Diagnostic::TickCapReached {
                        ticks: self.tick,
                        active: self.active_count(),
                    };
                    warn!(%diagnostic, "run capped");
                    self.diagnostics.push(diagnostic);
                    self.cap_reached = true;
                }
                break;
            }
            self.step()?;
        }
        info!(
            ticks = self.tick,
            routed = self.metrics.routed,
            shifts = self.metrics.shifts,
            mean_tick_us = self.metrics.mean_tick_us(),
            "run finished"
        );
        Ok(self.report())
    }

    /// Snapshot every agent trace and floor counter.
    pub fn report(&self) -> RunReport {
        RunReport {
            ticks: self.tick,
            cap_reached: self.cap_reached,
            agents: self
                .agents
                .iter()
                .map(|a| AgentTrace::capture(a, &self.nodes, &self.floors))
                .collect(),
            floors: self
                .floors
                .iter()
                .enumerate()
                .map(|(i, f)| FloorActivity::capture(FloorId(i as u32), f))
                .collect(),
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeActivity::capture(n, &self.roster, &self.floors))
                .collect(),
            diagnostics: self.diagnostics.clone(),
            metrics: self.metrics.clone(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The validated configuration.
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Ticks executed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// All floors, indexed by [`FloorId`].
    pub fn floors(&self) -> &[FloorIndex] {
        &self.floors
    }

    /// Floor `id`.
    pub fn floor(&self, id: FloorId) -> Option<&FloorIndex> {
        self.floors.get(id.index())
    }

    /// All nodes, indexed by [`NodeId`].
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First node named `name`.
    pub fn node_named(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Stays at every node so far.
    pub fn roster(&self) -> &NodeRoster {
        &self.roster
    }

    /// Templates the coarse graph was built from.
    pub fn templates(&self) -> &[TemplateProfile] {
        &self.templates
    }

    /// The coarse waypoint graph.
    pub fn coarse(&self) -> &CoarseGraph {
        &self.coarse
    }

    /// All agents, indexed by [`AgentId`].
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Agent `id`.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0 as usize)
    }

    /// Agents that will step again.
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    /// Build and run diagnostics so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Aggregated metrics so far.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circulate_core::{FloorProfile, NodeProfile, Point2};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::rectangle(Point2::new(x0, y0), Point2::new(x1, y1)).unwrap()
    }

    fn floor(name: &str) -> EntityDescriptor {
        EntityDescriptor::Floor {
            profile: FloorProfile { name: name.into() },
            boundary: rect(0.0, 0.0, 10.0, 4.0),
        }
    }

    fn node(name: &str, x: f64, y: f64) -> EntityDescriptor {
        EntityDescriptor::Node {
            profile: NodeProfile::new(name),
            position: Point2::new(x, y),
        }
    }

    fn config() -> EnvironmentConfig {
        EnvironmentConfig {
            resolution: 1.0,
            initial_wait: 1..=1,
            parallel: false,
            ..Default::default()
        }
    }

    // ── Build errors ────────────────────────────────────────────

    #[test]
    fn missing_floor_is_fatal() {
        let err = Environment::build(config(), vec![node("a", 1.0, 1.0), node("b", 2.0, 2.0)])
            .unwrap_err();
        assert_eq!(err, BuildError::NoFloor);
    }

    #[test]
    fn single_node_is_fatal() {
        let err = Environment::build(config(), vec![floor("g"), node("a", 1.0, 1.0)]).unwrap_err();
        assert_eq!(err, BuildError::TooFewNodes { found: 1 });
    }

    #[test]
    fn duplicate_floor_names_are_fatal() {
        let scene = vec![floor("g"), floor("g"), node("a", 1.0, 1.0), node("b", 2.0, 2.0)];
        let err = Environment::build(config(), scene).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { kind: EntityKind::Floor, .. }));
    }

    #[test]
    fn barrier_on_unknown_floor_is_fatal() {
        let scene = vec![
            floor("g"),
            node("a", 1.0, 1.0),
            node("b", 2.0, 2.0),
            EntityDescriptor::Barrier {
                profile: BarrierProfile {
                    name: None,
                    floor: Some("roof".into()),
                },
                boundary: rect(4.0, 0.0, 5.0, 4.0),
            },
        ];
        let err = Environment::build(config(), scene).unwrap_err();
        assert_eq!(err, BuildError::FloorNotFound { name: "roof".into() });
    }

    #[test]
    fn invalid_config_is_fatal() {
        let cfg = EnvironmentConfig {
            max_ticks: 0,
            ..config()
        };
        let err = Environment::build(cfg, vec![floor("g")]).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn oversized_profile_is_fatal() {
        let cfg = EnvironmentConfig {
            max_profile_attributes: 2,
            ..config()
        };
        let agent = AgentProfile::new("v", "a", "b").with_transition("c", 10.0);
        let scene = vec![
            floor("g"),
            node("a", 1.0, 1.0),
            node("b", 2.0, 2.0),
            EntityDescriptor::Agent { profile: agent },
        ];
        let err = Environment::build(cfg, scene).unwrap_err();
        assert!(matches!(err, BuildError::ProfileLimit { entries: 3, limit: 2, .. }));
    }

    // ── Diagnostics ─────────────────────────────────────────────

    #[test]
    fn off_floor_node_is_diagnosed_and_excluded() {
        let scene = vec![
            floor("g"),
            node("a", 1.0, 1.0),
            node("b", 8.0, 2.0),
            node("far", 50.0, 50.0),
        ];
        let env = Environment::build(config(), scene).unwrap();
        assert!(env.diagnostics().contains(&Diagnostic::NodeOffFloor { node: "far".into() }));
        assert!(env.diagnostics().contains(&Diagnostic::NoAgents));
        assert!(env.node_named("far").unwrap().placement().is_none());
        assert_eq!(env.coarse().edge_count(), 2);
    }

    #[test]
    fn nodes_land_on_the_first_containing_floor() {
        let upper = EntityDescriptor::Floor {
            profile: FloorProfile { name: "upper".into() },
            boundary: rect(20.0, 0.0, 30.0, 4.0),
        };
        let scene = vec![
            floor("ground"),
            upper,
            node("a", 1.0, 1.0),
            node("b", 25.0, 1.0),
            node("c", 28.0, 2.0),
        ];
        let env = Environment::build(config(), scene).unwrap();
        assert_eq!(env.node_named("a").unwrap().placement().unwrap().floor, FloorId(0));
        assert_eq!(env.node_named("b").unwrap().placement().unwrap().floor, FloorId(1));
        // Only b and c share a floor.
        assert_eq!(env.coarse().edge_count(), 2);
    }

    #[test]
    fn spawn_count_expands_profiles() {
        let scene = vec![
            floor("g"),
            node("a", 1.0, 1.0),
            node("b", 8.0, 2.0),
            EntityDescriptor::Agent {
                profile: AgentProfile::new("v", "a", "b").with_count(3),
            },
            EntityDescriptor::Agent {
                profile: AgentProfile::new("w", "b", "a"),
            },
        ];
        let env = Environment::build(config(), scene).unwrap();
        assert_eq!(env.agents().len(), 4);
        assert_eq!(env.agent(AgentId(3)).unwrap().profile().name, "w");
        assert_eq!(env.active_count(), 4);
    }

    // ── Run ─────────────────────────────────────────────────────

    #[test]
    fn run_without_agents_reports_immediately() {
        let scene = vec![floor("g"), node("a", 1.0, 1.0), node("b", 8.0, 2.0)];
        let mut env = Environment::build(config(), scene).unwrap();
        let report = env.run().unwrap();
        assert_eq!(report.ticks, 0);
        assert!(!report.cap_reached);
        assert_eq!(report.floors.len(), 1);
    }

    #[test]
    fn tick_cap_is_a_diagnostic() {
        let cfg = EnvironmentConfig {
            max_ticks: 2,
            ..config()
        };
        let scene = vec![
            floor("g"),
            node("a", 0.5, 0.5),
            node("b", 9.5, 3.5),
            EntityDescriptor::Agent {
                profile: AgentProfile::new("v", "a", "b"),
            },
        ];
        let mut env = Environment::build(cfg, scene).unwrap();
        let report = env.run().unwrap();
        assert!(report.cap_reached);
        assert_eq!(report.ticks, 2);
        assert!(report
            .diagnostics
            .contains(&Diagnostic::TickCapReached { ticks: 2, active: 1 }));
        // A second run does not record the cap twice.
        let again = env.run().unwrap();
        assert_eq!(again.diagnostics.len(), report.diagnostics.len());
    }
}
