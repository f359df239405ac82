//! The agent state machine.
//!
//! An agent lives on one floor and walks a plan of future positions, one
//! generation per step. Its `history` holds one [`Waypoint`] per
//! generation it has lived through, so `history.len() == age + 1` once it
//! is placed. The pending `plan` is a stack: the top entry is the position
//! for `age + 1`, the one below it for `age + 2`, and so on.
//!
//! Each tick runs in two phases. `Agent::plan` only reads shared state
//! and may run in parallel: a `Ready` agent picks its next waypoint and
//! routes to it against the map as it stood at the start of the tick.
//! `Agent::step` then runs serially in agent-id order and applies every
//! write: reservations, occupancy, arrivals and congestion shifts.
//!
//! Node capacity is judged against the [`NodeRoster`], never against cell
//! occupancy: an agent's stay at a node is booked from the generation it
//! arrives until the generation it steps off.

use crate::coarse::CoarseGraph;
use crate::config::EnvironmentConfig;
use crate::diagnostic::Diagnostic;
use crate::node::Node;
use crate::roster::NodeRoster;
use circulate_core::{AgentId, AgentProfile, CellId, FloorId, Generation, NodeId};
use circulate_space::{FloorIndex, SpaceError, SpatialMap};
use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::debug;

/// A position in an agent's history or plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waypoint {
    /// Standing at a named node.
    Node {
        /// The node.
        id: NodeId,
        /// The node's cell.
        cell: CellId,
    },
    /// Walking through a corridor cell.
    Cell(CellId),
}

impl Waypoint {
    /// The cell this waypoint occupies.
    pub fn cell(self) -> CellId {
        match self {
            Self::Node { cell, .. } | Self::Cell(cell) => cell,
        }
    }

    /// The node, if this waypoint is one.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node { id, .. } => Some(id),
            Self::Cell(_) => None,
        }
    }
}

/// Where an agent is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Not yet placed at an origin.
    Uninitialized,
    /// At a node, about to schedule a wait.
    Waiting,
    /// At a node, about to choose the next waypoint.
    Ready,
    /// Walking a plan.
    Pending,
    /// Reached its final destination.
    Complete,
    /// No reachable waypoint was left.
    Stranded,
    /// No origin node existed; never activated.
    Unplaced,
}

impl AgentState {
    /// Whether the agent will never step again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Stranded | Self::Unplaced)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlanKind {
    Wait,
    Route,
}

/// One planned position. `reserved` entries hold a density reservation at
/// their generation; reserved entries always form a run from the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PlanStep {
    at: Waypoint,
    reserved: bool,
}

/// Outcome of the read-only planning phase.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Decision {
    /// Walk `path` (current cell first) to `target`.
    Route {
        target: NodeId,
        path: Vec<CellId>,
        complete: bool,
    },
    /// Every candidate was full and declined; wait again.
    Wait,
    /// Nothing reachable.
    Stranded,
}

/// What one step did, for metrics and diagnostics.
#[derive(Clone, Debug, Default)]
pub(crate) struct StepEvents {
    pub routed: bool,
    pub shifted: bool,
    pub finished: bool,
    pub diagnostic: Option<Diagnostic>,
}

/// Shared read-only state an agent decides against.
pub(crate) struct Scene<'a> {
    pub nodes: &'a [Node],
    pub coarse: &'a CoarseGraph,
    pub config: &'a EnvironmentConfig,
}

/// A simulated pedestrian.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    profile: Arc<AgentProfile>,
    state: AgentState,
    floor: Option<FloorId>,
    age: Generation,
    history: Vec<Waypoint>,
    plan: Vec<PlanStep>,
    plan_kind: PlanKind,
    hold: Option<NodeId>,
    plans: u32,
    complete: bool,
    decision: Option<Decision>,
    shifts: u32,
    rng: ChaCha8Rng,
}

impl Agent {
    pub(crate) fn new(id: AgentId, profile: Arc<AgentProfile>, seed: u64) -> Self {
        Self {
            id,
            profile,
            state: AgentState::Uninitialized,
            floor: None,
            age: Generation::ZERO,
            history: Vec::new(),
            plan: Vec::new(),
            plan_kind: PlanKind::Wait,
            hold: None,
            plans: 0,
            complete: false,
            decision: None,
            shifts: 0,
            rng: ChaCha8Rng::seed_from_u64(seed ^ u64::from(id.0)),
        }
    }

    /// Agent id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The profile the agent was spawned from.
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Current state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Whether the agent still steps.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Floor the agent walks on, once placed.
    pub fn floor(&self) -> Option<FloorId> {
        self.floor
    }

    /// Current generation.
    pub fn age(&self) -> Generation {
        self.age
    }

    /// One waypoint per generation lived, oldest first.
    pub fn history(&self) -> &[Waypoint] {
        &self.history
    }

    /// The waypoint the agent is committed to.
    pub fn hold(&self) -> Option<NodeId> {
        self.hold
    }

    /// Number of congestion shifts taken.
    pub fn shifts(&self) -> u32 {
        self.shifts
    }

    /// Whether the current leg ends the journey.
    pub fn is_heading_home(&self) -> bool {
        self.complete
    }

    /// Planned positions for `age + 1`, `age + 2`, ...
    pub fn planned(&self) -> impl Iterator<Item = Waypoint> + '_ {
        self.plan.iter().rev().map(|s| s.at)
    }

    fn current_node(&self) -> Option<(NodeId, CellId)> {
        match self.history.last()? {
            Waypoint::Node { id, cell } => Some((*id, *cell)),
            Waypoint::Cell(_) => None,
        }
    }

    fn visited<'n>(&self, nodes: &'n [Node]) -> Vec<&'n str> {
        self.history
            .iter()
            .filter_map(|w| w.node())
            .filter_map(|id| nodes.get(id.index()))
            .map(Node::name)
            .collect()
    }

    // ── Phase 1: planning ───────────────────────────────────────

    /// Choose and route the next leg if the agent is `Ready`.
    ///
    /// Reads only shared state; the result is applied by the next
    /// [`step`](Self::step).
    pub(crate) fn plan(
        &mut self,
        scene: &Scene<'_>,
        floors: &[FloorIndex],
        roster: &NodeRoster,
    ) {
        if self.state != AgentState::Ready {
            return;
        }
        let map = self
            .floor
            .and_then(|f| floors.get(f.index()))
            .map(FloorIndex::map);
        let decision = match (self.current_node(), map) {
            (Some((here, cell)), Some(map)) => self.choose(scene, map, roster, here, cell),
            _ => Decision::Stranded,
        };
        self.decision = Some(decision);
    }

    fn choose(
        &mut self,
        scene: &Scene<'_>,
        map: &SpatialMap,
        roster: &NodeRoster,
        here: NodeId,
        here_cell: CellId,
    ) -> Decision {
        let visited = self.visited(scene.nodes);
        let mut candidates: Vec<(NodeId, usize)> = scene
            .coarse
            .candidates(here)
            .filter(|(n, _)| {
                scene
                    .nodes
                    .get(n.index())
                    .is_some_and(|node| !visited.contains(&node.name()))
            })
            .collect();
        if candidates.is_empty() {
            return self.fallback(scene, map, here_cell);
        }

        // One acceptance draw per distinct waypoint name.
        let mut draws: IndexMap<&str, bool> = IndexMap::new();
        let profile = &self.profile;
        let rng = &mut self.rng;
        candidates.retain(|(n, _)| {
            let name = scene.nodes[n.index()].name();
            *draws.entry(name).or_insert_with(|| {
                profile
                    .transition(name)
                    .is_some_and(|percent| rng.random_range(0.0..100.0) < percent)
            })
        });
        if candidates.is_empty() {
            return self.fallback(scene, map, here_cell);
        }

        candidates.sort_by_key(|&(n, hops)| (hops, n));
        let mut declined = false;
        for (target, _) in candidates {
            let node = &scene.nodes[target.index()];
            let Some(placement) = node.placement() else {
                continue;
            };
            if let Some(capacity) = node.capacity() {
                if roster.booked_from(target, self.age) >= capacity {
                    let queue = self.rng.random_range(0.0..100.0) < self.profile.queuing;
                    if !queue {
                        declined = true;
                        continue;
                    }
                }
            }
            match map.shortest_path(here_cell, placement.cell, self.age) {
                Ok(path) => {
                    return Decision::Route {
                        target,
                        path,
                        complete: false,
                    }
                }
                Err(e) => {
                    debug!(agent = %self.id, node = node.name(), error = %e, "candidate unreachable");
                }
            }
        }
        if declined {
            return Decision::Wait;
        }
        self.fallback(scene, map, here_cell)
    }

    /// Head for a random destination node and end the journey there.
    fn fallback(&mut self, scene: &Scene<'_>, map: &SpatialMap, here_cell: CellId) -> Decision {
        let Some(floor) = self.floor else {
            return Decision::Stranded;
        };
        let destinations: Vec<&Node> = scene
            .nodes
            .iter()
            .filter(|n| n.carries(&self.profile.destination) && n.placement_on(floor).is_some())
            .collect();
        let Some(node) = destinations.choose(&mut self.rng) else {
            return Decision::Stranded;
        };
        let Some(placement) = node.placement() else {
            return Decision::Stranded;
        };
        match map.shortest_path(here_cell, placement.cell, self.age) {
            Ok(path) => Decision::Route {
                target: node.id(),
                path,
                complete: true,
            },
            Err(e) => {
                debug!(agent = %self.id, node = node.name(), error = %e, "destination unreachable");
                Decision::Stranded
            }
        }
    }

    // ── Phase 2: commit ─────────────────────────────────────────

    /// Advance the state machine by one tick, applying all writes.
    pub(crate) fn step(
        &mut self,
        scene: &Scene<'_>,
        floors: &mut [FloorIndex],
        roster: &mut NodeRoster,
    ) -> Result<StepEvents, SpaceError> {
        let mut events = StepEvents::default();
        if self.state.is_terminal() {
            return Ok(events);
        }
        if self.state == AgentState::Uninitialized {
            self.initialize(scene, floors, roster, &mut events)?;
            return Ok(events);
        }
        let Some(floor) = self.floor.and_then(|f| floors.get_mut(f.index())) else {
            self.strand(scene, &mut events);
            self.release(roster);
            return Ok(events);
        };
        let map = floor.map_mut();
        match self.state {
            AgentState::Waiting => self.begin_wait(scene, map, roster, &mut events)?,
            AgentState::Ready => self.commit_decision(scene, map, roster, &mut events)?,
            AgentState::Pending => self.advance(scene, map, roster, &mut events)?,
            _ => {}
        }
        if self.state.is_terminal() {
            self.release(roster);
        }
        Ok(events)
    }

    /// Close the stay at the node the agent ends on; it is gone from the
    /// next generation on.
    fn release(&self, roster: &mut NodeRoster) {
        if let Some((node, _)) = self.current_node() {
            roster.leave(node, self.id, self.age.next());
        }
    }

    /// Place the agent at a random origin node, generation 0.
    fn initialize(
        &mut self,
        scene: &Scene<'_>,
        floors: &mut [FloorIndex],
        roster: &mut NodeRoster,
        events: &mut StepEvents,
    ) -> Result<(), SpaceError> {
        let origins: Vec<&Node> = scene
            .nodes
            .iter()
            .filter(|n| n.carries(&self.profile.origin) && n.placement().is_some())
            .collect();
        let chosen = origins
            .choose(&mut self.rng)
            .and_then(|n| n.placement().map(|p| (n.id(), p)));
        let Some((origin, placement)) = chosen else {
            self.state = AgentState::Unplaced;
            events.finished = true;
            events.diagnostic = Some(Diagnostic::OriginNotFound {
                agent: self.id,
                origin: self.profile.origin.clone(),
            });
            return Ok(());
        };
        let Some(floor) = floors.get_mut(placement.floor.index()) else {
            self.strand(scene, events);
            return Ok(());
        };
        floor.map_mut().add_occupancy(placement.cell, Generation::ZERO)?;
        roster.enter(origin, self.id, Generation::ZERO);
        self.floor = Some(placement.floor);
        self.history.push(Waypoint::Node {
            id: origin,
            cell: placement.cell,
        });
        self.hold = Some(origin);
        self.state = AgentState::Waiting;
        Ok(())
    }

    /// Schedule a stay at the current node.
    ///
    /// The stay lasts `(agents at this node) × factor` generations, where
    /// the factor is drawn from `initial_wait` for the very first plan and
    /// is 1 afterwards. Every generation but the last is reserved.
    fn begin_wait(
        &mut self,
        scene: &Scene<'_>,
        map: &mut SpatialMap,
        roster: &NodeRoster,
        events: &mut StepEvents,
    ) -> Result<(), SpaceError> {
        let Some((id, cell)) = self.current_node() else {
            self.strand(scene, events);
            return Ok(());
        };
        let people = roster.present(id, self.age).max(1);
        let factor = if self.plans == 0 {
            self.rng.random_range(scene.config.initial_wait.clone())
        } else {
            1
        };
        let wait = people.saturating_mul(factor).max(1) as usize;
        for k in 0..wait - 1 {
            map.add_density(cell, self.age.after(k))?;
        }
        let here = Waypoint::Node { id, cell };
        self.plan.clear();
        for i in (0..wait - 1).rev() {
            self.plan.push(PlanStep {
                at: here,
                reserved: i + 1 < wait - 1,
            });
        }
        self.hold = Some(id);
        self.plan_kind = PlanKind::Wait;
        self.plans += 1;
        self.state = if self.plan.is_empty() {
            AgentState::Ready
        } else {
            AgentState::Pending
        };
        Ok(())
    }

    /// Apply the planned decision and take the first step of the route.
    fn commit_decision(
        &mut self,
        scene: &Scene<'_>,
        map: &mut SpatialMap,
        roster: &mut NodeRoster,
        events: &mut StepEvents,
    ) -> Result<(), SpaceError> {
        let decision = match self.decision.take() {
            Some(decision) => decision,
            None => match self.current_node() {
                Some((here, cell)) => self.choose(scene, map, roster, here, cell),
                None => Decision::Stranded,
            },
        };
        match decision {
            Decision::Route {
                target,
                path,
                complete,
            } => {
                let Some(&target_cell) = path.last() else {
                    self.strand(scene, events);
                    return Ok(());
                };
                self.hold = Some(target);
                self.complete |= complete;
                self.plan_kind = PlanKind::Route;
                self.plans += 1;
                events.routed = true;
                // Already standing on the target: the leg ends in place.
                if self.current_node().map(|(here, _)| here) == Some(target) {
                    self.plan.clear();
                    self.finish_leg(events);
                    return Ok(());
                }
                let last = path.len() - 1;
                for (pi, &cell) in path.iter().enumerate().take(last) {
                    map.add_density(cell, self.age.after(pi))?;
                }
                self.plan.clear();
                self.plan.push(PlanStep {
                    at: Waypoint::Node {
                        id: target,
                        cell: target_cell,
                    },
                    reserved: false,
                });
                for &cell in path[1..last.max(1)].iter().rev() {
                    self.plan.push(PlanStep {
                        at: Waypoint::Cell(cell),
                        reserved: true,
                    });
                }
                debug!(agent = %self.id, node = %target, hops = last, complete, "route committed");
                self.state = AgentState::Pending;
                self.advance(scene, map, roster, events)
            }
            Decision::Wait => {
                self.state = AgentState::Waiting;
                Ok(())
            }
            Decision::Stranded => {
                self.strand(scene, events);
                Ok(())
            }
        }
    }

    /// Consume one plan entry, shifting first if the next cell is congested.
    ///
    /// Arriving at a node with a capacity is congested while the roster
    /// has that many stays booked from the next generation on; the agent
    /// then holds where it is, even when that is the node it just left.
    /// Any other step is congested when occupancy of the next cell at the
    /// current or next generation exceeds the configured limit, and agents
    /// standing on a node ignore it.
    fn advance(
        &mut self,
        scene: &Scene<'_>,
        map: &mut SpatialMap,
        roster: &mut NodeRoster,
        events: &mut StepEvents,
    ) -> Result<(), SpaceError> {
        let (Some(&top), Some(&current)) = (self.plan.last(), self.history.last()) else {
            self.finish_leg(events);
            return Ok(());
        };
        let arriving = match top.at {
            Waypoint::Node { id, .. } if self.plan.len() == 1 && current.node() != Some(id) => {
                Some(id)
            }
            _ => None,
        };
        let congested = match arriving {
            Some(id) => scene
                .nodes
                .get(id.index())
                .and_then(Node::capacity)
                .is_some_and(|cap| roster.booked_from(id, self.age.next()) >= cap),
            None if self.plan.len() == 1 => false,
            None => {
                let limit = scene.config.congestion_limit();
                let next_cell = top.at.cell();
                f64::from(map.occupancy(next_cell, self.age)) > limit
                    || f64::from(map.occupancy(next_cell, self.age.next())) > limit
            }
        };
        if congested && (arriving.is_some() || matches!(current, Waypoint::Cell(_))) {
            self.shift(map, current)?;
            events.shifted = true;
        }
        if let Some(step) = self.plan.pop() {
            self.age = self.age.next();
            if step.at != current {
                if let Some(left) = current.node() {
                    roster.leave(left, self.id, self.age);
                }
                if let Some(entered) = step.at.node() {
                    roster.enter(entered, self.id, self.age);
                }
            }
            self.history.push(step.at);
            map.add_occupancy(step.at.cell(), self.age)?;
        }
        if self.plan.is_empty() {
            self.finish_leg(events);
        }
        Ok(())
    }

    /// Defer the plan by one generation, holding at `current`.
    ///
    /// Each reserved entry's reservation at generation `h` moves from its
    /// own cell to the cell planned for `h - 1`; the inserted hold entry
    /// takes over the first reservation and the deepest reserved entry
    /// gives its one up. No reservation is created or destroyed.
    fn shift(&mut self, map: &mut SpatialMap, current: Waypoint) -> Result<(), SpaceError> {
        let len = self.plan.len();
        let reserved = self.plan.iter().rev().take_while(|s| s.reserved).count();
        let mut previous = current.cell();
        for i in 0..reserved {
            let cell = self.plan[len - 1 - i].at.cell();
            map.move_density(cell, previous, self.age.after(i + 1))?;
            previous = cell;
        }
        if reserved > 0 {
            self.plan[len - reserved].reserved = false;
        }
        self.plan.push(PlanStep {
            at: current,
            reserved: reserved > 0,
        });
        self.shifts += 1;
        debug!(agent = %self.id, age = %self.age, "congestion shift");
        Ok(())
    }

    fn finish_leg(&mut self, events: &mut StepEvents) {
        self.state = match self.plan_kind {
            PlanKind::Wait => AgentState::Ready,
            PlanKind::Route if self.complete => {
                events.finished = true;
                AgentState::Complete
            }
            PlanKind::Route => AgentState::Waiting,
        };
    }

    fn strand(&mut self, scene: &Scene<'_>, events: &mut StepEvents) {
        self.state = AgentState::Stranded;
        self.plan.clear();
        events.finished = true;
        let at = self
            .history
            .last()
            .and_then(|w| w.node())
            .and_then(|id| scene.nodes.get(id.index()))
            .map_or_else(|| "corridor".to_string(), |n| n.name().to_string());
        events.diagnostic = Some(Diagnostic::Stranded { agent: self.id, at });
    }
}
