//! Flat entity profiles and the scene descriptors built from them.
//!
//! A scene is a list of [`EntityDescriptor`]s handed over by the scene
//! loader. Each entity type has an explicit profile schema; the only
//! open-ended mapping is an agent's per-destination transition
//! probabilities, keyed by waypoint name.

use crate::error::ProfileError;
use crate::geometry::{Point2, Polygon};
use indexmap::IndexMap;

/// Discriminates the five entity types a scene may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Walkable floor boundary.
    Floor,
    /// Named waypoint.
    Node,
    /// Impassable region.
    Barrier,
    /// Coarse-graph connection rules.
    Template,
    /// Agent population profile.
    Agent,
}

/// Profile of a walkable floor.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorProfile {
    /// Unique floor name. Barriers refer to floors by this name.
    pub name: String,
}

/// Profile of a named waypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeProfile {
    /// Waypoint name. Transition probabilities are keyed by it.
    pub name: String,
    /// Extra tags; origin/destination lookups match the name or any tag.
    pub tags: Vec<String>,
    /// Maximum simultaneous occupants, if capped.
    pub capacity: Option<u32>,
}

impl NodeProfile {
    /// An uncapped, untagged waypoint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            capacity: None,
        }
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Cap simultaneous occupants.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Whether this waypoint carries `tag` as its name or one of its tags.
    pub fn carries(&self, tag: &str) -> bool {
        self.name == tag || self.tags.iter().any(|t| t == tag)
    }
}

/// Profile of an impassable region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarrierProfile {
    /// Optional barrier name, used only in diagnostics.
    pub name: Option<String>,
    /// Floor the barrier applies to; `None` applies it to every floor.
    pub floor: Option<String>,
}

/// Coarse-graph connection rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateProfile {
    /// Pairs of waypoint names to connect. Every node matching each name
    /// is connected.
    pub edges: Vec<(String, String)>,
    /// When `true` only `from → to` is inserted; otherwise both directions.
    pub directed: bool,
}

/// Profile an agent population is spawned from.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentProfile {
    /// Profile name.
    pub name: String,
    /// Tag of the waypoints an agent may start at.
    pub origin: String,
    /// Tag of the waypoints an agent may finish at.
    pub destination: String,
    /// Per-waypoint-name acceptance probability, in percent.
    pub transitions: IndexMap<String, f64>,
    /// Probability, in percent, of queuing at a full waypoint rather than
    /// trying the next candidate.
    pub queuing: f64,
    /// Number of identical agents spawned from this profile.
    pub count: u32,
}

impl AgentProfile {
    /// Default queuing probability, in percent.
    pub const DEFAULT_QUEUING: f64 = 50.0;

    /// A single-agent profile whose origin and destination are always
    /// accepted.
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        let origin = origin.into();
        let destination = destination.into();
        let mut transitions = IndexMap::new();
        transitions.insert(origin.clone(), 100.0);
        transitions.insert(destination.clone(), 100.0);
        Self {
            name: name.into(),
            origin,
            destination,
            transitions,
            queuing: Self::DEFAULT_QUEUING,
            count: 1,
        }
    }

    /// Assemble a profile from parallel lists of waypoint names and
    /// percentages, as delivered by the scene loader.
    ///
    /// Names are paired with values in order; once the values run out the
    /// last value is reused. At most `limit` pairs are taken. Origin and
    /// destination are always forced to 100%.
    pub fn assemble(
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        names: &[String],
        values: &[f64],
        limit: usize,
    ) -> Self {
        let mut profile = Self::new(name, origin, destination);
        let mut transitions = IndexMap::new();
        if let Some(&last) = values.last() {
            for (i, waypoint) in names.iter().take(limit).enumerate() {
                let value = values.get(i).copied().unwrap_or(last);
                transitions.insert(waypoint.clone(), value);
            }
        }
        transitions.insert(profile.origin.clone(), 100.0);
        transitions.insert(profile.destination.clone(), 100.0);
        profile.transitions = transitions;
        profile
    }

    /// Set the acceptance probability for waypoint `name`.
    pub fn with_transition(mut self, name: impl Into<String>, percent: f64) -> Self {
        self.transitions.insert(name.into(), percent);
        self
    }

    /// Set the queuing probability.
    pub fn with_queuing(mut self, percent: f64) -> Self {
        self.queuing = percent;
        self
    }

    /// Set how many agents to spawn.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Acceptance probability for waypoint `name`, if declared.
    pub fn transition(&self, name: &str) -> Option<f64> {
        self.transitions.get(name).copied()
    }

    /// Check that every percentage lies in `[0, 100]` and `count >= 1`.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check_percent("queuing", self.queuing)?;
        for (name, &value) in &self.transitions {
            check_percent(name, value)?;
        }
        if self.count == 0 {
            return Err(ProfileError::ZeroCount {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

fn check_percent(name: &str, value: f64) -> Result<(), ProfileError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ProfileError::PercentOutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

/// One typed entity as produced by the scene loader.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityDescriptor {
    /// A walkable floor.
    Floor {
        /// Floor attributes.
        profile: FloorProfile,
        /// Closed floor boundary.
        boundary: Polygon,
    },
    /// A named waypoint.
    Node {
        /// Waypoint attributes.
        profile: NodeProfile,
        /// Waypoint location.
        position: Point2,
    },
    /// An impassable region.
    Barrier {
        /// Barrier attributes.
        profile: BarrierProfile,
        /// Closed barrier boundary.
        boundary: Polygon,
    },
    /// Coarse-graph connection rules.
    Template {
        /// Template attributes.
        profile: TemplateProfile,
    },
    /// An agent population.
    Agent {
        /// Agent attributes.
        profile: AgentProfile,
    },
}

impl EntityDescriptor {
    /// The entity's type.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Floor { .. } => EntityKind::Floor,
            Self::Node { .. } => EntityKind::Node,
            Self::Barrier { .. } => EntityKind::Barrier,
            Self::Template { .. } => EntityKind::Template,
            Self::Agent { .. } => EntityKind::Agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_profile_accepts_origin_and_destination() {
        let p = AgentProfile::new("visitor", "entry", "exit");
        assert_eq!(p.transition("entry"), Some(100.0));
        assert_eq!(p.transition("exit"), Some(100.0));
        assert_eq!(p.transition("cafe"), None);
        assert_eq!(p.queuing, AgentProfile::DEFAULT_QUEUING);
        assert_eq!(p.count, 1);
    }

    #[test]
    fn assemble_pairs_and_repeats_last_value() {
        let p = AgentProfile::assemble(
            "visitor",
            "entry",
            "exit",
            &names(&["cafe", "shop", "desk"]),
            &[20.0, 40.0],
            100,
        );
        assert_eq!(p.transition("cafe"), Some(20.0));
        assert_eq!(p.transition("shop"), Some(40.0));
        assert_eq!(p.transition("desk"), Some(40.0));
    }

    #[test]
    fn assemble_caps_entries_and_forces_endpoints() {
        let many: Vec<String> = (0..10).map(|i| format!("n{i}")).collect();
        let p = AgentProfile::assemble("v", "entry", "exit", &many, &[5.0], 3);
        // 3 capped entries plus the forced origin and destination.
        assert_eq!(p.transitions.len(), 5);
        assert_eq!(p.transition("n2"), Some(5.0));
        assert_eq!(p.transition("n3"), None);

        let forced = AgentProfile::assemble("v", "entry", "exit", &names(&["entry"]), &[0.0], 10);
        assert_eq!(forced.transition("entry"), Some(100.0));
    }

    #[test]
    fn assemble_without_values_keeps_only_endpoints() {
        let p = AgentProfile::assemble("v", "a", "b", &names(&["c"]), &[], 10);
        assert_eq!(p.transitions.len(), 2);
    }

    #[test]
    fn validate_rejects_bad_percentages() {
        let p = AgentProfile::new("v", "a", "b").with_transition("c", 120.0);
        assert!(matches!(
            p.validate(),
            Err(ProfileError::PercentOutOfRange { ref name, .. }) if name == "c"
        ));
        let q = AgentProfile::new("v", "a", "b").with_queuing(f64::NAN);
        assert!(q.validate().is_err());
        let z = AgentProfile::new("v", "a", "b").with_count(0);
        assert!(matches!(z.validate(), Err(ProfileError::ZeroCount { .. })));
        assert!(AgentProfile::new("v", "a", "b").validate().is_ok());
    }

    #[test]
    fn node_carries_name_or_tag() {
        let n = NodeProfile::new("lobby").with_tag("entry").with_capacity(4);
        assert!(n.carries("lobby"));
        assert!(n.carries("entry"));
        assert!(!n.carries("exit"));
        assert_eq!(n.capacity, Some(4));
    }
}
