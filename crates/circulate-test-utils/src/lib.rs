//! Scene fixtures for Circulate development.
//!
//! Provides a [`SceneBuilder`] for assembling entity descriptor lists in
//! a few lines, and ready-made scenes in [`fixtures`] shared by the
//! integration tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use circulate_core::{
    AgentProfile, BarrierProfile, EntityDescriptor, FloorProfile, NodeProfile, Point2, Polygon,
    TemplateProfile,
};

/// Axis-aligned rectangle from `(x0, y0)` to `(x1, y1)`.
///
/// Panics on a degenerate rectangle; fixtures only use literal sizes.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::rectangle(Point2::new(x0, y0), Point2::new(x1, y1))
        .expect("fixture rectangle must have positive area")
}

/// Fluent builder for an entity descriptor list.
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    entities: Vec<EntityDescriptor>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangular floor spanning `(0, 0)` to `(width, height)`.
    pub fn floor(self, name: &str, width: f64, height: f64) -> Self {
        self.floor_at(name, rect(0.0, 0.0, width, height))
    }

    pub fn floor_at(mut self, name: &str, boundary: Polygon) -> Self {
        self.entities.push(EntityDescriptor::Floor {
            profile: FloorProfile { name: name.into() },
            boundary,
        });
        self
    }

    pub fn node(self, name: &str, x: f64, y: f64) -> Self {
        self.node_with(NodeProfile::new(name), x, y)
    }

    pub fn node_with(mut self, profile: NodeProfile, x: f64, y: f64) -> Self {
        self.entities.push(EntityDescriptor::Node {
            profile,
            position: Point2::new(x, y),
        });
        self
    }

    /// Barrier applied to every floor.
    pub fn wall(mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        self.entities.push(EntityDescriptor::Barrier {
            profile: BarrierProfile::default(),
            boundary: rect(x0, y0, x1, y1),
        });
        self
    }

    pub fn template(mut self, edges: &[(&str, &str)], directed: bool) -> Self {
        self.entities.push(EntityDescriptor::Template {
            profile: TemplateProfile {
                edges: edges
                    .iter()
                    .map(|(a, b)| (a.to_string(), b.to_string()))
                    .collect(),
                directed,
            },
        });
        self
    }

    pub fn agents(mut self, profile: AgentProfile) -> Self {
        self.entities.push(EntityDescriptor::Agent { profile });
        self
    }

    pub fn build(self) -> Vec<EntityDescriptor> {
        self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circulate_core::EntityKind;

    #[test]
    fn builder_keeps_insertion_order() {
        let scene = SceneBuilder::new()
            .floor("g", 4.0, 4.0)
            .node("a", 1.0, 1.0)
            .wall(2.0, 0.0, 3.0, 1.0)
            .build();
        let kinds: Vec<_> = scene.iter().map(EntityDescriptor::kind).collect();
        assert_eq!(kinds, vec![EntityKind::Floor, EntityKind::Node, EntityKind::Barrier]);
    }
}
