//! Ready-made scenes.
//!
//! All scenes are laid out in cell units: build them with a resolution
//! of 1.0 so that every integer-aligned unit square is one cell.
//!
//! - [`open_floor`]: two nodes at either end of an empty hall, one agent.
//! - [`capacity_queue`]: the same hall with a capacity-1 exit.
//! - [`walled_hall`]: the hall split by a wall with no gap.
//! - [`shop_detour`]: two kinds of visitor sharing a capacity-1 shop.
//! - [`concourse`]: a larger floor with pillars, shops and a crowd.

use crate::SceneBuilder;
use circulate_core::{AgentProfile, EntityDescriptor, NodeProfile};

/// Hall width in cells.
pub const HALL_WIDTH: f64 = 10.0;
/// Hall height in cells.
pub const HALL_HEIGHT: f64 = 4.0;

fn hall() -> SceneBuilder {
    SceneBuilder::new()
        .floor("hall", HALL_WIDTH, HALL_HEIGHT)
        .node("entry", 0.5, 1.5)
}

/// One agent walking from `entry` at the west end to `exit` at the east end.
pub fn open_floor() -> Vec<EntityDescriptor> {
    hall()
        .node("exit", 9.5, 1.5)
        .agents(AgentProfile::new("visitor", "entry", "exit"))
        .build()
}

/// `agents` agents sharing one origin and a capacity-1 exit.
pub fn capacity_queue(agents: u32) -> Vec<EntityDescriptor> {
    hall()
        .node_with(NodeProfile::new("exit").with_capacity(1), 9.5, 1.5)
        .agents(AgentProfile::new("visitor", "entry", "exit").with_count(agents))
        .build()
}

/// The hall cut in two by a full-height wall between `entry` and `exit`.
pub fn walled_hall() -> Vec<EntityDescriptor> {
    hall()
        .node("exit", 9.5, 1.5)
        .wall(4.0, 0.0, 6.0, HALL_HEIGHT)
        .agents(AgentProfile::new("visitor", "entry", "exit"))
        .build()
}

/// A 12 × 6 hall with a kiosk, a capacity-1 shop and an exit.
///
/// Two `browser`s stop at the kiosk before the shop; two `shopper`s head
/// for the shop directly. Everyone ends at `exit`.
pub fn shop_detour() -> Vec<EntityDescriptor> {
    SceneBuilder::new()
        .floor("hall", 12.0, 6.0)
        .node("entry", 0.5, 2.5)
        .node("kiosk", 4.5, 0.5)
        .node_with(NodeProfile::new("shop").with_capacity(1), 7.5, 4.5)
        .node("exit", 11.5, 2.5)
        .agents(
            AgentProfile::new("browser", "entry", "exit")
                .with_transition("kiosk", 100.0)
                .with_transition("shop", 100.0)
                .with_count(2),
        )
        .agents(
            AgentProfile::new("shopper", "entry", "exit")
                .with_transition("shop", 100.0)
                .with_count(2),
        )
        .build()
}

/// A 40 × 20 concourse with two pillars, three shops and `agents` walkers.
pub fn concourse(agents: u32) -> Vec<EntityDescriptor> {
    SceneBuilder::new()
        .floor("concourse", 40.0, 20.0)
        .wall(12.0, 6.0, 14.0, 14.0)
        .wall(26.0, 6.0, 28.0, 14.0)
        .node("entry", 0.5, 10.5)
        .node("exit", 39.5, 10.5)
        .node_with(NodeProfile::new("cafe").with_tag("shop").with_capacity(4), 20.5, 2.5)
        .node_with(NodeProfile::new("kiosk").with_tag("shop"), 20.5, 17.5)
        .node_with(NodeProfile::new("books").with_tag("shop").with_capacity(2), 33.5, 17.5)
        .agents(
            AgentProfile::new("shopper", "entry", "exit")
                .with_transition("cafe", 60.0)
                .with_transition("kiosk", 40.0)
                .with_transition("books", 25.0)
                .with_count(agents),
        )
        .build()
}
