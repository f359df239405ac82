//! Circulate Quickstart: a small station concourse from scratch.
//!
//! Demonstrates:
//!   1. Describing floors, nodes, barriers and agents as entity descriptors
//!   2. Building an Environment from an EnvironmentConfig
//!   3. Stepping tick by tick, then running to completion
//!   4. Reading traces, occupancy and diagnostics from the RunReport
//!
//! Run with:
//!   RUST_LOG=info cargo run --example quickstart

use circulate_core::{
    AgentProfile, BarrierProfile, EntityDescriptor, FloorProfile, NodeProfile, Point2, Polygon,
};
use circulate_engine::{AgentState, Environment, EnvironmentConfig};
use tracing_subscriber::EnvFilter;

// ─── Scene ──────────────────────────────────────────────────────

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const RESOLUTION: f64 = 30.0;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::rectangle(Point2::new(x0, y0), Point2::new(x1, y1)).expect("non-degenerate")
}

fn node(profile: NodeProfile, x: f64, y: f64) -> EntityDescriptor {
    EntityDescriptor::Node {
        profile,
        position: Point2::new(x, y),
    }
}

fn scene() -> Vec<EntityDescriptor> {
    vec![
        EntityDescriptor::Floor {
            profile: FloorProfile {
                name: "concourse".into(),
            },
            boundary: rect(0.0, 0.0, WIDTH, HEIGHT),
        },
        // A ticket-hall wall with a gap in the middle.
        EntityDescriptor::Barrier {
            profile: BarrierProfile {
                name: Some("north wall".into()),
                floor: None,
            },
            boundary: rect(300.0, 180.0, 330.0, HEIGHT),
        },
        EntityDescriptor::Barrier {
            profile: BarrierProfile {
                name: Some("south wall".into()),
                floor: None,
            },
            boundary: rect(300.0, 0.0, 330.0, 120.0),
        },
        node(NodeProfile::new("street"), 15.0, 150.0),
        node(NodeProfile::new("platform"), 585.0, 150.0),
        node(
            NodeProfile::new("tickets").with_tag("service").with_capacity(2),
            165.0,
            255.0,
        ),
        node(NodeProfile::new("kiosk").with_tag("service"), 465.0, 45.0),
        EntityDescriptor::Agent {
            profile: AgentProfile::new("commuter", "street", "platform")
                .with_transition("tickets", 70.0)
                .with_transition("kiosk", 30.0)
                .with_queuing(80.0)
                .with_count(12),
        },
    ]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EnvironmentConfig {
        resolution: RESOLUTION,
        seed: 42,
        initial_wait: 1..=10,
        ..Default::default()
    };
    let mut env = match Environment::build(config, scene()) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("build failed: {e}");
            return;
        }
    };

    println!(
        "built: {} cells, {} nodes, {} coarse edges, {} agents",
        env.floors()[0].cell_count(),
        env.nodes().len(),
        env.coarse().edge_count(),
        env.agents().len()
    );

    // ─── A few ticks by hand ────────────────────────────────────
    for _ in 0..5 {
        match env.step() {
            Ok(m) => println!(
                "tick {:>3}: active={} routed={} shifts={} ({} us)",
                m.tick, m.active, m.routed, m.shifts, m.total_us
            ),
            Err(e) => {
                eprintln!("step failed: {e}");
                return;
            }
        }
    }

    // ─── Then run to completion ─────────────────────────────────
    let report = match env.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("run failed: {e}");
            return;
        }
    };

    println!(
        "\nfinished after {} ticks (cap reached: {})",
        report.ticks, report.cap_reached
    );
    println!(
        "complete={} stranded={} shifts={} mean tick={} us",
        report.count_in(AgentState::Complete),
        report.count_in(AgentState::Stranded),
        report.metrics.shifts,
        report.metrics.mean_tick_us()
    );

    if let Some(trace) = report.agents.first() {
        println!("\nagent {} walked {} generations:", trace.agent, trace.points.len());
        for p in trace.points.iter().step_by(5) {
            println!("  ({:>6.1}, {:>6.1})", p.x, p.y);
        }
    }

    let floor = &report.floors[0];
    let busiest = floor
        .total_occupancy
        .iter()
        .enumerate()
        .max_by_key(|(_, &v)| v)
        .map(|(cell, &v)| (cell, v));
    if let Some((cell, visits)) = busiest {
        let c = env.floors()[0].centers()[cell];
        println!(
            "\nbusiest cell: #{cell} at ({:.0}, {:.0}) with {visits} agent-generations",
            c.x, c.y
        );
    }

    for d in &report.diagnostics {
        println!("diagnostic: {d}");
    }
}
