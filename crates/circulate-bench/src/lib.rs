//! Benchmark profiles for the Circulate simulation framework.
//!
//! - [`open_hall`]: an empty square floor at unit resolution
//! - [`pillared_hall`]: the same floor with a regular grid of pillars
//! - [`bench_config`]: the environment settings shared by run benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use circulate_core::{Point2, Polygon};
use circulate_engine::EnvironmentConfig;
use circulate_space::{FloorIndex, SpaceError, SquareGrid};

/// An empty `side × side` floor, one cell per unit, barrier field built.
pub fn open_hall(side: u32) -> Result<FloorIndex, SpaceError> {
    let boundary = square(0.0, 0.0, f64::from(side))?;
    let mut floor = FloorIndex::new("hall", boundary, 1.0, &SquareGrid)?;
    floor.build_barrier_field(usize::MAX, true);
    Ok(floor)
}

/// A `side × side` floor with 2 × 2 pillars every 8 cells.
///
/// The barrier field is left unbuilt so benchmarks can time it.
pub fn pillared_hall(side: u32) -> Result<FloorIndex, SpaceError> {
    let boundary = square(0.0, 0.0, f64::from(side))?;
    let mut floor = FloorIndex::new("hall", boundary, 1.0, &SquareGrid)?;
    for gx in (4..side.saturating_sub(4)).step_by(8) {
        for gy in (4..side.saturating_sub(4)).step_by(8) {
            floor.mark_barrier(&square(f64::from(gx), f64::from(gy), 2.0)?);
        }
    }
    Ok(floor)
}

/// Unit resolution, fixed seed, short staggered starts.
pub fn bench_config(seed: u64, parallel: bool) -> EnvironmentConfig {
    EnvironmentConfig {
        resolution: 1.0,
        seed,
        initial_wait: 1..=5,
        parallel,
        ..Default::default()
    }
}

fn square(x: f64, y: f64, side: f64) -> Result<Polygon, SpaceError> {
    Polygon::rectangle(Point2::new(x, y), Point2::new(x + side, y + side))
        .map_err(|_| SpaceError::DegeneratePolygon { vertices: 4 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_build() {
        let open = open_hall(16).unwrap();
        assert_eq!(open.cell_count(), 256);
        let pillared = pillared_hall(32).unwrap();
        let blocked = pillared.map().barrier_field().iter().filter(|w| w.is_infinite()).count();
        // Pillars at 4, 12, 20 on both axes.
        assert_eq!(blocked, 9 * 4);
    }
}
