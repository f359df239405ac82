//! Per-tick and per-run metrics for the environment.
//!
//! [`TickMetrics`] captures what happened during one call to
//! [`Environment::step()`](crate::Environment::step); [`RunMetrics`]
//! folds them over a whole run.

/// Counts and timing collected during a single tick.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Index of the tick, starting at 0.
    pub tick: u64,
    /// Agents still active after the tick.
    pub active: usize,
    /// Agents that committed a new route this tick.
    pub routed: usize,
    /// Congestion shifts taken this tick.
    pub shifts: usize,
    /// Agents that reached a terminal state this tick.
    pub finished: usize,
    /// Wall-clock time spent in the parallel planning phase.
    pub planning_us: u64,
    /// Wall-clock time for the entire tick.
    pub total_us: u64,
}

/// Aggregates over every tick of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Ticks executed.
    pub ticks: u64,
    /// Routes committed.
    pub routed: u64,
    /// Congestion shifts taken.
    pub shifts: u64,
    /// Agents that reached a terminal state.
    pub finished: u64,
    /// Summed wall-clock time of all ticks.
    pub total_us: u64,
    /// Slowest single tick.
    pub max_tick_us: u64,
}

impl RunMetrics {
    /// Fold one tick into the aggregate.
    pub fn record(&mut self, tick: &TickMetrics) {
        self.ticks += 1;
        self.routed += tick.routed as u64;
        self.shifts += tick.shifts as u64;
        self.finished += tick.finished as u64;
        self.total_us += tick.total_us;
        self.max_tick_us = self.max_tick_us.max(tick.total_us);
    }

    /// Mean tick time in microseconds, or 0 before the first tick.
    pub fn mean_tick_us(&self) -> u64 {
        self.total_us.checked_div(self.ticks).unwrap_or(0)
    }
}
