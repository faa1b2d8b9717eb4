//! Per-tick performance counters

use std::time::Duration;

use serde::Serialize;

use crate::core::types::Tick;

/// Wall-clock budget of one frame at 60 Hz
pub const FRAME_BUDGET: Duration = Duration::from_micros(16_670);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickMetrics {
    pub tick: Tick,
    /// Wall-clock time spent inside the tick
    pub duration: Duration,
    pub agents_updated: usize,
    pub agent_count: usize,
    pub state_changes: usize,
    /// `duration / FRAME_BUDGET`; above 1.0 the tick overran a 60 Hz frame
    pub system_load: f64,
    /// Ticks per second this duration would sustain, 0 when unmeasurable
    pub fps: f64,
}

impl TickMetrics {
    pub fn new(
        tick: Tick,
        duration: Duration,
        agents_updated: usize,
        agent_count: usize,
        state_changes: usize,
    ) -> Self {
        let secs = duration.as_secs_f64();
        Self {
            tick,
            duration,
            agents_updated,
            agent_count,
            state_changes,
            system_load: secs / FRAME_BUDGET.as_secs_f64(),
            fps: if secs > 0.0 { 1.0 / secs } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_fps() {
        let metrics = TickMetrics::new(3, Duration::from_micros(8_335), 10, 10, 0);
        assert!((metrics.system_load - 0.5).abs() < 1e-9);
        assert!((metrics.fps - 119.98).abs() < 0.01);
    }

    #[test]
    fn test_zero_duration() {
        let metrics = TickMetrics::new(1, Duration::ZERO, 0, 0, 0);
        assert_eq!(metrics.fps, 0.0);
        assert_eq!(metrics.system_load, 0.0);
    }
}
