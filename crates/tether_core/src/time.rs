//! Frame time
//!
//! Fixed-rate ticks. Scripts receive the tick duration as `delta_time`.

use std::time::Duration;

/// Default tick rate (60 Hz = 16.666ms per tick)
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationTime {
    tick_duration: Duration,
    tick_count: u64,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE_HZ)
    }

    /// A zero rate is clamped to 1 Hz.
    pub fn with_tick_rate(hz: u32) -> Self {
        Self {
            tick_duration: Duration::from_secs(1) / hz.max(1),
            tick_count: 0,
            accumulated_time: Duration::ZERO,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Tick duration in seconds, as handed to `on_update`.
    pub fn delta_seconds(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_duration;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new()
    }
}
