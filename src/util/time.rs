//! Clocks for the relay and the client tick loop

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Longest step fed to the simulation after a stall
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Interval between ticks at the given rate
pub fn tick_duration(ticks_per_second: u32) -> Duration {
    Duration::from_micros(1_000_000 / ticks_per_second.max(1) as u64)
}

/// Wall-clock delta between successive ticks
#[derive(Debug, Clone)]
pub struct DeltaClock {
    last: Instant,
}

impl DeltaClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call, capped at `MAX_FRAME_DELTA`
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DELTA)
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for DeltaClock {
    fn default() -> Self {
        Self::new()
    }
}
