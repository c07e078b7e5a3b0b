#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

/// Delta clock for the per-frame loop.
///
/// Timestamps are passed in by the caller (the host's frame callback), so the
/// clock is deterministic under test.
#[derive(Debug, Clone)]
pub struct Clock {
    start_time: Option<Instant>,
    last_update: Option<Instant>,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since the first tick
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: None,
            last_update: None,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the clock to `now` and returns the time since the previous
    /// tick. The first tick yields zero; timestamps earlier than the previous
    /// one saturate to zero.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let start = *self.start_time.get_or_insert(now);
        self.delta = self
            .last_update
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.elapsed = now.saturating_duration_since(start);
        self.last_update = Some(now);
        self.frame_count += 1;
        self.delta
    }

    /// Forgets the previous timestamp so the next tick yields zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
