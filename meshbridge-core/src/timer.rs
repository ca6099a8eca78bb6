//! Non-blocking elapsed-time timer
//!
//! Times are millisecond uptime values from [`meshbridge_hal::Clock`],
//! passed in by the caller. Elapsed time uses wrapping subtraction so a
//! timer keeps working across the 49.7-day counter rollover.

/// One-shot timer polled from the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    start_ms: u32,
    duration_ms: u32,
    running: bool,
}

impl Timer {
    /// Create a stopped timer with the given duration
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            start_ms: 0,
            duration_ms,
            running: false,
        }
    }

    /// Change the duration; a running timer restarts from `now_ms`
    pub fn set_duration(&mut self, duration_ms: u32, now_ms: u32) {
        self.duration_ms = duration_ms;
        if self.running {
            self.start_ms = now_ms;
        }
    }

    /// Start (or restart) timing from `now_ms`
    pub fn start(&mut self, now_ms: u32) {
        self.start_ms = now_ms;
        self.running = true;
    }

    /// Stop the timer, keeping its duration
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Move the start point to `now_ms` without changing the running flag
    pub fn reset(&mut self, now_ms: u32) {
        self.start_ms = now_ms;
    }

    /// Check if the timer is running and its duration has elapsed
    pub fn is_timeout(&self, now_ms: u32) -> bool {
        self.running && self.elapsed(now_ms) >= self.duration_ms
    }

    /// Time left before timeout
    ///
    /// A stopped timer reports its full duration.
    pub fn remaining(&self, now_ms: u32) -> u32 {
        if !self.running {
            return self.duration_ms;
        }
        self.duration_ms.saturating_sub(self.elapsed(now_ms))
    }

    /// Check if the timer is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Configured duration
    pub fn duration(&self) -> u32 {
        self.duration_ms
    }

    fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.start_ms)
    }
}
