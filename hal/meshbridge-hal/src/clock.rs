//! Monotonic time source

/// Millisecond uptime counter
///
/// The value wraps after about 49.7 days; consumers compare instants with
/// wrapping subtraction.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u32;
}
