//! Wrapping-millisecond monotonic clock.
//!
//! Timed windows (wipe confirmation, lock hold) are measured on a `u32`
//! millisecond counter that is allowed to overflow during long uptime.
//! Comparisons therefore use wraparound-safe unsigned subtraction: the
//! elapsed time between `start` and `now` is `now.wrapping_sub(start)`,
//! which stays correct across a counter wrap as long as the measured
//! interval itself fits in `u32`.

/// Monotonic millisecond counter.
pub trait MillisClock {
    /// Current counter value. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

/// Wraparound-safe elapsed time between two counter readings.
#[inline]
#[must_use]
pub fn elapsed_ms(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}

/// [`MillisClock`] backed by the Tokio runtime clock.
///
/// Uses `tokio::time::Instant`, so paused test time (`start_paused`) drives
/// it correctly.
#[derive(Debug, Clone)]
pub struct TokioClock {
    epoch: tokio::time::Instant,
}

impl TokioClock {
    /// Create a clock with its epoch at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock for TokioClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap: the counter rolls over every ~49.7 days.
        self.epoch.elapsed().as_millis() as u32
    }
}
