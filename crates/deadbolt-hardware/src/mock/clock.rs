//! Manually advanced clock for window-arithmetic tests.

use crate::clock::MillisClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A [`MillisClock`] whose counter only moves when told to.
///
/// Cloning shares the counter, so a clone handed to the code under test can
/// be advanced from the test body.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ms: Arc<AtomicU32>,
}

impl ManualClock {
    /// Create a clock at counter value zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at a specific counter value (useful for wrap tests).
    #[must_use]
    pub fn starting_at(ms: u32) -> Self {
        let clock = Self::new();
        clock.ms.store(ms, Ordering::SeqCst);
        clock
    }

    /// Advance the counter, wrapping on overflow.
    pub fn advance(&self, ms: u32) {
        self.ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(v.wrapping_add(ms))
            })
            .expect("fetch_update closure never returns None");
    }
}

impl MillisClock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::elapsed_ms;

    #[test]
    fn test_advance() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.advance(1234);
        assert_eq!(clock.now_ms(), 1234);
    }

    #[test]
    fn test_wraps_like_hardware_counter() {
        let clock = ManualClock::starting_at(u32::MAX - 10);
        let start = clock.now_ms();
        clock.advance(30);
        assert_eq!(clock.now_ms(), 19);
        assert_eq!(elapsed_ms(start, clock.now_ms()), 30);
    }

    #[test]
    fn test_clones_share_counter() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        clock.advance(5);
        assert_eq!(shared.now_ms(), 5);
    }
}
