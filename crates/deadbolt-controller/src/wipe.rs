//! Wipe confirmation controller.
//!
//! Destructive bulk deletions are gated behind a timed confirmation window:
//! the operator must hold the physical wipe trigger for the full window
//! ([`WIPE_CONFIRM_MS`]) while it is sampled at a fixed cadence
//! ([`WIPE_SAMPLE_MS`]). A release observed at any checkpoint aborts the
//! flow immediately; surviving the window earns one final re-check before
//! the wipe is confirmed.
//!
//! Sampling is level-based, not event-driven: a release shorter than one
//! sampling interval can be missed. That is an accepted limitation of the
//! protocol, preserved as-is.
//!
//! Elapsed time is measured on the wrapping millisecond counter with
//! wraparound-safe subtraction, so the window stays correct across counter
//! overflow during long uptime.

use std::time::Duration;

use deadbolt_core::FeedbackEvent;
use deadbolt_core::constants::{WIPE_CONFIRM_MS, WIPE_SAMPLE_MS};
use deadbolt_hardware::{ControlPanel, MillisClock, WipeTrigger, elapsed_ms};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::feedback::FeedbackDriver;

/// Result of a confirmation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeOutcome {
    /// Trigger held through the full window and the final re-check.
    Confirmed,

    /// Trigger released (or unreadable) before the window elapsed.
    Aborted,
}

/// Timed, cancellable confirmation flow for bulk deletions.
pub struct WipeController<C: MillisClock> {
    clock: C,
    confirm_ms: u32,
    sample_ms: u32,
}

impl<C: MillisClock> WipeController<C> {
    /// Create a controller with the default window and cadence.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            confirm_ms: WIPE_CONFIRM_MS,
            sample_ms: WIPE_SAMPLE_MS,
        }
    }

    /// Override the window and sampling cadence.
    #[must_use]
    pub fn with_window(mut self, confirm_ms: u32, sample_ms: u32) -> Self {
        self.confirm_ms = confirm_ms;
        self.sample_ms = sample_ms;
        self
    }

    /// Run one confirmation window.
    ///
    /// The caller has already observed the trigger active; this emits the
    /// armed feedback, then samples at the fixed cadence measured from arm
    /// time. Trigger read errors are treated as "released" - a destructive
    /// operation never proceeds on an unreadable trigger.
    pub async fn confirm<W, P>(
        &self,
        trigger: &mut W,
        feedback: &mut FeedbackDriver<P>,
    ) -> WipeOutcome
    where
        W: WipeTrigger,
        P: ControlPanel,
    {
        if let Err(e) = feedback.render(FeedbackEvent::WipeArmed).await {
            warn!(error = %e, "could not render wipe-armed feedback");
        }

        let armed_at = self.clock.now_ms();
        info!(window_ms = self.confirm_ms, "wipe confirmation window armed");

        loop {
            sleep(Duration::from_millis(u64::from(self.sample_ms))).await;

            if !self.sample(trigger).await {
                info!("wipe trigger released, aborting");
                if let Err(e) = feedback.render(FeedbackEvent::WipeCancelled).await {
                    warn!(error = %e, "could not render wipe-cancelled feedback");
                }
                return WipeOutcome::Aborted;
            }

            if elapsed_ms(armed_at, self.clock.now_ms()) >= self.confirm_ms {
                // Window elapsed with the trigger still held at the last
                // checkpoint; one more read decides.
                if self.sample(trigger).await {
                    info!("wipe confirmed");
                    return WipeOutcome::Confirmed;
                }
                info!("wipe trigger released at final re-check, aborting");
                if let Err(e) = feedback.render(FeedbackEvent::WipeCancelled).await {
                    warn!(error = %e, "could not render wipe-cancelled feedback");
                }
                return WipeOutcome::Aborted;
            }
        }
    }

    async fn sample<W: WipeTrigger>(&self, trigger: &mut W) -> bool {
        trigger.is_active().await.unwrap_or(false)
    }
}
