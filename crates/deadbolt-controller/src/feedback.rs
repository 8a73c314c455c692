//! Feedback/output driver.
//!
//! Stateless translator from abstract [`FeedbackEvent`]s to fixed sequences
//! of indicator, alarm and lock steps on the [`ControlPanel`]. Every event
//! maps to the same deterministic sequence every time; timing comes from the
//! constants in `deadbolt-core` unless overridden for the lock hold.
//!
//! The one special case is the reader fault: its sequence repeats forever
//! once the controller enters the fault phase. The driver only renders a
//! single cycle per call - the unending repetition lives in the controller's
//! phase loop, which keeps this module and its tests finite.

use std::time::Duration;

use deadbolt_core::FeedbackEvent;
use deadbolt_core::constants::{
    ACK_BLINK_COUNT, DENY_HOLD_MS, FAULT_CYCLE_MS, FEEDBACK_BLINK_MS, LOCK_HOLD_MS, READY_HOLD_MS,
};
use deadbolt_hardware::{ControlPanel, IndicatorColor, LockState, Result};
use tokio::time::sleep;

/// Renders feedback events onto the output panel.
pub struct FeedbackDriver<P: ControlPanel> {
    panel: P,
    lock_hold: Duration,
}

impl<P: ControlPanel> FeedbackDriver<P> {
    /// Create a driver with the default lock hold duration.
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            lock_hold: Duration::from_millis(LOCK_HOLD_MS),
        }
    }

    /// Override the lock hold duration.
    #[must_use]
    pub fn with_lock_hold(mut self, hold: Duration) -> Self {
        self.lock_hold = hold;
        self
    }

    /// Render one event as its output sequence.
    ///
    /// Sequences that end in a steady state (granted, denied, write acks)
    /// finish by restoring the idle outputs. `ReaderFault` renders exactly
    /// one cycle of the repeating fault pattern.
    ///
    /// # Errors
    /// Propagates panel communication errors; the caller decides whether
    /// they matter (the controller logs and carries on).
    pub async fn render(&mut self, event: FeedbackEvent) -> Result<()> {
        match event {
            FeedbackEvent::Idle => self.idle().await,

            FeedbackEvent::WaitingEnrollMaster => {
                // One blink cycle per call; the boot loop repeats it.
                self.panel.set_indicator(IndicatorColor::Blue).await?;
                sleep(Duration::from_millis(FEEDBACK_BLINK_MS)).await;
                self.panel.set_indicator(IndicatorColor::Off).await?;
                sleep(Duration::from_millis(FEEDBACK_BLINK_MS)).await;
                Ok(())
            }

            FeedbackEvent::MasterDefinedReady => {
                self.panel.set_indicator(IndicatorColor::Green).await?;
                sleep(Duration::from_millis(READY_HOLD_MS)).await;
                self.idle().await
            }

            FeedbackEvent::ProgramEntered => {
                // One red-green-blue sweep announces enrollment mode.
                for color in [
                    IndicatorColor::Red,
                    IndicatorColor::Green,
                    IndicatorColor::Blue,
                ] {
                    self.panel.set_indicator(color).await?;
                    sleep(Duration::from_millis(FEEDBACK_BLINK_MS)).await;
                }
                Ok(())
            }

            FeedbackEvent::ProgramExited => self.idle().await,

            FeedbackEvent::Granted => {
                self.panel.set_indicator(IndicatorColor::Green).await?;
                self.panel.set_lock(LockState::Released).await?;
                sleep(self.lock_hold).await;
                self.panel.set_lock(LockState::Engaged).await?;
                self.idle().await
            }

            FeedbackEvent::Denied => {
                self.panel.set_indicator(IndicatorColor::Red).await?;
                sleep(Duration::from_millis(DENY_HOLD_MS)).await;
                self.idle().await
            }

            FeedbackEvent::WriteSuccess => self.blink_ack(IndicatorColor::Green).await,

            FeedbackEvent::DeleteSuccess => self.blink_ack(IndicatorColor::Blue).await,

            FeedbackEvent::WriteFailed => {
                self.panel.set_alarm(true).await?;
                self.blink_ack(IndicatorColor::Red).await?;
                self.panel.set_alarm(false).await?;
                Ok(())
            }

            FeedbackEvent::WipeArmed => {
                self.panel.set_alarm(true).await?;
                self.panel.set_indicator(IndicatorColor::Red).await?;
                Ok(())
            }

            FeedbackEvent::WipeCancelled => {
                self.panel.set_alarm(false).await?;
                self.idle().await
            }

            FeedbackEvent::ReaderFault => self.render_fault_cycle().await,
        }
    }

    /// Render one cycle of the repeating reader fault pattern.
    ///
    /// The controller calls this in an endless loop from the fault phase.
    ///
    /// # Errors
    /// Propagates panel communication errors.
    pub async fn render_fault_cycle(&mut self) -> Result<()> {
        self.panel.set_indicator(IndicatorColor::Red).await?;
        self.panel.set_alarm(true).await?;
        sleep(Duration::from_millis(FAULT_CYCLE_MS)).await;
        self.panel.set_indicator(IndicatorColor::Off).await?;
        self.panel.set_alarm(false).await?;
        sleep(Duration::from_millis(FAULT_CYCLE_MS)).await;
        Ok(())
    }

    /// The panel, for direct output access (wipe arming, tests).
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    async fn idle(&mut self) -> Result<()> {
        self.panel.set_indicator(IndicatorColor::Blue).await?;
        self.panel.set_alarm(false).await?;
        self.panel.set_lock(LockState::Engaged).await?;
        Ok(())
    }

    async fn blink_ack(&mut self, color: IndicatorColor) -> Result<()> {
        for _ in 0..ACK_BLINK_COUNT {
            self.panel.set_indicator(color).await?;
            sleep(Duration::from_millis(FEEDBACK_BLINK_MS)).await;
            self.panel.set_indicator(IndicatorColor::Off).await?;
            sleep(Duration::from_millis(FEEDBACK_BLINK_MS)).await;
        }
        self.panel.set_indicator(IndicatorColor::Blue).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadbolt_hardware::mock::{MockPanel, MockPanelHandle, PanelCommand};

    fn driver() -> (FeedbackDriver<MockPanel>, MockPanelHandle) {
        let (panel, handle) = MockPanel::new();
        (FeedbackDriver::new(panel), handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_outputs() {
        let (mut driver, handle) = driver();
        driver.render(FeedbackEvent::Idle).await.unwrap();

        assert_eq!(handle.indicator(), IndicatorColor::Blue);
        assert!(!handle.alarm());
        assert_eq!(handle.lock_state(), LockState::Engaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_granted_releases_then_engages_lock() {
        let (mut driver, handle) = driver();
        driver.render(FeedbackEvent::Granted).await.unwrap();

        let lock_commands: Vec<_> = handle
            .commands()
            .into_iter()
            .filter(|c| matches!(c, PanelCommand::Lock(_)))
            .collect();
        assert_eq!(
            lock_commands,
            vec![
                PanelCommand::Lock(LockState::Released),
                PanelCommand::Lock(LockState::Engaged),
                // Trailing idle restore re-asserts the engaged state.
                PanelCommand::Lock(LockState::Engaged),
            ]
        );
        assert_eq!(handle.lock_state(), LockState::Engaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_never_touches_lock() {
        let (mut driver, handle) = driver();
        handle.clear_commands();
        driver.render(FeedbackEvent::Denied).await.unwrap();

        let released = handle
            .commands()
            .iter()
            .any(|c| matches!(c, PanelCommand::Lock(LockState::Released)));
        assert!(!released);
        assert_eq!(handle.lock_state(), LockState::Engaged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_success_blinks_green() {
        let (mut driver, handle) = driver();
        driver.render(FeedbackEvent::WriteSuccess).await.unwrap();

        let green_count = handle
            .commands()
            .iter()
            .filter(|c| matches!(c, PanelCommand::Indicator(IndicatorColor::Green)))
            .count();
        assert_eq!(green_count, ACK_BLINK_COUNT as usize);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_success_blinks_blue() {
        let (mut driver, handle) = driver();
        handle.clear_commands();
        driver.render(FeedbackEvent::DeleteSuccess).await.unwrap();

        let blue_blinks = handle
            .commands()
            .iter()
            .filter(|c| matches!(c, PanelCommand::Indicator(IndicatorColor::Blue)))
            .count();
        // Three blinks plus the trailing standby blue.
        assert_eq!(blue_blinks, ACK_BLINK_COUNT as usize + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failed_sounds_alarm_then_silences() {
        let (mut driver, handle) = driver();
        driver.render(FeedbackEvent::WriteFailed).await.unwrap();

        let alarms: Vec<_> = handle
            .commands()
            .into_iter()
            .filter(|c| matches!(c, PanelCommand::Alarm(_)))
            .collect();
        assert_eq!(
            alarms,
            vec![PanelCommand::Alarm(true), PanelCommand::Alarm(false)]
        );
        assert!(!handle.alarm());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wipe_armed_holds_alarm_until_cancelled() {
        let (mut driver, handle) = driver();
        driver.render(FeedbackEvent::WipeArmed).await.unwrap();
        assert!(handle.alarm());
        assert_eq!(handle.indicator(), IndicatorColor::Red);

        driver.render(FeedbackEvent::WipeCancelled).await.unwrap();
        assert!(!handle.alarm());
        assert_eq!(handle.indicator(), IndicatorColor::Blue);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_cycle_is_one_on_off_period() {
        let (mut driver, handle) = driver();
        handle.clear_commands();
        driver.render_fault_cycle().await.unwrap();

        assert_eq!(
            handle.commands(),
            vec![
                PanelCommand::Indicator(IndicatorColor::Red),
                PanelCommand::Alarm(true),
                PanelCommand::Indicator(IndicatorColor::Off),
                PanelCommand::Alarm(false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rendering_is_deterministic() {
        let (mut a, handle_a) = driver();
        let (mut b, handle_b) = driver();

        a.render(FeedbackEvent::ProgramEntered).await.unwrap();
        b.render(FeedbackEvent::ProgramEntered).await.unwrap();

        assert_eq!(handle_a.commands(), handle_b.commands());
    }
}
