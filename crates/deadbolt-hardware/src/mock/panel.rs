//! Mock output panel.

use crate::{
    Result,
    traits::ControlPanel,
    types::{IndicatorColor, LockState},
};
use std::sync::{Arc, Mutex};

/// A single output command observed by the mock panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Indicator(IndicatorColor),
    Alarm(bool),
    Lock(LockState),
}

#[derive(Debug)]
struct PanelInner {
    commands: Vec<PanelCommand>,
    indicator: IndicatorColor,
    alarm: bool,
    lock: LockState,
}

/// Mock output panel recording every command for inspection.
///
/// # Examples
///
/// ```
/// use deadbolt_hardware::mock::MockPanel;
/// use deadbolt_hardware::traits::ControlPanel;
/// use deadbolt_hardware::types::{IndicatorColor, LockState};
///
/// #[tokio::main]
/// async fn main() -> deadbolt_hardware::Result<()> {
///     let (mut panel, handle) = MockPanel::new();
///
///     panel.set_indicator(IndicatorColor::Green).await?;
///     panel.set_lock(LockState::Released).await?;
///
///     assert_eq!(handle.indicator(), IndicatorColor::Green);
///     assert!(handle.lock_state().is_released());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPanel {
    inner: Arc<Mutex<PanelInner>>,
}

impl MockPanel {
    /// Create a mock panel in the all-off, lock-engaged state.
    pub fn new() -> (Self, MockPanelHandle) {
        let inner = Arc::new(Mutex::new(PanelInner {
            commands: Vec::new(),
            indicator: IndicatorColor::Off,
            alarm: false,
            lock: LockState::Engaged,
        }));

        (
            Self {
                inner: inner.clone(),
            },
            MockPanelHandle { inner },
        )
    }
}

impl ControlPanel for MockPanel {
    async fn set_indicator(&mut self, color: IndicatorColor) -> Result<()> {
        let mut inner = self.inner.lock().expect("panel state poisoned");
        inner.indicator = color;
        inner.commands.push(PanelCommand::Indicator(color));
        Ok(())
    }

    async fn set_alarm(&mut self, on: bool) -> Result<()> {
        let mut inner = self.inner.lock().expect("panel state poisoned");
        inner.alarm = on;
        inner.commands.push(PanelCommand::Alarm(on));
        Ok(())
    }

    async fn set_lock(&mut self, state: LockState) -> Result<()> {
        let mut inner = self.inner.lock().expect("panel state poisoned");
        inner.lock = state;
        inner.commands.push(PanelCommand::Lock(state));
        Ok(())
    }
}

/// Handle for inspecting a [`MockPanel`].
#[derive(Debug, Clone)]
pub struct MockPanelHandle {
    inner: Arc<Mutex<PanelInner>>,
}

impl MockPanelHandle {
    /// All commands issued so far, in order.
    pub fn commands(&self) -> Vec<PanelCommand> {
        self.inner
            .lock()
            .expect("panel state poisoned")
            .commands
            .clone()
    }

    /// Current indicator color.
    pub fn indicator(&self) -> IndicatorColor {
        self.inner.lock().expect("panel state poisoned").indicator
    }

    /// Current alarm state.
    pub fn alarm(&self) -> bool {
        self.inner.lock().expect("panel state poisoned").alarm
    }

    /// Current lock output state.
    pub fn lock_state(&self) -> LockState {
        self.inner.lock().expect("panel state poisoned").lock
    }

    /// Clear the recorded command log (current output states are kept).
    pub fn clear_commands(&self) {
        self.inner
            .lock()
            .expect("panel state poisoned")
            .commands
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_recorded_in_order() {
        let (mut panel, handle) = MockPanel::new();

        panel.set_indicator(IndicatorColor::Red).await.unwrap();
        panel.set_alarm(true).await.unwrap();
        panel.set_lock(LockState::Released).await.unwrap();

        assert_eq!(
            handle.commands(),
            vec![
                PanelCommand::Indicator(IndicatorColor::Red),
                PanelCommand::Alarm(true),
                PanelCommand::Lock(LockState::Released),
            ]
        );
    }

    #[tokio::test]
    async fn test_current_state_tracks_last_command() {
        let (mut panel, handle) = MockPanel::new();

        assert_eq!(handle.indicator(), IndicatorColor::Off);
        assert_eq!(handle.lock_state(), LockState::Engaged);

        panel.set_indicator(IndicatorColor::Blue).await.unwrap();
        panel.set_indicator(IndicatorColor::Green).await.unwrap();
        assert_eq!(handle.indicator(), IndicatorColor::Green);
    }

    #[tokio::test]
    async fn test_clear_commands_keeps_state() {
        let (mut panel, handle) = MockPanel::new();

        panel.set_alarm(true).await.unwrap();
        handle.clear_commands();

        assert!(handle.commands().is_empty());
        assert!(handle.alarm());
    }
}
