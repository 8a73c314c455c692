//! Mock wipe trigger button.

use crate::{Result, traits::WipeTrigger};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ButtonInner {
    level: bool,
    script: VecDeque<bool>,
}

/// Mock wipe trigger with a settable level and an optional scripted sample
/// sequence.
///
/// When a script is present, each `is_active` call consumes one scripted
/// sample; once the script is exhausted the steady level applies again.
/// Scripting samples one-by-one mirrors how the wipe controller actually
/// observes the trigger: as a series of instantaneous level reads.
///
/// # Examples
///
/// ```
/// use deadbolt_hardware::mock::MockWipeButton;
/// use deadbolt_hardware::traits::WipeTrigger;
///
/// #[tokio::main]
/// async fn main() -> deadbolt_hardware::Result<()> {
///     let (mut button, handle) = MockWipeButton::new();
///
///     assert!(!button.is_active().await?);
///
///     handle.script([true, true, false]);
///     assert!(button.is_active().await?);
///     assert!(button.is_active().await?);
///     assert!(!button.is_active().await?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWipeButton {
    inner: Arc<Mutex<ButtonInner>>,
}

impl MockWipeButton {
    /// Create a released (inactive) mock button.
    pub fn new() -> (Self, MockWipeButtonHandle) {
        let inner = Arc::new(Mutex::new(ButtonInner {
            level: false,
            script: VecDeque::new(),
        }));

        (
            Self {
                inner: inner.clone(),
            },
            MockWipeButtonHandle { inner },
        )
    }
}

impl WipeTrigger for MockWipeButton {
    async fn is_active(&mut self) -> Result<bool> {
        let mut inner = self.inner.lock().expect("button state poisoned");
        Ok(inner.script.pop_front().unwrap_or(inner.level))
    }
}

/// Handle for controlling a [`MockWipeButton`].
#[derive(Debug, Clone)]
pub struct MockWipeButtonHandle {
    inner: Arc<Mutex<ButtonInner>>,
}

impl MockWipeButtonHandle {
    /// Set the steady trigger level (applies when no script is queued).
    pub fn set_active(&self, active: bool) {
        self.inner.lock().expect("button state poisoned").level = active;
    }

    /// Queue a sequence of samples consumed one per `is_active` call.
    pub fn script(&self, samples: impl IntoIterator<Item = bool>) {
        self.inner
            .lock()
            .expect("button state poisoned")
            .script
            .extend(samples);
    }

    /// Number of scripted samples not yet consumed.
    pub fn remaining_script(&self) -> usize {
        self.inner.lock().expect("button state poisoned").script.len()
    }
}
