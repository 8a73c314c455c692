//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator colors for the three-color status indicator.
///
/// The physical encoding onto the shared multiplexed output lines is the
/// panel implementation's concern; the controller only names the abstract
/// color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    /// Indicator off.
    Off,

    /// Red indicator (denied, failure, fault).
    Red,

    /// Green indicator (granted, write acknowledged).
    Green,

    /// Blue indicator (standby, delete acknowledged).
    Blue,
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IndicatorColor::Off => write!(f, "off"),
            IndicatorColor::Red => write!(f, "red"),
            IndicatorColor::Green => write!(f, "green"),
            IndicatorColor::Blue => write!(f, "blue"),
        }
    }
}

/// State of the relay-style lock output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// Lock energized; door held shut.
    Engaged,

    /// Lock released; door can be opened.
    Released,
}

impl LockState {
    /// Returns `true` if the door can currently be opened.
    #[inline]
    #[must_use]
    pub fn is_released(self) -> bool {
        matches!(self, LockState::Released)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockState::Engaged => write!(f, "engaged"),
            LockState::Released => write!(f, "released"),
        }
    }
}
