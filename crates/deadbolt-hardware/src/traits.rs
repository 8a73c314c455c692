//! Hardware device trait definitions.
//!
//! These traits establish the contract between the controller core and its
//! physical collaborators, enabling substitution between mock and real
//! hardware implementations. All traits use native `async fn` methods
//! (Edition 2024 RPITIT), so they are not object-safe; use generic type
//! parameters as shown in the examples.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{IndicatorColor, LockState};

/// A single card presentation captured by the reader.
///
/// Carries the raw transport identifier exactly as the reader produced it.
/// The observed hardware emits 4-byte identifiers, but no part of the system
/// assumes a specific length - the identifier is digested into a fixed-length
/// token before any storage or comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardScan {
    /// Raw card identifier bytes (length is reader-defined).
    pub raw_id: Vec<u8>,

    /// Timestamp when the card was read.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CardScan {
    /// Create a scan with the current timestamp.
    ///
    /// # Errors
    /// Returns an error if the identifier is empty.
    pub fn new(raw_id: Vec<u8>) -> Result<Self> {
        if raw_id.is_empty() {
            return Err(crate::HardwareError::invalid_data(
                "card identifier cannot be empty",
            ));
        }
        Ok(Self {
            raw_id,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Get the identifier as a hexadecimal string.
    #[must_use]
    pub fn id_hex(&self) -> String {
        self.raw_id
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Reader identification, returned by a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }
}

/// Proximity-card reader abstraction.
///
/// # Examples
///
/// ```no_run
/// use deadbolt_hardware::traits::CardReader;
/// use deadbolt_hardware::error::Result;
///
/// async fn next_scan<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
///     Ok(reader.poll().await?.map(|scan| scan.id_hex()))
/// }
/// ```
pub trait CardReader: Send + Sync {
    /// Non-blocking check for a presented card.
    ///
    /// Returns `Ok(None)` when no card is in the field, or the scan data
    /// when one is. This never waits for a card.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while checking
    /// for card presence.
    async fn poll(&mut self) -> Result<Option<CardScan>>;

    /// Identify the reader hardware.
    ///
    /// Called once at boot. A failure here means the reader did not respond
    /// sensibly and the controller must not proceed.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ProbeFailed` if the reader cannot be
    /// identified.
    async fn probe(&mut self) -> Result<ReaderInfo>;
}

/// Output panel abstraction: indicator, alarm and lock lines.
///
/// The three calls are independent at this level even though the physical
/// hardware multiplexes them onto a shared line set.
pub trait ControlPanel: Send + Sync {
    /// Set the status indicator color.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn set_indicator(&mut self, color: IndicatorColor) -> Result<()>;

    /// Switch the audible alarm on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn set_alarm(&mut self, on: bool) -> Result<()>;

    /// Drive the lock output.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn set_lock(&mut self, state: LockState) -> Result<()>;
}

/// Physical wipe trigger abstraction.
///
/// Sampled, not event-driven: the wipe controller reads the level at a fixed
/// cadence, so a release shorter than one sampling interval can be missed.
/// No debouncing happens beyond that cadence.
pub trait WipeTrigger: Send + Sync {
    /// Sample the trigger level.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn is_active(&mut self) -> Result<bool>;
}
