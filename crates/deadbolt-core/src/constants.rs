//! Core constants for the door lock controller.
//!
//! These constants centralize the timing and storage parameters shared by the
//! controller, feedback driver and credential store. All durations are wall
//! clock milliseconds; window arithmetic on the monotonic counter must use
//! wraparound-safe subtraction (see `deadbolt-hardware::clock`).

// ============================================================================
// Credential tokens
// ============================================================================

/// Length of a credential token in bytes.
///
/// Tokens are SHA-256 digests of the raw card identifier, so they are always
/// exactly 32 bytes regardless of how many bytes the reader produced.
pub const TOKEN_LENGTH: usize = 32;

// ============================================================================
// Persistent storage
// ============================================================================

/// Name of the persisted credential collection.
///
/// The record store saves the full credential sequence under this name on
/// every mutation. Absence of the blob is valid and means an empty store.
pub const CREDENTIALS_BLOB: &str = "credentials.json";

// ============================================================================
// Wipe confirmation window
// ============================================================================

/// Duration of the wipe confirmation window (milliseconds).
///
/// The physical wipe trigger must be held for this long, sampled at
/// [`WIPE_SAMPLE_MS`] cadence, before a bulk wipe is executed. Releasing the
/// trigger at any sampled instant aborts the wipe.
///
/// # Value: 8000ms (8 seconds)
pub const WIPE_CONFIRM_MS: u32 = 8000;

/// Sampling cadence of the wipe trigger during the confirmation window
/// (milliseconds).
///
/// A release shorter than one sampling interval can be missed. This is an
/// accepted limitation of the sampling-based protocol, not a defect.
///
/// # Value: 500ms
pub const WIPE_SAMPLE_MS: u32 = 500;

// ============================================================================
// Lock timing
// ============================================================================

/// How long the lock output stays released after a granted access
/// (milliseconds) before it re-engages.
///
/// # Value: 5000ms (5 seconds)
pub const LOCK_HOLD_MS: u64 = 5000;

/// Idle delay between main-loop polls when no card is in the field
/// (milliseconds).
///
/// Keeps the cooperative loop from spinning hot; short enough that a
/// presented card is never perceptibly missed.
pub const POLL_IDLE_MS: u64 = 50;

// ============================================================================
// Feedback timing
// ============================================================================

/// Half-period of an indicator blink (milliseconds).
pub const FEEDBACK_BLINK_MS: u64 = 200;

/// How long the denied indication stays on (milliseconds).
pub const DENY_HOLD_MS: u64 = 1000;

/// How long the "master defined, ready" indication stays on (milliseconds).
pub const READY_HOLD_MS: u64 = 2000;

/// Half-period of the repeating reader fault indication (milliseconds).
pub const FAULT_CYCLE_MS: u64 = 500;

/// Number of blinks in a write/delete acknowledgement sequence.
pub const ACK_BLINK_COUNT: u8 = 3;
