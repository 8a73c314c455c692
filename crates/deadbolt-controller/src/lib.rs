//! Access-control controller for a proximity-card door lock.
//!
//! This crate contains the controller core: the access state machine
//! (normal vs. program mode, grant/deny/enroll/revoke), the lifecycle phase
//! machine with explicit blocking and terminal states, the timed wipe
//! confirmation flow, the feedback/output driver, and the boot sequence plus
//! cooperative main loop tying them together over the hardware and storage
//! seams.
//!
//! # Control flow
//!
//! Boot identifies the reader (failure is terminal), loads the credential
//! store, offers the boot-time master-wipe window, then ensures a master
//! credential exists - blocking in a named phase until the first scan if
//! none does. The main loop polls for a scan each iteration, yielding
//! cooperatively; a pending scan goes through the access state machine,
//! otherwise the wipe trigger is sampled for the runtime wipe flow.

pub mod access;
pub mod controller;
pub mod feedback;
pub mod phase;
pub mod wipe;

pub use access::{ControllerState, ScanOutcome, classify, handle_scan};
pub use controller::{Controller, ControllerConfig};
pub use feedback::FeedbackDriver;
pub use phase::{ControllerPhase, PhaseMachine, PhaseTransition};
pub use wipe::{WipeController, WipeOutcome};
