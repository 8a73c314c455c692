//! Access state machine: credential classification and the mode transition
//! table.
//!
//! The master role is deliberately overloaded as both "administrator
//! identity" and "mode toggle key": scanning a master token always flips
//! between normal and program mode, whatever the current mode, and never
//! grants, denies, enrolls or revokes. This single-master-as-toggle design
//! is preserved exactly; program-mode enrollment only ever writes the user
//! role, so a second master token cannot appear through the normal flow.
//!
//! | Mode    | Classification | Next mode | Action                       |
//! |---------|----------------|-----------|------------------------------|
//! | Normal  | KnownMaster    | Program   | report record count          |
//! | Program | KnownMaster    | Normal    | -                            |
//! | Normal  | KnownUser      | Normal    | grant (lock release cycle)   |
//! | Normal  | Unknown        | Normal    | deny                         |
//! | Program | KnownUser      | Program   | revoke the credential        |
//! | Program | Unknown        | Program   | enroll as user               |

use deadbolt_core::{AccessMode, Classification, CredentialToken, FeedbackEvent, Role};
use deadbolt_store::{CredentialStore, StorageBackend, StoreError};
use tracing::{info, warn};

use crate::phase::PhaseMachine;

/// The controller's mutable state, owned by the control loop and passed by
/// reference into the step function. No process-wide statics.
#[derive(Debug)]
pub struct ControllerState {
    /// Current access mode. Starts `Normal`.
    pub mode: AccessMode,

    /// Lifecycle phase tracker.
    pub phase: PhaseMachine,
}

impl ControllerState {
    /// Create the initial state: normal mode, booting phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: AccessMode::Normal,
            phase: PhaseMachine::new(),
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Decision reached for a single scan.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Master scan in normal mode: enrollment mode entered.
    ProgramEntered {
        /// Record count at the moment of entry, reported to the operator.
        records: usize,
    },

    /// Master scan in program mode: back to normal service.
    ProgramExited,

    /// Known user in normal mode: open the door.
    AccessGranted,

    /// Unknown token in normal mode.
    AccessDenied,

    /// Unknown token in program mode: enrolled as user.
    Enrolled,

    /// Enrollment write failed.
    EnrollFailed(StoreError),

    /// Known user in program mode: credential revoked.
    Revoked,

    /// Revocation write failed.
    RevokeFailed(StoreError),
}

impl ScanOutcome {
    /// The feedback event this outcome renders as.
    #[must_use]
    pub fn feedback(&self) -> FeedbackEvent {
        match self {
            ScanOutcome::ProgramEntered { .. } => FeedbackEvent::ProgramEntered,
            ScanOutcome::ProgramExited => FeedbackEvent::ProgramExited,
            ScanOutcome::AccessGranted => FeedbackEvent::Granted,
            ScanOutcome::AccessDenied => FeedbackEvent::Denied,
            ScanOutcome::Enrolled => FeedbackEvent::WriteSuccess,
            ScanOutcome::Revoked => FeedbackEvent::DeleteSuccess,
            ScanOutcome::EnrollFailed(_) | ScanOutcome::RevokeFailed(_) => {
                FeedbackEvent::WriteFailed
            }
        }
    }
}

/// Classify a scanned token against the store.
#[must_use]
pub fn classify<B: StorageBackend>(
    store: &CredentialStore<B>,
    token: &CredentialToken,
) -> Classification {
    Classification::from(store.find(token))
}

/// Process one scanned token: update the mode and/or the store, and return
/// the decision. Store write errors are absorbed into the outcome here -
/// nothing propagates out of the control loop.
pub fn handle_scan<B: StorageBackend>(
    state: &mut ControllerState,
    store: &mut CredentialStore<B>,
    token: &CredentialToken,
) -> ScanOutcome {
    let classification = classify(store, token);
    info!(token = %token, %classification, mode = %state.mode, "scan");

    match (state.mode, classification) {
        // A master scan always toggles the mode, never touches the store.
        (_, Classification::KnownMaster) => {
            state.mode = state.mode.toggled();
            if state.mode.is_program() {
                let records = store.len();
                info!(records, "entered program mode");
                ScanOutcome::ProgramEntered { records }
            } else {
                info!("exited program mode");
                ScanOutcome::ProgramExited
            }
        }

        (AccessMode::Normal, Classification::KnownUser) => ScanOutcome::AccessGranted,

        (AccessMode::Normal, Classification::Unknown) => ScanOutcome::AccessDenied,

        (AccessMode::Program, Classification::Unknown) => {
            match store.add(*token, Role::User) {
                Ok(()) => ScanOutcome::Enrolled,
                Err(e) => {
                    warn!(error = %e, "enrollment failed");
                    ScanOutcome::EnrollFailed(e)
                }
            }
        }

        (AccessMode::Program, Classification::KnownUser) => match store.remove(token) {
            Ok(_) => ScanOutcome::Revoked,
            Err(e) => {
                warn!(error = %e, "revocation failed");
                ScanOutcome::RevokeFailed(e)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadbolt_core::{Sha256Digest, TokenDigest};
    use deadbolt_store::MemoryBackend;

    fn token(seed: u8) -> CredentialToken {
        Sha256Digest.digest(&[seed; 4])
    }

    fn store_with(records: &[(u8, Role)]) -> CredentialStore<MemoryBackend> {
        let mut store = CredentialStore::open(MemoryBackend::new(), "credentials.json");
        for (seed, role) in records {
            store.add(token(*seed), *role).unwrap();
        }
        store
    }

    #[test]
    fn test_master_toggles_into_program_and_back_without_mutation() {
        let mut state = ControllerState::new();
        let mut store = store_with(&[(1, Role::Master), (2, Role::User)]);
        let len_before = store.len();

        let outcome = handle_scan(&mut state, &mut store, &token(1));
        assert!(matches!(outcome, ScanOutcome::ProgramEntered { records: 2 }));
        assert_eq!(state.mode, AccessMode::Program);

        // Same master token again: back to normal, still no store mutation.
        let outcome = handle_scan(&mut state, &mut store, &token(1));
        assert!(matches!(outcome, ScanOutcome::ProgramExited));
        assert_eq!(state.mode, AccessMode::Normal);
        assert_eq!(store.len(), len_before);
    }

    #[test]
    fn test_known_user_granted_in_normal_mode() {
        let mut state = ControllerState::new();
        let mut store = store_with(&[(1, Role::Master), (2, Role::User)]);

        let outcome = handle_scan(&mut state, &mut store, &token(2));
        assert!(matches!(outcome, ScanOutcome::AccessGranted));
        assert_eq!(state.mode, AccessMode::Normal);
    }

    #[test]
    fn test_unknown_denied_in_normal_mode_store_unchanged() {
        let mut state = ControllerState::new();
        let mut store = store_with(&[(1, Role::Master), (2, Role::User)]);

        let outcome = handle_scan(&mut state, &mut store, &token(9));
        assert!(matches!(outcome, ScanOutcome::AccessDenied));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_enroll_then_revoke_in_program_mode() {
        let mut state = ControllerState::new();
        let mut store = store_with(&[(1, Role::Master)]);

        // Enter program mode via the master.
        handle_scan(&mut state, &mut store, &token(1));

        // Unknown token: enrolled as user.
        let outcome = handle_scan(&mut state, &mut store, &token(4));
        assert!(matches!(outcome, ScanOutcome::Enrolled));
        assert_eq!(outcome.feedback(), FeedbackEvent::WriteSuccess);
        assert_eq!(store.find(&token(4)), Some(Role::User));
        assert_eq!(state.mode, AccessMode::Program);

        // Same token again: revoked.
        let outcome = handle_scan(&mut state, &mut store, &token(4));
        assert!(matches!(outcome, ScanOutcome::Revoked));
        assert_eq!(outcome.feedback(), FeedbackEvent::DeleteSuccess);
        assert_eq!(store.find(&token(4)), None);

        // Store back to just the master.
        assert_eq!(store.len(), 1);
        assert!(store.has_role(Role::Master));
    }

    #[test]
    fn test_enroll_failure_surfaces_as_write_failed() {
        let mut state = ControllerState::new();
        let mut store = store_with(&[(1, Role::Master)]);
        handle_scan(&mut state, &mut store, &token(1));

        store.backend_mut().fail_saves(true);
        let outcome = handle_scan(&mut state, &mut store, &token(4));
        assert!(matches!(outcome, ScanOutcome::EnrollFailed(_)));
        assert_eq!(outcome.feedback(), FeedbackEvent::WriteFailed);
        // Rolled back: the token is still unknown.
        assert_eq!(store.find(&token(4)), None);
    }

    #[test]
    fn test_classification() {
        let store = store_with(&[(1, Role::Master), (2, Role::User)]);
        assert_eq!(classify(&store, &token(1)), Classification::KnownMaster);
        assert_eq!(classify(&store, &token(2)), Classification::KnownUser);
        assert_eq!(classify(&store, &token(3)), Classification::Unknown);
    }
}
