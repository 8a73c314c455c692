//! Controller phase machine.
//!
//! The controller's blocking and terminal loops are modeled as named phases
//! rather than ad hoc infinite loops, so tests can assert "the controller is
//! in blocking state X" without executing forever:
//!
//! - `Booting`: reader probe, store load, boot wipe window.
//! - `AwaitingMasterEnrollment`: blocking - no master credential defined;
//!   polls until the first successful scan.
//! - `Running`: normal service loop.
//! - `Halted`: terminal - entered after a confirmed boot wipe removed the
//!   master record; the operator must power-cycle to re-enroll.
//! - `ReaderFault`: terminal - the reader failed identification at boot;
//!   the fault feedback sequence repeats forever.
//!
//! # Valid Transitions
//!
//! - Booting → AwaitingMasterEnrollment | Running | Halted | ReaderFault
//! - AwaitingMasterEnrollment → Running
//!
//! `Halted` and `ReaderFault` have no outgoing edges.

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use deadbolt_core::{Error, Result};

/// Maximum number of phase transitions kept for diagnostics.
///
/// A full controller lifetime sees at most a handful of transitions; the cap
/// only matters if a future phase graph ever gains cycles.
const MAX_HISTORY_SIZE: usize = 32;

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// Boot sequence in progress.
    Booting,

    /// Blocking: waiting for the first master credential scan.
    AwaitingMasterEnrollment,

    /// Normal service: polling for scans and the wipe trigger.
    Running,

    /// Terminal: boot wipe removed the master record; power-cycle required.
    Halted,

    /// Terminal: reader identification failed at boot.
    ReaderFault,
}

impl ControllerPhase {
    /// Check if transition to target phase is valid from this phase.
    pub fn can_transition_to(&self, target: &ControllerPhase) -> bool {
        matches!(
            (self, target),
            (
                ControllerPhase::Booting,
                ControllerPhase::AwaitingMasterEnrollment
                    | ControllerPhase::Running
                    | ControllerPhase::Halted
                    | ControllerPhase::ReaderFault
            ) | (
                ControllerPhase::AwaitingMasterEnrollment,
                ControllerPhase::Running
            )
        )
    }

    /// Returns `true` for phases that never exit.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ControllerPhase::Halted | ControllerPhase::ReaderFault)
    }

    /// Returns `true` for the deliberate blocking-wait phase.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, ControllerPhase::AwaitingMasterEnrollment)
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerPhase::Booting => "Booting",
            ControllerPhase::AwaitingMasterEnrollment => "AwaitingMasterEnrollment",
            ControllerPhase::Running => "Running",
            ControllerPhase::Halted => "Halted",
            ControllerPhase::ReaderFault => "ReaderFault",
        };
        write!(f, "{name}")
    }
}

/// A single recorded phase transition.
#[derive(Debug, Clone)]
pub struct PhaseTransition {
    /// The phase transitioned from.
    pub from: ControllerPhase,

    /// The phase transitioned to.
    pub to: ControllerPhase,

    /// When the transition occurred.
    pub timestamp: Instant,
}

impl PhaseTransition {
    fn new(from: ControllerPhase, to: ControllerPhase) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Phase tracker enforcing the transition graph.
#[derive(Debug)]
pub struct PhaseMachine {
    current: ControllerPhase,
    entered_at: Instant,
    history: VecDeque<PhaseTransition>,
}

impl PhaseMachine {
    /// Create a machine in the `Booting` phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ControllerPhase::Booting,
            entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn current(&self) -> ControllerPhase {
        self.current
    }

    /// Time spent in the current phase.
    #[must_use]
    pub fn time_in_phase(&self) -> std::time::Duration {
        self.entered_at.elapsed()
    }

    /// Recorded transitions, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Transition to a new phase, validating the edge.
    ///
    /// # Errors
    /// Returns `Error::InvalidPhaseTransition` if the edge is not in the
    /// phase graph.
    pub fn transition_to(&mut self, target: ControllerPhase) -> Result<PhaseTransition> {
        if !self.current.can_transition_to(&target) {
            return Err(Error::InvalidPhaseTransition {
                from: self.current.to_string(),
                to: target.to_string(),
            });
        }

        let transition = PhaseTransition::new(self.current, target);
        self.current = target;
        self.entered_at = Instant::now();

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_booting() {
        let machine = PhaseMachine::new();
        assert_eq!(machine.current(), ControllerPhase::Booting);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_boot_to_running() {
        let mut machine = PhaseMachine::new();
        let transition = machine.transition_to(ControllerPhase::Running).unwrap();
        assert_eq!(transition.from, ControllerPhase::Booting);
        assert_eq!(transition.to, ControllerPhase::Running);
        assert_eq!(machine.current(), ControllerPhase::Running);
    }

    #[test]
    fn test_boot_to_await_master_to_running() {
        let mut machine = PhaseMachine::new();
        machine
            .transition_to(ControllerPhase::AwaitingMasterEnrollment)
            .unwrap();
        assert!(machine.current().is_blocking());
        machine.transition_to(ControllerPhase::Running).unwrap();
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn test_terminal_phases_have_no_exit() {
        for terminal in [ControllerPhase::Halted, ControllerPhase::ReaderFault] {
            assert!(terminal.is_terminal());
            for target in [
                ControllerPhase::Booting,
                ControllerPhase::AwaitingMasterEnrollment,
                ControllerPhase::Running,
                ControllerPhase::Halted,
                ControllerPhase::ReaderFault,
            ] {
                assert!(!terminal.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut machine = PhaseMachine::new();
        machine.transition_to(ControllerPhase::Halted).unwrap();

        let result = machine.transition_to(ControllerPhase::Running);
        assert!(result.is_err());
        assert_eq!(machine.current(), ControllerPhase::Halted);
    }

    #[test]
    fn test_running_cannot_reenter_boot_states() {
        let mut machine = PhaseMachine::new();
        machine.transition_to(ControllerPhase::Running).unwrap();
        assert!(
            machine
                .transition_to(ControllerPhase::AwaitingMasterEnrollment)
                .is_err()
        );
        assert!(machine.transition_to(ControllerPhase::Booting).is_err());
    }

    #[test]
    fn test_phase_serialization() {
        let phase = ControllerPhase::AwaitingMasterEnrollment;
        let json = serde_json::to_string(&phase).unwrap();
        assert_eq!(json, "\"awaiting_master_enrollment\"");
        let back: ControllerPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phase);
    }
}
