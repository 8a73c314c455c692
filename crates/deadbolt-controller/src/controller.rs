//! Boot sequence and cooperative main loop.

use std::time::Duration;

use deadbolt_core::{FeedbackEvent, Role, TokenDigest};
use deadbolt_core::constants::{
    CREDENTIALS_BLOB, LOCK_HOLD_MS, POLL_IDLE_MS, WIPE_CONFIRM_MS, WIPE_SAMPLE_MS,
};
use deadbolt_hardware::{CardReader, CardScan, ControlPanel, MillisClock, WipeTrigger};
use deadbolt_store::{CredentialStore, StorageBackend};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::access::{self, ControllerState};
use crate::feedback::FeedbackDriver;
use crate::phase::ControllerPhase;
use crate::wipe::{WipeController, WipeOutcome};

/// Controller configuration.
///
/// Defaults come from the shared constants; override per deployment with the
/// builder-style setters.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Name of the persisted credential blob.
    pub store_blob: String,

    /// Wipe confirmation window (milliseconds).
    pub wipe_confirm_ms: u32,

    /// Wipe trigger sampling cadence (milliseconds).
    pub wipe_sample_ms: u32,

    /// How long the lock stays released after a grant.
    pub lock_hold: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            store_blob: CREDENTIALS_BLOB.to_string(),
            wipe_confirm_ms: WIPE_CONFIRM_MS,
            wipe_sample_ms: WIPE_SAMPLE_MS,
            lock_hold: Duration::from_millis(LOCK_HOLD_MS),
        }
    }
}

impl ControllerConfig {
    /// Set the credential blob name.
    #[must_use]
    pub fn with_store_blob(mut self, name: impl Into<String>) -> Self {
        self.store_blob = name.into();
        self
    }

    /// Set the wipe window and sampling cadence.
    #[must_use]
    pub fn with_wipe_window(mut self, confirm_ms: u32, sample_ms: u32) -> Self {
        self.wipe_confirm_ms = confirm_ms;
        self.wipe_sample_ms = sample_ms;
        self
    }

    /// Set the lock hold duration.
    #[must_use]
    pub fn with_lock_hold(mut self, hold: Duration) -> Self {
        self.lock_hold = hold;
        self
    }
}

/// The door lock controller.
///
/// Owns every collaborator: reader, output panel (via the feedback driver),
/// wipe trigger, credential store, digest and clock. Single-threaded
/// cooperative execution - there are no concurrent mutators of the store or
/// the access mode, so no locking is involved anywhere.
pub struct Controller<R, P, W, B, D, C>
where
    R: CardReader,
    P: ControlPanel,
    W: WipeTrigger,
    B: StorageBackend,
    D: TokenDigest,
    C: MillisClock,
{
    reader: R,
    trigger: W,
    digest: D,
    store: CredentialStore<B>,
    feedback: FeedbackDriver<P>,
    wipe: WipeController<C>,
    state: ControllerState,
}

impl<R, P, W, B, D, C> Controller<R, P, W, B, D, C>
where
    R: CardReader,
    P: ControlPanel,
    W: WipeTrigger,
    B: StorageBackend,
    D: TokenDigest,
    C: MillisClock,
{
    /// Assemble a controller. The credential store is loaded here (fail-soft),
    /// everything else waits for [`run`](Self::run) or [`step`](Self::step).
    pub fn new(
        reader: R,
        panel: P,
        trigger: W,
        backend: B,
        digest: D,
        clock: C,
        config: ControllerConfig,
    ) -> Self {
        let store = CredentialStore::open(backend, config.store_blob.clone());
        let feedback = FeedbackDriver::new(panel).with_lock_hold(config.lock_hold);
        let wipe =
            WipeController::new(clock).with_window(config.wipe_confirm_ms, config.wipe_sample_ms);

        Self {
            reader,
            trigger,
            digest,
            store,
            feedback,
            wipe,
            state: ControllerState::new(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        self.state.phase.current()
    }

    /// Current access mode.
    #[must_use]
    pub fn mode(&self) -> deadbolt_core::AccessMode {
        self.state.mode
    }

    /// The credential store (inspection).
    #[must_use]
    pub fn store(&self) -> &CredentialStore<B> {
        &self.store
    }

    /// Run the controller forever.
    ///
    /// Every iteration yields to the runtime before doing any work - the
    /// cooperative liveness requirement of the single-task design. The two
    /// terminal phases never exit this loop: `Halted` idles (operator must
    /// power-cycle) and `ReaderFault` repeats the fault feedback sequence.
    pub async fn run(&mut self) {
        loop {
            tokio::task::yield_now().await;
            self.step().await;
        }
    }

    /// Execute one cooperative slice of the control loop.
    ///
    /// What a slice does depends on the current phase; [`run`](Self::run) is
    /// nothing but this in a loop. Tests drive the controller through here
    /// so blocking phases can be asserted without spinning.
    pub async fn step(&mut self) {
        match self.state.phase.current() {
            ControllerPhase::Booting => self.boot().await,
            ControllerPhase::AwaitingMasterEnrollment => self.await_master_slice().await,
            ControllerPhase::Running => self.service_slice().await,
            ControllerPhase::Halted => {
                sleep(Duration::from_millis(POLL_IDLE_MS)).await;
            }
            ControllerPhase::ReaderFault => {
                if let Err(e) = self.feedback.render_fault_cycle().await {
                    warn!(error = %e, "fault feedback render failed");
                }
            }
        }
    }

    /// Boot sequence: reader identification, boot wipe window, master check.
    async fn boot(&mut self) {
        info!(records = self.store.len(), "controller booting");

        match self.reader.probe().await {
            Ok(reader) => {
                info!(name = %reader.name, firmware = ?reader.firmware_version, "reader identified");
            }
            Err(e) => {
                error!(error = %e, "reader identification failed, entering fault loop");
                self.transition(ControllerPhase::ReaderFault);
                return;
            }
        }

        // Boot-time wipe window: held trigger gates deletion of the master
        // record only. Confirmed means the controller halts afterwards -
        // it must never run silently without a master.
        if self.trigger_active().await
            && self.wipe.confirm(&mut self.trigger, &mut self.feedback).await
                == WipeOutcome::Confirmed
        {
            match self.store.remove_where(|r| r.role == Role::Master) {
                Ok(removed) => {
                    warn!(removed, "master credential wiped at boot");
                    self.render(FeedbackEvent::Idle).await;
                    self.render(FeedbackEvent::DeleteSuccess).await;
                }
                Err(e) => {
                    warn!(error = %e, "master wipe could not be persisted");
                    self.render(FeedbackEvent::Idle).await;
                    self.render(FeedbackEvent::WriteFailed).await;
                }
            }
            self.transition(ControllerPhase::Halted);
            return;
        }

        if self.store.has_role(Role::Master) {
            self.render(FeedbackEvent::MasterDefinedReady).await;
            self.transition(ControllerPhase::Running);
        } else {
            info!("no master credential defined, waiting for first enrollment");
            self.transition(ControllerPhase::AwaitingMasterEnrollment);
        }
    }

    /// One iteration of the blocking first-master enrollment wait.
    ///
    /// The first successful scan is written unconditionally as master and
    /// ends the wait; everything else renders the waiting blink and returns.
    async fn await_master_slice(&mut self) {
        match self.reader.poll().await {
            Ok(Some(scan)) => {
                let token = self.digest.digest(&scan.raw_id);
                match self.store.enroll_master(token) {
                    Ok(()) => {
                        info!(token = %token, "first master credential enrolled");
                        self.render(FeedbackEvent::MasterDefinedReady).await;
                        self.transition(ControllerPhase::Running);
                    }
                    Err(e) => {
                        warn!(error = %e, "master enrollment could not be persisted");
                        self.render(FeedbackEvent::WriteFailed).await;
                    }
                }
            }
            Ok(None) => self.render(FeedbackEvent::WaitingEnrollMaster).await,
            Err(e) => {
                warn!(error = %e, "reader poll failed while awaiting enrollment");
                self.render(FeedbackEvent::WaitingEnrollMaster).await;
            }
        }
    }

    /// One iteration of normal service: a pending scan goes through the
    /// access state machine; otherwise the wipe trigger is sampled.
    async fn service_slice(&mut self) {
        match self.reader.poll().await {
            Ok(Some(scan)) => self.handle_scan(scan).await,
            Ok(None) => {
                if self.trigger_active().await {
                    self.runtime_wipe().await;
                } else {
                    sleep(Duration::from_millis(POLL_IDLE_MS)).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "reader poll failed");
                sleep(Duration::from_millis(POLL_IDLE_MS)).await;
            }
        }
    }

    async fn handle_scan(&mut self, scan: CardScan) {
        let token = self.digest.digest(&scan.raw_id);
        let outcome = access::handle_scan(&mut self.state, &mut self.store, &token);
        self.render(outcome.feedback()).await;
    }

    /// Runtime wipe flow: deletes all non-master records after a confirmed
    /// window. Unlike the boot wipe, the controller keeps running.
    async fn runtime_wipe(&mut self) {
        if self.wipe.confirm(&mut self.trigger, &mut self.feedback).await != WipeOutcome::Confirmed
        {
            return;
        }

        match self.store.remove_where(|r| r.role != Role::Master) {
            Ok(removed) => {
                info!(removed, "user credentials wiped");
                self.render(FeedbackEvent::Idle).await;
                self.render(FeedbackEvent::DeleteSuccess).await;
            }
            Err(e) => {
                warn!(error = %e, "user wipe could not be persisted");
                self.render(FeedbackEvent::Idle).await;
                self.render(FeedbackEvent::WriteFailed).await;
            }
        }
    }

    async fn trigger_active(&mut self) -> bool {
        self.trigger.is_active().await.unwrap_or(false)
    }

    async fn render(&mut self, event: FeedbackEvent) {
        if let Err(e) = self.feedback.render(event).await {
            warn!(%event, error = %e, "feedback render failed");
        }
    }

    fn transition(&mut self, target: ControllerPhase) {
        match self.state.phase.transition_to(target) {
            Ok(t) => info!(from = %t.from, to = %t.to, "phase transition"),
            Err(e) => error!(error = %e, "phase transition rejected"),
        }
    }
}
