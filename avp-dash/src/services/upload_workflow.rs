//! Upload state machine
//!
//! `idle → validating → encoding → submitting → {success → refresh-scheduled → idle, failure → idle}`
//!
//! The workflow is the single owner of the upload slot. An upload requested
//! while another is validating, encoding or submitting is ignored, not queued.
//! Uploads may overlap pending refreshes; the slot reads `refresh-scheduled`
//! until the last of them has fired.
//! Every transition is logged and emitted as
//! [`DashboardEvent::UploadStateChanged`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use avp_common::events::{DashboardEvent, EventBus, UploadState};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::encoder;
use super::file_source::FileSource;
use super::file_validator;
use super::refresh_orchestrator::{RefreshOrchestrator, RefreshReport};
use super::upload_submitter::{UploadOutcome, UploadSubmitter};
use crate::error::ValidationError;

/// Handle to the one-shot post-upload refresh
pub type RefreshHandle = JoinHandle<Option<RefreshReport>>;

/// What happened to an upload request
#[derive(Debug)]
pub enum UploadAttempt {
    /// Another upload held the slot; nothing was done
    Ignored,
    /// The file failed validation; no network call was made
    Rejected(ValidationError),
    /// The upload ran to an outcome
    Finished {
        outcome: UploadOutcome,
        /// Scheduled refresh, present on success
        refresh: Option<RefreshHandle>,
    },
}

impl UploadAttempt {
    /// User-facing message, if the attempt produced one
    pub fn message(&self) -> Option<String> {
        match self {
            UploadAttempt::Ignored => None,
            UploadAttempt::Rejected(e) => Some(e.to_string()),
            UploadAttempt::Finished { outcome, .. } => Some(outcome.summary()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadAttempt::Finished { outcome, .. } if outcome.success)
    }
}

/// Message reported when an upload future is dropped before it finishes
pub const CANCELLED_MESSAGE: &str = "Upload cancelled";

/// Drives uploads through validation, encoding, submission and refresh
pub struct UploadWorkflow {
    submitter: UploadSubmitter,
    orchestrator: Arc<RefreshOrchestrator>,
    slot: Arc<UploadSlot>,
    refresh_delay: Duration,
}

impl UploadWorkflow {
    pub fn new(
        submitter: UploadSubmitter,
        orchestrator: Arc<RefreshOrchestrator>,
        events: EventBus,
        refresh_delay: Duration,
    ) -> Self {
        let (state, _) = watch::channel(UploadState::Idle);
        Self {
            submitter,
            orchestrator,
            slot: Arc::new(UploadSlot {
                state,
                pending_refreshes: AtomicUsize::new(0),
                events,
            }),
            refresh_delay,
        }
    }

    /// Current state
    pub fn state(&self) -> UploadState {
        *self.slot.state.borrow()
    }

    /// True while validating, encoding or submitting
    pub fn is_uploading(&self) -> bool {
        self.state().is_busy()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<UploadState> {
        self.slot.state.subscribe()
    }

    /// Run one upload
    ///
    /// Dropping the returned future before it completes releases the slot
    /// and reports the upload as cancelled.
    pub async fn upload<F: FileSource + ?Sized>(&self, file: &F) -> UploadAttempt {
        let upload_id = Uuid::new_v4();

        let Some(claim) = SlotClaim::acquire(&self.slot, upload_id, file.name()) else {
            debug!(file = %file.name(), "Upload already in progress, ignoring");
            return UploadAttempt::Ignored;
        };

        if let Err(e) = file_validator::validate(file) {
            info!(file = %file.name(), reason = %e, "Upload rejected");
            claim.release(false, e.to_string());
            return UploadAttempt::Rejected(e);
        }

        claim.advance(UploadState::Encoding);
        let payload = match encoder::encode(file).await {
            Ok(payload) => payload,
            Err(e) => {
                let outcome = UploadOutcome::failed(e.to_string());
                info!(file = %file.name(), error = %e, "Upload aborted");
                claim.release(false, outcome.summary());
                return UploadAttempt::Finished {
                    outcome,
                    refresh: None,
                };
            }
        };

        claim.advance(UploadState::Submitting);
        let outcome = self.submitter.submit(file.name(), &payload).await;

        if !outcome.success {
            claim.release(false, outcome.summary());
            return UploadAttempt::Finished {
                outcome,
                refresh: None,
            };
        }

        let pending = claim.hand_off(outcome.summary());
        let refresh = self.schedule_refresh(pending);

        UploadAttempt::Finished {
            outcome,
            refresh: Some(refresh),
        }
    }

    /// One-shot refresh; the slot returns to idle once the last pending refresh settles
    fn schedule_refresh(&self, pending: PendingRefresh) -> RefreshHandle {
        let refresh = self.orchestrator.schedule_refresh(self.refresh_delay);

        tokio::spawn(async move {
            let report = refresh.await.ok().flatten();
            drop(pending);
            report
        })
    }
}

/// Upload state plus the number of post-upload refreshes still to fire
///
/// All changes go through the watch sender's lock, so the state and the
/// counter are updated together.
struct UploadSlot {
    state: watch::Sender<UploadState>,
    pending_refreshes: AtomicUsize,
    events: EventBus,
}

impl UploadSlot {
    /// State to settle in when no upload holds the slot
    fn resting_state(&self) -> UploadState {
        if self.pending_refreshes.load(Ordering::SeqCst) > 0 {
            UploadState::RefreshScheduled
        } else {
            UploadState::Idle
        }
    }

    /// Move to the state chosen by `next`, given the current one
    fn transition(&self, upload_id: Uuid, next: impl FnOnce(&Self, UploadState) -> UploadState) {
        let mut change = None;
        self.state.send_if_modified(|state| {
            let new_state = next(self, *state);
            if *state == new_state {
                return false;
            }
            change = Some((*state, new_state));
            *state = new_state;
            true
        });
        if let Some((old_state, new_state)) = change {
            emit_transition(&self.events, upload_id, old_state, new_state);
        }
    }

    fn finished(&self, upload_id: Uuid, filename: &str, success: bool, message: String) {
        self.events.emit_lossy(DashboardEvent::UploadFinished {
            upload_id,
            filename: filename.to_string(),
            success,
            message,
            timestamp: Utc::now(),
        });
    }
}

/// Exclusive hold on the upload slot for one upload
///
/// Released explicitly on every outcome; if the upload future is dropped
/// while holding it, `Drop` releases it as cancelled.
struct SlotClaim<'a> {
    slot: &'a Arc<UploadSlot>,
    upload_id: Uuid,
    filename: String,
    held: bool,
}

impl<'a> SlotClaim<'a> {
    fn acquire(slot: &'a Arc<UploadSlot>, upload_id: Uuid, filename: &str) -> Option<Self> {
        let mut previous = None;
        slot.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            previous = Some(*state);
            *state = UploadState::Validating;
            true
        });
        let previous = previous?;
        emit_transition(&slot.events, upload_id, previous, UploadState::Validating);

        Some(Self {
            slot,
            upload_id,
            filename: filename.to_string(),
            held: true,
        })
    }

    fn advance(&self, new_state: UploadState) {
        self.slot.transition(self.upload_id, |_, _| new_state);
    }

    /// Give up the slot after a failed or rejected upload
    fn release(mut self, success: bool, message: String) {
        self.held = false;
        self.slot.transition(self.upload_id, |slot, _| slot.resting_state());
        self.slot.finished(self.upload_id, &self.filename, success, message);
    }

    /// Hand the slot to a post-upload refresh after a successful upload
    fn hand_off(mut self, message: String) -> PendingRefresh {
        self.held = false;
        self.slot.transition(self.upload_id, |slot, _| {
            slot.pending_refreshes.fetch_add(1, Ordering::SeqCst);
            UploadState::RefreshScheduled
        });
        self.slot.finished(self.upload_id, &self.filename, true, message);
        PendingRefresh {
            slot: Arc::clone(self.slot),
            upload_id: self.upload_id,
        }
    }
}

impl Drop for SlotClaim<'_> {
    fn drop(&mut self) {
        if self.held {
            info!(upload_id = %self.upload_id, file = %self.filename, "Upload cancelled");
            self.slot.transition(self.upload_id, |slot, _| slot.resting_state());
            self.slot
                .finished(self.upload_id, &self.filename, false, CANCELLED_MESSAGE.to_string());
        }
    }
}

/// A scheduled post-upload refresh; settles the slot when dropped
struct PendingRefresh {
    slot: Arc<UploadSlot>,
    upload_id: Uuid,
}

impl Drop for PendingRefresh {
    fn drop(&mut self) {
        self.slot.transition(self.upload_id, |slot, current| {
            let remaining = slot.pending_refreshes.fetch_sub(1, Ordering::SeqCst) - 1;
            // A newer upload may already own the slot
            if remaining == 0 && current == UploadState::RefreshScheduled {
                UploadState::Idle
            } else {
                current
            }
        });
    }
}

fn emit_transition(events: &EventBus, upload_id: Uuid, old_state: UploadState, new_state: UploadState) {
    debug!(%upload_id, %old_state, %new_state, "Upload state changed");
    events.emit_lossy(DashboardEvent::UploadStateChanged {
        upload_id,
        old_state,
        new_state,
        timestamp: Utc::now(),
    });
}
