//! Upload-related type definitions
//!
//! Supporting types for the upload state machine.

use serde::{Deserialize, Serialize};

/// Upload workflow state
///
/// ```text
/// Idle → Validating → Encoding → Submitting ─┬─ success → RefreshScheduled → Idle
///                                            └─ failure → Idle
/// ```
///
/// Validation and encoding failures also return straight to `Idle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    /// No upload in flight
    #[default]
    Idle,
    /// Checking file type and size
    Validating,
    /// Reading and base64-encoding the file
    Encoding,
    /// Request sent, waiting for the backend
    Submitting,
    /// Upload succeeded; the delayed refresh has not fired yet
    RefreshScheduled,
}

impl UploadState {
    /// Whether a submission currently owns the upload slot
    ///
    /// `RefreshScheduled` does not: the request has already completed.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            UploadState::Validating | UploadState::Encoding | UploadState::Submitting
        )
    }
}

impl std::fmt::Display for UploadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadState::Idle => write!(f, "idle"),
            UploadState::Validating => write!(f, "validating"),
            UploadState::Encoding => write!(f, "encoding"),
            UploadState::Submitting => write!(f, "submitting"),
            UploadState::RefreshScheduled => write!(f, "refresh-scheduled"),
        }
    }
}
