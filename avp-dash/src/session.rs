//! Interactive dashboard session state
//!
//! Single owner of the UI state that is not upload progress: drag state,
//! the open detail view, and the notice from the last upload.

use std::sync::Arc;

use avp_common::models::{ImageCard, ImageRecord};

use crate::services::{FileSource, UploadAttempt, UploadWorkflow};

/// Whether a drag is hovering over the drop zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Inactive,
    Active,
}

/// Message left by the last upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNotice {
    pub success: bool,
    pub message: String,
}

/// Per-user dashboard session
pub struct DashboardSession {
    workflow: Arc<UploadWorkflow>,
    drag: DragState,
    selection: Option<ImageCard>,
    last_notice: Option<UploadNotice>,
}

impl DashboardSession {
    pub fn new(workflow: Arc<UploadWorkflow>) -> Self {
        Self {
            workflow,
            drag: DragState::Inactive,
            selection: None,
            last_notice: None,
        }
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn drag_enter(&mut self) {
        self.drag = DragState::Active;
    }

    pub fn drag_over(&mut self) {
        self.drag = DragState::Active;
    }

    pub fn drag_leave(&mut self) {
        self.drag = DragState::Inactive;
    }

    /// Handle dropped files
    ///
    /// Ignored entirely while an upload is in flight (drag state untouched).
    /// Otherwise the drag ends and the first file, if any, is uploaded.
    pub async fn drop_files(&mut self, files: &[Box<dyn FileSource>]) -> UploadAttempt {
        if self.workflow.is_uploading() {
            return UploadAttempt::Ignored;
        }
        self.drag = DragState::Inactive;

        match files.first() {
            Some(file) => self.upload(&**file).await,
            None => UploadAttempt::Ignored,
        }
    }

    /// Upload a selected file
    pub async fn upload<F: FileSource + ?Sized>(&mut self, file: &F) -> UploadAttempt {
        if self.workflow.is_uploading() {
            return UploadAttempt::Ignored;
        }
        self.last_notice = None;

        let attempt = self.workflow.upload(file).await;
        self.last_notice = match &attempt {
            UploadAttempt::Ignored => None,
            UploadAttempt::Rejected(e) => Some(UploadNotice {
                success: false,
                message: e.to_string(),
            }),
            UploadAttempt::Finished { outcome, .. } => Some(UploadNotice {
                success: outcome.success,
                message: outcome.summary(),
            }),
        };
        attempt
    }

    pub fn last_notice(&self) -> Option<&UploadNotice> {
        self.last_notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.last_notice = None;
    }

    /// Open the detail view for the record at `index` in the canonical list
    pub fn open(&mut self, record: &ImageRecord, index: usize) {
        self.selection = Some(ImageCard::from_record(record, index));
    }

    pub fn close(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&ImageCard> {
        self.selection.as_ref()
    }
}
