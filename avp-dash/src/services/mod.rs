//! Service modules for the dashboard
//!
//! Backend client, upload pipeline (validate → encode → submit) and refresh
//! orchestration.

pub mod api_client;
pub mod encoder;
pub mod file_source;
pub mod file_validator;
pub mod refresh_orchestrator;
pub mod upload_submitter;
pub mod upload_workflow;

pub use api_client::DashboardClient;
pub use encoder::{encode, Base64Payload};
pub use file_source::{FileSource, InMemoryFile, LocalFile};
pub use file_validator::{validate, ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};
pub use refresh_orchestrator::{DashboardSnapshot, RefreshOrchestrator, RefreshReport};
pub use upload_submitter::{UploadOutcome, UploadSubmitter, SUCCESS_SUMMARY};
pub use upload_workflow::{RefreshHandle, UploadAttempt, UploadWorkflow, CANCELLED_MESSAGE};
