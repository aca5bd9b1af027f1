//! Upload submission
//!
//! Turns a single `POST /api/v1/images` into an [`UploadOutcome`]. Every
//! failure mode (non-2xx, transport error, undecodable body) becomes a
//! failure outcome; nothing is raised past this point.

use avp_common::api::{UploadRequest, UploadResponse};
use serde::Serialize;
use tracing::{info, warn};

use super::api_client::DashboardClient;
use super::encoder::Base64Payload;

/// Summary shown after a successful upload
pub const SUCCESS_SUMMARY: &str = "Upload successful! Processing will complete in ~30 seconds.";

/// Result of one upload submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    /// Server message on success, error text on failure
    pub message: String,
    /// Decoded success body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<UploadResponse>,
}

impl UploadOutcome {
    pub fn succeeded(body: UploadResponse) -> Self {
        let message = body
            .field_str("message")
            .unwrap_or("Upload accepted")
            .to_string();
        Self {
            success: true,
            message,
            body: Some(body),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            body: None,
        }
    }

    /// One-line user-facing summary
    pub fn summary(&self) -> String {
        if self.success {
            SUCCESS_SUMMARY.to_string()
        } else {
            format!("Upload failed: {}", self.message)
        }
    }
}

/// Submits encoded uploads to the backend
#[derive(Debug, Clone)]
pub struct UploadSubmitter {
    client: DashboardClient,
}

impl UploadSubmitter {
    pub fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// Send one upload and report the outcome
    pub async fn submit(&self, filename: &str, payload: &Base64Payload) -> UploadOutcome {
        let request = UploadRequest {
            filename: filename.to_string(),
            image_data: payload.as_str().to_string(),
        };

        match self.client.upload_image(&request).await {
            Ok(body) => {
                info!(filename = %filename, image_id = ?body.field_str("image_id"), "Upload accepted");
                UploadOutcome::succeeded(body)
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "Upload failed");
                UploadOutcome::failed(e.user_message())
            }
        }
    }
}
