//! Backend image processing records
//!
//! One `ImageRecord` per processing attempt, exactly as the backend reports it.
//! Several records may describe the same logical image (an `uploaded` row
//! followed by a `completed` row, retried webhook deliveries, ...); see
//! [`crate::reconcile`] for how they are collapsed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;
use crate::time;

/// Processing status reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Uploaded,
    Processing,
    Completed,
    /// Missing, empty, or any status this client does not know
    Unknown,
}

impl ProcessingStatus {
    /// Parse a raw status string, case-insensitively
    ///
    /// Whitespace is significant: `" completed"` is not a known status.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "uploaded" => ProcessingStatus::Uploaded,
            "processing" => ProcessingStatus::Processing,
            "completed" => ProcessingStatus::Completed,
            _ => ProcessingStatus::Unknown,
        }
    }

    /// Ordinal priority used to pick the more informative duplicate
    ///
    /// `completed(3) > processing(2) > uploaded(1) > unknown(0)`
    pub fn rank(&self) -> u8 {
        match self {
            ProcessingStatus::Completed => 3,
            ProcessingStatus::Processing => 2,
            ProcessingStatus::Uploaded => 1,
            ProcessingStatus::Unknown => 0,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Uploaded => write!(f, "uploaded"),
            ProcessingStatus::Processing => write!(f, "processing"),
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single object label detected in an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DetectedObject {
    /// Label name (e.g. "Car")
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    /// Confidence percentage, 0-100
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub confidence: Option<f64>,
}

/// One backend row describing a processing attempt for an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImageRecord {
    /// Opaque identifier
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Original filename; primary correlation key
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Raw processing status as sent by the backend
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<String>,
    /// Upload timestamp (preferred over `timestamp`)
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<String>,
    /// Generic timestamp
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Full-size image URL (usually presigned)
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Thumbnail URL (usually presigned)
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Detected object labels, in backend order
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub objects_detected: Vec<DetectedObject>,
    /// Every other field the backend sent, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Treat `""` like a missing value
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ImageRecord {
    /// Parsed processing status
    pub fn status(&self) -> ProcessingStatus {
        self.processing_status
            .as_deref()
            .map(ProcessingStatus::parse)
            .unwrap_or(ProcessingStatus::Unknown)
    }

    /// Name used for correlation: `filename`, else `id`
    ///
    /// An empty filename falls through to `id`; a whitespace-only one does not.
    pub fn correlation_name(&self) -> Option<&str> {
        non_empty(&self.filename).or_else(|| non_empty(&self.id))
    }

    /// Raw effective timestamp text: `upload_time`, else `timestamp`
    pub fn effective_timestamp_raw(&self) -> Option<&str> {
        non_empty(&self.upload_time).or_else(|| non_empty(&self.timestamp))
    }

    /// Effective timestamp; missing or malformed values are the epoch
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        time::parse_or_epoch(self.effective_timestamp_raw())
    }

    /// Identifier accepted by `GET /api/v1/images/{id}`
    ///
    /// The list endpoint reports the table key as `image_id`.
    pub fn backend_id(&self) -> Option<String> {
        non_empty(&self.id).map(str::to_string).or_else(|| {
            match self.extra.get("image_id") {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            }
        })
    }

    /// URL for a grid card: thumbnail first
    pub fn card_image_url(&self) -> Option<&str> {
        non_empty(&self.thumbnail_url).or_else(|| non_empty(&self.image_url))
    }

    /// URL for the detail view: full image first
    pub fn detail_image_url(&self) -> Option<&str> {
        non_empty(&self.image_url).or_else(|| non_empty(&self.thumbnail_url))
    }
}
