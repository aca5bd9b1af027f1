//! Backend API request/response types
//!
//! Wire shapes for the four endpoints the dashboard consumes:
//! - `GET  /api/v1/analytics`       → [`crate::models::Analytics`]
//! - `GET  /api/v1/images`          → [`ImageListResponse`]
//! - `GET  /api/v1/images/{id}`     → [`ImageDetailResponse`]
//! - `POST /api/v1/images`          ← [`UploadRequest`]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{lenient, ImageRecord};

/// Backend cap on the list page size
pub const MAX_LIST_LIMIT: u32 = 100;

// ========================================
// Image List
// ========================================

/// Query parameters for `GET /api/v1/images`
///
/// # Examples
///
/// ```
/// use avp_common::api::types::ListImagesQuery;
///
/// let query = ListImagesQuery::default().with_limit(500).with_status("completed");
/// assert_eq!(query.limit, Some(100));
/// assert_eq!(
///     query.to_pairs(),
///     vec![("limit", "100".to_string()), ("status", "completed".to_string())]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListImagesQuery {
    /// Page size, clamped to 1..=100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Opaque pagination cursor from a previous `next_key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
    /// Server-side status filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ListImagesQuery {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.clamp(1, MAX_LIST_LIMIT));
        self
    }

    pub fn with_last_key(mut self, key: impl Into<String>) -> Self {
        self.last_key = Some(key.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Query string pairs, in a stable order, omitting unset fields
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.clamp(1, MAX_LIST_LIMIT).to_string()));
        }
        if let Some(key) = &self.last_key {
            pairs.push(("last_key", key.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }
}

/// Response of `GET /api/v1/images`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageListResponse {
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub images: Vec<ImageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default)]
    pub has_more: bool,
    /// Cursor for the next page, JSON-encoded by the backend
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub next_key: Option<String>,
}

// ========================================
// Image Detail
// ========================================

/// Response of `GET /api/v1/images/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageDetailResponse {
    pub image: ImageRecord,
    #[serde(default)]
    pub analysis_complete: bool,
}

// ========================================
// Upload
// ========================================

/// Body of `POST /api/v1/images`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    pub filename: String,
    /// Standard padded base64 without any data-URI prefix
    pub image_data: String,
}

/// Decoded body of a successful upload, merged with `success: true`
///
/// The backend describes the created record with free-form fields
/// (`image_id`, `filename`, `status`, `message`, ...), kept as a map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UploadResponse {
    /// Build from a decoded JSON body
    ///
    /// Objects are merged; any other JSON value is kept under `body`.
    pub fn from_body(body: Value) -> Self {
        let mut fields = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("body".to_string(), other);
                map
            }
        };
        fields.remove("success");
        Self {
            success: true,
            fields,
        }
    }

    /// A string field from the body
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Extract the `error` message from a raw response body, if present
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<Value>(body)
            .ok()?
            .get("error")
            .and_then(|e| match e {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Null => None,
                Value::String(_) => None,
                other => Some(other.to_string()),
            })
    }
}

// ========================================
// Tests
// ========================================
