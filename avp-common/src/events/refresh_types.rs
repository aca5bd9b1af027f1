//! Refresh-related type definitions

use serde::{Deserialize, Serialize};

/// What started a refresh cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    /// First load of the dashboard
    Startup,
    /// User pressed refresh
    Manual,
    /// One-shot refresh after a successful upload
    PostUpload,
}

impl std::fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshTrigger::Startup => write!(f, "startup"),
            RefreshTrigger::Manual => write!(f, "manual"),
            RefreshTrigger::PostUpload => write!(f, "post-upload"),
        }
    }
}

/// Backend resource fetched during a refresh
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchResource {
    Analytics,
    Images,
}

impl std::fmt::Display for FetchResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchResource::Analytics => write!(f, "analytics"),
            FetchResource::Images => write!(f, "images"),
        }
    }
}
