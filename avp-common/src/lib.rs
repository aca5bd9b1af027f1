//! # AVP Common Library
//!
//! Shared code for the AVP (AI Vision Pro) dashboard crates including:
//! - Backend record and analytics models
//! - Record reconciliation (one canonical record per logical image)
//! - Effective timestamp parsing
//! - Backend API wire types
//! - Configuration loading
//! - Event types (DashboardEvent enum) and the EventBus

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod reconcile;
pub mod time;

pub use error::{Error, Result};
pub use models::{Analytics, AnalyticsSummary, DetectedObject, ImageCard, ImageRecord, ProcessingStatus};
pub use config::DashboardConfig;
pub use reconcile::{canonical_key, reconcile};
