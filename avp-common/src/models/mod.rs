//! Data models for backend records and analytics

pub mod analytics;
pub mod card;
pub mod image_record;
pub mod lenient;

pub use analytics::{Analytics, AnalyticsSummary, ObjectDetection, ProcessingStats, TopObject};
pub use card::{recent_cards, ImageCard, ObjectLabel};
pub use image_record::{DetectedObject, ImageRecord, ProcessingStatus};
