//! Display-ready view of an [`ImageRecord`]
//!
//! All presentation fallbacks (`upload_time`/`timestamp`,
//! `thumbnail_url`/`image_url`, status default, confidence rounding) are
//! resolved here once, so rendering code never re-implements them.

use serde::Serialize;

use super::image_record::{DetectedObject, ImageRecord};
use crate::time;

/// Placeholder shown when a record has no usable timestamp
pub const NO_TIMESTAMP_LABEL: &str = "Recently processed";

/// Default number of cards in the recent-activity grid
pub const DEFAULT_RECENT_LIMIT: usize = 12;

/// Detected object with a rounded confidence percentage
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectLabel {
    pub name: String,
    /// Rounded percentage (unparsable confidence → 0)
    pub confidence_pct: i64,
}

impl From<&DetectedObject> for ObjectLabel {
    fn from(obj: &DetectedObject) -> Self {
        let name = obj
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        let confidence = obj.confidence.filter(|c| c.is_finite()).unwrap_or(0.0);
        Self {
            name,
            confidence_pct: confidence.round() as i64,
        }
    }
}

/// Normalized record for grid cards and the detail view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageCard {
    /// Backend identifier, if any
    pub id: Option<String>,
    /// `filename`, else `Image <n>`
    pub display_name: String,
    /// `2024-01-01 10:00:00` form, or [`NO_TIMESTAMP_LABEL`]
    pub display_time: String,
    /// Lower-cased status, `unknown` when absent
    pub status_label: String,
    /// Thumbnail first
    pub card_image_url: Option<String>,
    /// Full image first
    pub detail_image_url: Option<String>,
    pub objects: Vec<ObjectLabel>,
}

impl ImageCard {
    /// Build a card for the record at `index` in the canonical list
    pub fn from_record(record: &ImageRecord, index: usize) -> Self {
        let display_name = record
            .filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Image {}", index + 1));

        let display_time = record
            .effective_timestamp_raw()
            .map(time::display_timestamp)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TIMESTAMP_LABEL.to_string());

        let status_label = record
            .processing_status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            id: record.backend_id(),
            display_name,
            display_time,
            status_label,
            card_image_url: record.card_image_url().map(str::to_string),
            detail_image_url: record.detail_image_url().map(str::to_string),
            objects: record.objects_detected.iter().map(ObjectLabel::from).collect(),
        }
    }
}

/// Cards for the recent-activity grid: the first `limit` canonical records
pub fn recent_cards(records: &[ImageRecord], limit: usize) -> Vec<ImageCard> {
    records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| ImageCard::from_record(r, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ImageRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_card_defaults() {
        let card = ImageCard::from_record(&record(json!({})), 4);
        assert_eq!(card.display_name, "Image 5");
        assert_eq!(card.display_time, NO_TIMESTAMP_LABEL);
        assert_eq!(card.status_label, "unknown");
        assert!(card.card_image_url.is_none());
        assert!(card.objects.is_empty());
    }

    #[test]
    fn test_card_resolves_fallbacks() {
        let card = ImageCard::from_record(
            &record(json!({
                "filename": "dog.png",
                "processing_status": "COMPLETED",
                "timestamp": "2024-02-03T04:05:06.789",
                "image_url": "https://img/full.png",
                "thumbnail_url": "https://img/thumb.png"
            })),
            0,
        );
        assert_eq!(card.display_name, "dog.png");
        assert_eq!(card.display_time, "2024-02-03 04:05:06");
        assert_eq!(card.status_label, "completed");
        assert_eq!(card.card_image_url.as_deref(), Some("https://img/thumb.png"));
        assert_eq!(card.detail_image_url.as_deref(), Some("https://img/full.png"));
    }

    #[test]
    fn test_object_labels_round_confidence() {
        let card = ImageCard::from_record(
            &record(json!({
                "filename": "x.jpg",
                "objects_detected": [
                    {"name": "Car", "confidence": 98.6},
                    {"name": "", "confidence": "12.4"},
                    {"confidence": "n/a"}
                ]
            })),
            0,
        );
        assert_eq!(
            card.objects,
            vec![
                ObjectLabel { name: "Car".into(), confidence_pct: 99 },
                ObjectLabel { name: "Unknown".into(), confidence_pct: 12 },
                ObjectLabel { name: "Unknown".into(), confidence_pct: 0 },
            ]
        );
    }

    #[test]
    fn test_recent_cards_limit() {
        let records: Vec<ImageRecord> = (0..20)
            .map(|i| record(json!({"filename": format!("f{}.jpg", i)})))
            .collect();
        let cards = recent_cards(&records, DEFAULT_RECENT_LIMIT);
        assert_eq!(cards.len(), 12);
        assert_eq!(cards[11].display_name, "f11.jpg");
    }
}
