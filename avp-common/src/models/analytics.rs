//! Aggregate analytics reported by `GET /api/v1/analytics`
//!
//! Every field is optional on the wire; absent values read as zero/empty so a
//! partially populated backend still renders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Top-level analytics document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Analytics {
    #[serde(default, deserialize_with = "lenient::default_on_null")]
    pub processing_stats: ProcessingStats,
    #[serde(default, deserialize_with = "lenient::default_on_null")]
    pub object_detection: ObjectDetection,
    /// Any additional sections, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Processing throughput figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProcessingStats {
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub total_processed: u64,
    /// Percentage, 0-100
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub success_rate: f64,
}

/// Object detection figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ObjectDetection {
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub total_objects_detected: u64,
    /// Percentage, 0-100
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub average_confidence: f64,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub top_objects: Vec<TopObject>,
}

/// A frequently detected label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TopObject {
    #[serde(default, deserialize_with = "lenient::default_on_null")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub count: u64,
    /// Share of all detections, 0-100
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub percentage: f64,
}

/// Stat-card view of [`Analytics`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsSummary {
    pub total_processed: u64,
    pub success_rate: f64,
    pub total_objects_detected: u64,
    pub average_confidence: f64,
    /// Leading entries of `top_objects`, at most the configured limit
    pub top_objects: Vec<TopObject>,
}

impl AnalyticsSummary {
    /// Default number of top objects shown
    pub const DEFAULT_TOP_OBJECTS: usize = 8;

    /// Summarize analytics, keeping at most `top_limit` top objects
    pub fn from_analytics(analytics: &Analytics, top_limit: usize) -> Self {
        Self {
            total_processed: analytics.processing_stats.total_processed,
            success_rate: analytics.processing_stats.success_rate,
            total_objects_detected: analytics.object_detection.total_objects_detected,
            average_confidence: analytics.object_detection.average_confidence,
            top_objects: analytics
                .object_detection
                .top_objects
                .iter()
                .take(top_limit)
                .cloned()
                .collect(),
        }
    }

    /// True when there is nothing to list under "Top Detected Objects"
    pub fn has_no_detections(&self) -> bool {
        self.top_objects.is_empty()
    }
}

impl From<&Analytics> for AnalyticsSummary {
    fn from(analytics: &Analytics) -> Self {
        Self::from_analytics(analytics, Self::DEFAULT_TOP_OBJECTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_defaults_to_zero() {
        let analytics: Analytics = serde_json::from_value(json!({})).unwrap();
        let summary = AnalyticsSummary::from(&analytics);
        assert_eq!(summary.total_processed, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.has_no_detections());
    }

    #[test]
    fn test_null_sections_default() {
        let analytics: Analytics =
            serde_json::from_value(json!({"processing_stats": null, "object_detection": null})).unwrap();
        assert_eq!(analytics.processing_stats, ProcessingStats::default());
    }

    #[test]
    fn test_full_document() {
        let analytics: Analytics = serde_json::from_value(json!({
            "processing_stats": {"total_processed": 42, "success_rate": 97.6},
            "object_detection": {
                "total_objects_detected": 310,
                "average_confidence": "88.4",
                "top_objects": [
                    {"name": "person", "count": 50, "percentage": 16.1},
                    {"name": "car", "count": 40, "percentage": 12.9}
                ]
            },
            "generated_at": "2024-01-01T00:00:00"
        }))
        .unwrap();

        let summary = AnalyticsSummary::from(&analytics);
        assert_eq!(summary.total_processed, 42);
        assert_eq!(summary.average_confidence, 88.4);
        assert_eq!(summary.top_objects[0].name, "person");
        assert_eq!(analytics.extra["generated_at"], "2024-01-01T00:00:00");
    }

    #[test]
    fn test_top_objects_truncated_to_limit() {
        let top: Vec<Value> = (0..12)
            .map(|i| json!({"name": format!("obj{}", i), "count": 12 - i, "percentage": 1.0}))
            .collect();
        let analytics: Analytics =
            serde_json::from_value(json!({"object_detection": {"top_objects": top}})).unwrap();

        let summary = AnalyticsSummary::from(&analytics);
        assert_eq!(summary.top_objects.len(), 8);
        assert_eq!(summary.top_objects[7].name, "obj7");

        let summary = AnalyticsSummary::from_analytics(&analytics, 3);
        assert_eq!(summary.top_objects.len(), 3);
    }
}
