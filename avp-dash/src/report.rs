//! Plain-text rendering of dashboard data

use std::fmt::Write;

use avp_common::models::{AnalyticsSummary, ImageCard};

/// Stat cards and top objects
pub fn render_summary(summary: &AnalyticsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total Processed:     {}", summary.total_processed);
    let _ = writeln!(out, "Success Rate:        {:.1}%", summary.success_rate);
    let _ = writeln!(out, "Objects Detected:    {}", summary.total_objects_detected);
    let _ = writeln!(out, "Avg Confidence:      {:.1}%", summary.average_confidence);
    let _ = writeln!(out);
    let _ = writeln!(out, "Top Detected Objects");

    if summary.has_no_detections() {
        let _ = writeln!(out, "  No objects detected yet");
        return out;
    }
    for obj in &summary.top_objects {
        let _ = writeln!(
            out,
            "  {:<20} {:>6}  {:>5.1}%",
            obj.name, obj.count, obj.percentage
        );
    }
    out
}

/// Recent-activity list, one line per card
pub fn render_recent(cards: &[ImageCard]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Recent Activity");

    if cards.is_empty() {
        let _ = writeln!(out, "  No images processed yet");
        return out;
    }
    for card in cards {
        let _ = writeln!(
            out,
            "  {:<32} {:<11} {:<19}  {} object(s)",
            card.display_name,
            card.status_label,
            card.display_time,
            card.objects.len()
        );
    }
    out
}

/// Detail view for a single card
pub fn render_detail(card: &ImageCard, analysis_complete: Option<bool>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", card.display_name);
    if let Some(id) = &card.id {
        let _ = writeln!(out, "  id:        {}", id);
    }
    let _ = writeln!(out, "  status:    {}", card.status_label);
    if let Some(complete) = analysis_complete {
        let _ = writeln!(out, "  analysis:  {}", if complete { "complete" } else { "pending" });
    }
    let _ = writeln!(out, "  time:      {}", card.display_time);
    if let Some(url) = &card.detail_image_url {
        let _ = writeln!(out, "  image:     {}", url);
    }
    if let Some(url) = &card.card_image_url {
        let _ = writeln!(out, "  thumbnail: {}", url);
    }

    if card.objects.is_empty() {
        let _ = writeln!(out, "  No objects detected");
    } else {
        let _ = writeln!(out, "  Detected Objects:");
        for obj in &card.objects {
            let _ = writeln!(out, "    {:<24} {:>3}%", obj.name, obj.confidence_pct);
        }
    }
    out
}
