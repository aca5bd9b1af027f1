//! Timestamp utilities
//!
//! Backend records carry "ISO-ish" timestamp strings. Some include a zone
//! (`2024-01-01T00:00:00Z`), most do not (`2024-01-01T00:00:00.123456`).
//! Naive values are read as UTC. Anything unparsable maps to the Unix epoch so
//! it sorts as the lowest priority instead of raising an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// The Unix epoch, used for missing or malformed timestamps
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Parse a backend timestamp string
///
/// Returns `None` for empty or unrecognised input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a timestamp, falling back to the epoch
pub fn parse_or_epoch(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or_else(epoch)
}

/// Format a raw timestamp for display: `T` becomes a space, cut to 19 chars
///
/// `2024-05-01T10:20:30.123456` → `2024-05-01 10:20:30`
pub fn display_timestamp(raw: &str) -> String {
    raw.replacen('T', " ", 1).chars().take(19).collect()
}
