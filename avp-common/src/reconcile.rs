//! Record reconciliation
//!
//! The backend may emit several rows for one logical image: an initial
//! `uploaded` row and a later `completed` row, or duplicate rows from retried
//! webhook deliveries. The dashboard shows one card per image reflecting the
//! most advanced known state, so raw rows are collapsed here.
//!
//! **Algorithm:**
//! 1. Derive the canonical key of each record; drop records whose key is empty
//! 2. Keep one winner per key, in first-seen key order
//! 3. On a repeated key, the winner is `best_of(existing, incoming)`:
//!    higher status rank wins, then the later effective timestamp, and on
//!    equal timestamps the incoming record
//! 4. Sort winners by effective timestamp, most recent first (stable)
//!
//! Reconciliation is pure and recomputed from scratch on every fetch.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::ImageRecord;

/// Extensions whose trailing `name.ext` segment becomes the key
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Counters describing one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Records received
    pub input: usize,
    /// Records dropped for having an empty key
    pub dropped_empty_key: usize,
    /// Records folded into an existing key
    pub merged_duplicates: usize,
    /// Canonical records emitted
    pub output: usize,
}

/// Normalize a filename (or id) into a correlation key
///
/// Lower-cases and trims, then keeps the trailing `name.ext` segment for
/// image extensions. The segment is the longest suffix free of `/` and `_`
/// with at least one character before the extension, so
/// `uploads/1699999_Car.JPG` and `car.jpg` share the key `car.jpg`.
/// Anything else is used whole.
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let trimmed = lower.trim();
    trailing_image_segment(trimmed)
        .unwrap_or(trimmed)
        .to_string()
}

fn trailing_image_segment(s: &str) -> Option<&str> {
    let start = s.rfind(|c: char| c == '/' || c == '_').map(|i| i + 1).unwrap_or(0);
    let segment = &s[start..];

    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || !IMAGE_EXTENSIONS.contains(&ext) {
        return None;
    }
    Some(segment)
}

/// Canonical key of a record: normalized `filename`, else normalized `id`
///
/// An empty string means the record cannot be correlated and is excluded.
pub fn canonical_key(record: &ImageRecord) -> String {
    record
        .correlation_name()
        .map(normalize_name)
        .unwrap_or_default()
}

/// Ordinal rank of a raw status string
pub fn status_rank(status: Option<&str>) -> u8 {
    status
        .map(crate::models::ProcessingStatus::parse)
        .map(|s| s.rank())
        .unwrap_or(0)
}

/// Pick the more informative of two records sharing a key
///
/// Status rank dominates; on a tie the later effective timestamp wins, and
/// equal timestamps favor `b`. The merge loop passes the incoming record as
/// `b`, so the outcome for exact ties depends on input order.
pub fn best_of<'a>(a: &'a ImageRecord, b: &'a ImageRecord) -> &'a ImageRecord {
    if incoming_wins(a, b) {
        b
    } else {
        a
    }
}

fn incoming_wins(existing: &ImageRecord, incoming: &ImageRecord) -> bool {
    let (ra, rb) = (existing.status().rank(), incoming.status().rank());
    if ra != rb {
        return rb > ra;
    }
    incoming.effective_timestamp() >= existing.effective_timestamp()
}

/// Stable sort by effective timestamp, most recent first
///
/// Records without a usable timestamp sort as the epoch, i.e. last.
pub fn sort_by_recency(records: &mut [ImageRecord]) {
    records.sort_by_cached_key(|r| Reverse(r.effective_timestamp()));
}

/// Collapse raw records into one canonical record per key
///
/// See the module docs for the full algorithm.
pub fn reconcile<I>(raw: I) -> Vec<ImageRecord>
where
    I: IntoIterator<Item = ImageRecord>,
{
    reconcile_with_stats(raw).0
}

/// [`reconcile`], also reporting what happened
pub fn reconcile_with_stats<I>(raw: I) -> (Vec<ImageRecord>, ReconcileStats)
where
    I: IntoIterator<Item = ImageRecord>,
{
    let mut stats = ReconcileStats::default();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut winners: Vec<ImageRecord> = Vec::new();

    for record in raw {
        stats.input += 1;

        let key = canonical_key(&record);
        if key.is_empty() {
            stats.dropped_empty_key += 1;
            continue;
        }

        match slots.get(&key) {
            Some(&slot) => {
                stats.merged_duplicates += 1;
                if incoming_wins(&winners[slot], &record) {
                    winners[slot] = record;
                }
            }
            None => {
                slots.insert(key, winners.len());
                winners.push(record);
            }
        }
    }

    sort_by_recency(&mut winners);
    stats.output = winners.len();
    (winners, stats)
}
