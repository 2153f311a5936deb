//! Segment key derivation.
//!
//! Decisions, rollups and exploration state are partitioned by a segment: the
//! combination of task category, caller region and delivery channel. The key
//! is a deterministic composite string so that every store can index on it
//! directly.

/// Placeholder for an absent key part.
pub const SEGMENT_DEFAULT_PART: &str = "default";

fn normalize_part(part: Option<&str>) -> String {
    match part.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_ascii_lowercase().replace(':', "-"),
        _ => SEGMENT_DEFAULT_PART.to_string(),
    }
}

/// Compute the segment key for a request.
///
/// Format is `category:region:channel`, each part lowercased and falling back
/// to [`SEGMENT_DEFAULT_PART`] when absent. Identical inputs always produce
/// the identical key.
pub fn segment_key(category: Option<&str>, region: Option<&str>, channel: Option<&str>) -> String {
    format!(
        "{}:{}:{}",
        normalize_part(category),
        normalize_part(region),
        normalize_part(channel)
    )
}
