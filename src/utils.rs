use std::{cmp::Ordering, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

use crate::{
    error::PipelineError,
    types::{ResultSet, TrackRecord, TrackTableRow},
};

/// Category keys known to the Spotify browse API.
///
/// Not a validation list: any well-formed key is passed through, these are
/// what `categories` prints and `fetch --all` walks.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "toplists",
    "pop",
    "hiphop",
    "rock",
    "latin",
    "edm_dance",
    "indie_alt",
    "rnb",
    "country",
    "metal",
    "jazz",
    "classical",
    "soul",
    "blues",
    "punk",
    "funk",
    "reggae",
    "kpop",
    "afro",
    "arab",
    "desi",
    "caribbean",
    "folk_americana",
    "christian",
    "anime",
    "gaming",
    "kids_family",
    "mood",
    "chill",
    "party",
    "workout",
    "focus",
    "sleep",
    "romance",
    "wellness",
    "travel",
    "at_home",
    "dinner",
    "in_the_car",
    "decades",
    "instrumental",
    "ambient",
    "frequency",
    "equal",
    "pride",
    "radar",
    "comedy",
    "cooking",
    "korean",
    "sessions",
];

/// Trims the category key and rejects keys that cannot be used as-is.
///
/// The key ends up both in a URL path segment and in the output file name,
/// so only ASCII letters, digits, `_` and `-` are accepted. That excludes
/// path separators, query delimiters and `..`.
///
/// # Returns
///
/// The trimmed key, borrowed from the input.
///
/// # Example
///
/// ```ignore
/// assert_eq!(validate_category(" edm_dance ").unwrap(), "edm_dance");
/// assert!(validate_category("../etc").is_err());
/// ```
pub fn validate_category(category: &str) -> Result<&str, PipelineError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidArgument(
            "category cannot be empty".to_string(),
        ));
    }

    if let Some(c) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(PipelineError::InvalidArgument(format!(
            "category '{trimmed}' contains '{c}'. Allowed: letters, digits, '_' and '-'"
        )));
    }
    Ok(trimmed)
}

/// Comma-joins ids for a batched request. Empty ids are left out so the
/// result never carries a leading, doubled or trailing comma.
pub fn join_ids(ids: &[String]) -> String {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Seconds to wait according to a `Retry-After` header, if present and
/// given as a whole number of seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Renders a numeric feature of a track for display, `-` if missing.
pub fn feature_value(record: &TrackRecord, key: &str) -> String {
    record
        .features
        .as_ref()
        .and_then(|f| f.get(key))
        .and_then(Value::as_f64)
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Builds the rows of the `show` table.
///
/// # Arguments
///
/// * `tracks` - Result set of one category
///
/// # Returns
///
/// One row per track, most popular first, with tempo and energy from the
/// attached features (`-` when absent) and whether an analysis is stored.
///
/// # Example
///
/// ```ignore
/// let table = Table::new(track_table_rows(manager.tracks()));
/// println!("{table}");
/// ```
pub fn track_table_rows(tracks: &ResultSet) -> Vec<TrackTableRow> {
    let mut records: Vec<&TrackRecord> = tracks.records().collect();
    sort_records_by_popularity(&mut records);

    records
        .into_iter()
        .map(|r| TrackTableRow {
            name: r.name.clone(),
            popularity: r.popularity,
            tempo: feature_value(r, "tempo"),
            energy: feature_value(r, "energy"),
            analysis: if r.analysis.is_some() { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

/// Most popular first, ties by name.
pub fn sort_records_by_popularity(records: &mut Vec<&TrackRecord>) {
    records.sort_by(|a, b| match b.popularity.cmp(&a.popularity) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
}

/// Starts a steadily ticking spinner for a step of unknown length.
///
/// # Arguments
///
/// * `message` - Text shown next to the spinner
///
/// # Returns
///
/// The running progress bar; call `finish_and_clear` when the step is done.
///
/// # Example
///
/// ```ignore
/// let pb = spinner("Authorizing with Spotify...");
/// let credential = pipeline.authorize().await;
/// pb.finish_and_clear();
/// ```
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
