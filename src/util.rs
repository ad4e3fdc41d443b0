use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Numeric id from the wall-clock milliseconds of `now`.
///
/// When two ids are requested within the same millisecond the second one is
/// bumped past the first, so ids stay unique inside one process. Separate
/// processes can still collide.
pub fn next_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let previous = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(millis.max(last + 1)))
        .unwrap_or_else(|last| last);
    millis.max(previous + 1).to_string()
}

/// Minimal HTML escaping for text substituted into the report template.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
