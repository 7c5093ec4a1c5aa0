//! Local-time display for the queried city.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Format as e.g. "Wednesday, May 1, 2024 3:30 PM".
const DISPLAY_FORMAT: &str = "%A, %B %-d, %Y %-I:%M %p";

/// Format `now` shifted by the city's UTC offset in seconds.
///
/// Pure function of the given instant and offset. An offset outside the
/// representable range (beyond +/- 24h) falls back to UTC rather than
/// failing a fetch that otherwise succeeded.
pub fn local_time_at(now: DateTime<Utc>, timezone_offset_secs: i32) -> String {
    let offset =
        FixedOffset::east_opt(timezone_offset_secs).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).format(DISPLAY_FORMAT).to_string()
}

/// City-local wall clock for "now". Recomputed once per successful
/// current-conditions fetch, never on a ticking clock.
pub fn compute_local_time(timezone_offset_secs: i32) -> String {
    local_time_at(Utc::now(), timezone_offset_secs)
}
