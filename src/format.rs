//! Display formatting helpers for the inbox presentation layer.

use chrono::{DateTime, Utc};

/// Render remaining seconds as `m:ss` (seconds zero-padded, minutes not).
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Human-relative rendering of a message timestamp ("5 minutes ago").
///
/// Returns the input unchanged when it does not parse as RFC3339.
pub fn format_received(timestamp: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };

    let elapsed = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
    let secs = elapsed.num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        plural(elapsed.num_minutes(), "minute")
    } else if secs < 86_400 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
