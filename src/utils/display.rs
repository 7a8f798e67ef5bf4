//! Size and duration formatting shared by both processing flows.

use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rounds to two decimals, the precision sizes are shown and stored at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Byte count to megabytes, rounded to two decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_MB)
}

pub fn format_mb(mb: f64) -> String {
    format!("{:.2} MB", mb)
}

/// `42s` below a minute, `3m7s` otherwise
pub fn format_duration(duration: Duration) -> String {
    format_seconds(duration.as_secs())
}

pub fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}
