//! Time formatting helpers.

use udhaar_types::Timestamp;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Describe `at` relative to `now`, e.g. "in 3d 2h" or "5h 10m ago".
pub fn format_relative(at: Timestamp, now: Timestamp) -> String {
    if at >= now {
        format!("in {}", format_duration(now.elapsed_since(at)))
    } else {
        format!("{} ago", format_duration(at.elapsed_since(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7_260), "2h 1m");
        assert_eq!(format_duration(3 * 86_400 + 7_200), "3d 2h");
    }

    #[test]
    fn relative() {
        let now = Timestamp::new(1_000_000);
        assert_eq!(format_relative(Timestamp::new(1_000_000 + 90), now), "in 1m 30s");
        assert_eq!(format_relative(Timestamp::new(1_000_000 - 7_200), now), "2h 0m ago");
    }
}
