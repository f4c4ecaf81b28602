//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a whole number of hours to a chrono duration
pub fn hours(hours: u32) -> Duration {
    Duration::hours(i64::from(hours))
}

/// True when `last` lies strictly less than `window` before `now`.
///
/// A timestamp in the future (clock skew between writers) counts as fresh.
pub fn is_within(last: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now.signed_duration_since(last) < window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_hours_conversion() {
        assert_eq!(hours(24), Duration::days(1));
        assert_eq!(hours(0), Duration::zero());
    }

    #[test]
    fn test_is_within_window() {
        let now = now();
        let window = hours(24);

        assert!(is_within(now - Duration::hours(23), now, window));
        assert!(is_within(now, now, window));
        assert!(is_within(now + Duration::minutes(5), now, window));
    }

    #[test]
    fn test_window_boundary_is_stale() {
        let now = now();
        let window = hours(24);

        assert!(!is_within(now - Duration::hours(24), now, window));
        assert!(!is_within(now - Duration::days(3), now, window));
    }
}
