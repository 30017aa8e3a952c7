use chrono::{DateTime, Utc};
use std::time::Duration;

/// True when a resource is younger than `older_than`.
///
/// Unknown creation times never exclude.
pub fn too_recent(
    created: Option<DateTime<Utc>>,
    older_than: Option<Duration>,
    now: DateTime<Utc>,
) -> bool {
    let (Some(created), Some(threshold)) = (created, older_than) else {
        return false;
    };
    match (now - created).to_std() {
        Ok(age) => age < threshold,
        // Created in the future (clock skew): younger than any threshold
        Err(_) => true,
    }
}

/// True when `size` falls under the `min_size` threshold.
pub fn too_small(size: u64, min_size: Option<u64>) -> bool {
    min_size.is_some_and(|threshold| size < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn unknown_age_is_never_too_recent() {
        assert!(!too_recent(None, Some(Duration::from_secs(60)), now()));
    }

    #[test]
    fn no_threshold_keeps_everything() {
        assert!(!too_recent(Some(now()), None, now()));
    }

    #[test]
    fn compares_age_with_threshold() {
        let day = Duration::from_secs(86_400);
        let two_days_ago = now() - chrono::Duration::days(2);
        let hour_ago = now() - chrono::Duration::hours(1);

        assert!(!too_recent(Some(two_days_ago), Some(day), now()));
        assert!(too_recent(Some(hour_ago), Some(day), now()));
    }

    #[test]
    fn future_timestamps_are_too_recent() {
        let later = now() + chrono::Duration::minutes(5);
        assert!(too_recent(Some(later), Some(Duration::from_secs(1)), now()));
    }

    #[test]
    fn size_threshold() {
        assert!(too_small(50, Some(100)));
        assert!(!too_small(100, Some(100)));
        assert!(!too_small(0, None));
    }
}
