use std::time::Duration;

pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// True once more than `timeout` has elapsed since `last_refresh_ms`.
///
/// Callers pass `0` when no refresh was ever recorded, which makes the first
/// check always due. Exactly `timeout` after the last refresh is not yet due.
pub fn is_refresh_due(last_refresh_ms: i64, now_ms: i64, timeout: Duration) -> bool {
    let timeout_ms = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
    last_refresh_ms.saturating_add(timeout_ms) < now_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_461_000_000_000;

    #[test]
    fn never_refreshed_is_due() {
        assert!(is_refresh_due(0, T0, DEFAULT_REFRESH_TIMEOUT));
    }

    #[test]
    fn boundary_is_not_due() {
        let timeout_ms = DEFAULT_REFRESH_TIMEOUT.as_millis() as i64;
        assert!(!is_refresh_due(T0, T0 + timeout_ms, DEFAULT_REFRESH_TIMEOUT));
        assert!(is_refresh_due(T0, T0 + timeout_ms + 1, DEFAULT_REFRESH_TIMEOUT));
    }

    #[test]
    fn recent_refresh_is_not_due() {
        assert!(!is_refresh_due(T0, T0 + 1_000, DEFAULT_REFRESH_TIMEOUT));
        assert!(!is_refresh_due(T0, T0 - 5_000, DEFAULT_REFRESH_TIMEOUT));
    }

    #[test]
    fn huge_timestamps_do_not_overflow() {
        assert!(!is_refresh_due(i64::MAX, i64::MAX, Duration::from_secs(60)));
        assert!(!is_refresh_due(T0, i64::MAX, Duration::MAX));
    }

    #[test]
    fn zero_timeout_is_due_on_any_later_instant() {
        assert!(is_refresh_due(T0, T0 + 1, Duration::ZERO));
        assert!(!is_refresh_due(T0, T0, Duration::ZERO));
    }
}
