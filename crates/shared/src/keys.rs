//! Preference-store keys shared between the controller and tooling.

/// Wall-clock millis of the last successful session fetch.
pub const LAST_REFRESH_TIMESTAMP: &str = "lastRefreshTimestamp";
/// JSON array of `ConferenceEntry`, overwritten on every successful refresh.
pub const SESSIONS_CACHE_BLOB: &str = "sessionsCacheBlob";
/// Number of schedule screen activations.
pub const OPENING_APP_COUNT: &str = "openingAppCount";
