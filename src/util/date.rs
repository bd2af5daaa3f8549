use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout the remote service uses, e.g. `2024/01/31T09:15:00Z`.
/// Always UTC; the trailing `Z` is a literal.
const REMOTE_FORMAT: &str = "%Y/%m/%dT%H:%M:%SZ";

/// Parse a remote timestamp string. Anything that doesn't match the service's
/// fixed layout yields `None` — callers must tolerate absent timestamps.
pub fn parse_remote_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, REMOTE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
