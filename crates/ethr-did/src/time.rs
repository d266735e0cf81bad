//! Time utilities for ethr-did.
//!
//! All instants are Unix epoch seconds (u64) on the ledger clock.

/// Return the current wall-clock time as seconds since Unix epoch.
///
/// Only used to seed ledger clocks; resolution and verification always
/// read the ledger's own instant.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Convert seconds to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: u64) -> String {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX);
    let dt = chrono::DateTime::from_timestamp(secs, 0).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}
