//! Timestamp and calendar-date encoding.
//!
//! Instants are stored as fixed-width UTC strings so that lexicographic order
//! matches chronological order in SQL comparisons.

use chrono::{DateTime, NaiveDate, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Encode an instant for storage.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Encode a local calendar date for storage (`YYYY-MM-DD`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
