//! Timestamp normalization.
//!
//! Stored timestamps are integer microseconds since the Unix epoch so that
//! range filters and ordering compare numerically in every store.

use chrono::{DateTime, Utc};

/// Returns the timestamp to stamp on a mutation of a record last written at
/// `previous`. Never returns a value at or before `previous`.
pub fn next_timestamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_to_micros(now);
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

/// Drops sub-microsecond precision so a value survives a store round-trip.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(ts.timestamp_micros()).unwrap_or(ts)
}

/// Serde adapter for `DateTime<Utc>` stored as epoch microseconds.
pub mod micros {
    pub use chrono::serde::ts_microseconds::{deserialize, serialize};

    /// Optional variant.
    pub mod option {
        pub use chrono::serde::ts_microseconds_option::{deserialize, serialize};
    }

    /// Clearable PATCH variant; see [`crate::patch`]. `Some(None)` writes
    /// `null`.
    pub mod nullable {
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<Option<DateTime<Utc>>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(Some(ts)) => serializer.serialize_i64(ts.timestamp_micros()),
                _ => serializer.serialize_none(),
            }
        }
    }
}
