//! # Time Utilities
//!
//! Formatting helpers over chrono timestamps.

use chrono::{DateTime, NaiveDate, Utc};

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Compact `YYYYMMDD` stamp, used in generated invoice numbers.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
