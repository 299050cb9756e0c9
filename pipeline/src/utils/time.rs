//! Time utility functions

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::core::constants::BATCH_TIMESTAMP_FORMAT;

/// Naive layouts accepted for order timestamps that carry no offset (read as UTC).
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an order timestamp.
///
/// RFC 3339 strings keep their offset; naive timestamps and bare dates are
/// taken as UTC. Returns `None` when nothing matches.
pub fn parse_order_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(ts, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse the UTC capture time embedded in a batch file stem (`20240115T103000Z`).
pub fn parse_batch_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, BATCH_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a capture time the way batch file names embed it.
pub fn format_batch_timestamp(dt: DateTime<Utc>) -> String {
    dt.format(BATCH_TIMESTAMP_FORMAT).to_string()
}

/// Parse an IANA timezone name (e.g. `America/New_York`).
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Calendar buckets of a business-local date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarBuckets {
    pub date: NaiveDate,
    /// Monday-to-Sunday span, `2024-01-15/2024-01-21`
    pub week: String,
    /// `2024-01`
    pub month: String,
    /// `2024Q1`
    pub quarter: String,
    pub year: i32,
}

impl CalendarBuckets {
    pub fn for_date(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let sunday = monday + Duration::days(6);
        let quarter = (date.month() - 1) / 3 + 1;

        Self {
            date,
            week: format!("{}/{}", monday.format("%Y-%m-%d"), sunday.format("%Y-%m-%d")),
            month: date.format("%Y-%m").to_string(),
            quarter: format!("{}Q{}", date.year(), quarter),
            year: date.year(),
        }
    }

    /// Localize a UTC instant to `tz` and bucket the resulting calendar day.
    pub fn localized(instant: DateTime<Utc>, tz: Tz) -> (DateTime<Tz>, Self) {
        let local = instant.with_timezone(&tz);
        let buckets = Self::for_date(local.date_naive());
        (local, buckets)
    }
}
