//! Display formatting for article publication timestamps.
//!
//! The news API nominally returns RFC 3339 timestamps, but syndicated
//! sources leak other shapes through. [`format_published_at`] tries a short
//! fallback chain before giving up.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MEDIUM_DATE: &str = "%b %-d, %Y";

/// Render a `publishedAt` value as a medium date such as `May 6, 2025`.
///
/// Tries, in order: RFC 3339 with offset, naive `YYYY-MM-DDTHH:MM:SS`
/// (fractional seconds allowed), bare `YYYY-MM-DD`.
pub fn format_published_at(published_at: Option<&str>) -> String {
    let Some(raw) = published_at.map(str::trim) else {
        return "Unknown date".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format(MEDIUM_DATE).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().format(MEDIUM_DATE).to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format(MEDIUM_DATE).to_string();
    }

    tracing::debug!(raw, "Unparseable publishedAt");
    "Invalid date format".to_string()
}
