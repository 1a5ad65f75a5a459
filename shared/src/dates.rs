//! Timestamp parsing and the long-form date shown on cards and detail pages.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses the date shapes the CMS emits: RFC 3339 timestamps, naive
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and bare `YYYY-MM-DD` dates
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `March 15, 2024`, always rendered in UTC so server and browser agree.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y").to_string()
}

/// Formats an ISO date string; empty or unparseable input yields `""`.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|timestamp| format_timestamp(&timestamp))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_long_form_dates_in_utc() {
        assert_eq!(format_date("2024-03-15"), "March 15, 2024");
        assert_eq!(format_date("2024-03-15T10:30:00.000Z"), "March 15, 2024");
        // 23:30 at -05:00 is already the next day in UTC.
        assert_eq!(format_date("2024-03-15T23:30:00-05:00"), "March 16, 2024");
    }

    #[test]
    fn tolerates_missing_and_garbage_input() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("   "), "");
        assert_eq!(format_date("not a date"), "");
        assert!(parse_timestamp("2024-13-40").is_none());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let parsed = parse_timestamp("2024-01-02T03:04:05").expect("naive timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }
}
