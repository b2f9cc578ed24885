// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Timestamp layouts and due-date normalization.
//!
//! Due dates are stored as `YYYY-MM-DD HH:MM:SS.mmmZ` in UTC. Filter bounds
//! are rendered as `YYYY-MM-DD HH:MM:SS`, so a plain string comparison in the
//! store orders both layouts correctly.
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Layout of the values the status filters compare `due_date` against.
pub const FILTER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Layout of a persisted `due_date`.
pub const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";
const ISO_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognized date or timestamp")]
pub struct InvalidDate(pub String);

/// What a client sent as a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateInput {
    /// A calendar day without time of day.
    Day(NaiveDate),
    /// A fully resolved instant.
    Instant(DateTime<Utc>),
}

pub fn format_filter_instant(instant: DateTime<Utc>) -> String {
    instant.format(FILTER_FORMAT).to_string()
}

pub fn format_store_instant(instant: DateTime<Utc>) -> String {
    instant.format(STORE_FORMAT).to_string()
}

pub fn format_iso_millis(instant: DateTime<Utc>) -> String {
    instant.format(ISO_MILLIS_FORMAT).to_string()
}

/// Reads back a persisted `due_date`. Returns `None` for the empty string.
pub fn parse_store_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.strip_suffix('Z')?;
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Resolves a wall-clock time in `tz` to UTC.
pub fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Only reachable inside a DST gap.
        None => naive.and_utc(),
    }
}

/// Start of the calendar day containing `now`, as seen from `tz`.
pub fn start_of_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let day = now.with_timezone(tz).date_naive();
    local_to_utc(tz, day.and_time(NaiveTime::MIN))
}

/// Last millisecond of the calendar day containing `now`, as seen from `tz`.
pub fn end_of_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let day = now.with_timezone(tz).date_naive();
    end_of_local_day(day, tz)
}

fn end_of_local_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let last_milli = day.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1);
    local_to_utc(tz, last_milli)
}

/// Parses the due date forms clients send: `YYYY-MM-DD`, RFC 3339, the
/// store layout, or a naive timestamp interpreted in `tz`.
pub fn parse_due_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DueDateInput, InvalidDate> {
    let raw = raw.trim();

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DueDateInput::Day(day));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(DueDateInput::Instant(instant.with_timezone(&Utc)));
    }

    if let Some(instant) = parse_store_instant(raw) {
        return Ok(DueDateInput::Instant(instant));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| DueDateInput::Instant(local_to_utc(tz, naive)))
        .ok_or_else(|| InvalidDate(raw.to_string()))
}

/// Produces the value persisted as `due_date`.
///
/// Without a time of day the date is pushed to 23:59:59.999 of that day in
/// `tz`, so date-only entries stay "due today" until the day is over.
/// A missing or blank input persists as the empty string.
pub fn normalize_due_date<Tz: TimeZone>(
    raw: Option<&str>,
    has_time: bool,
    tz: &Tz,
) -> Result<String, InvalidDate> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(String::new());
    };

    let instant = match (parse_due_date(raw, tz)?, has_time) {
        (DueDateInput::Day(day), false) => end_of_local_day(day, tz),
        (DueDateInput::Instant(instant), false) => {
            end_of_local_day(instant.with_timezone(tz).date_naive(), tz)
        }
        (DueDateInput::Day(day), true) => local_to_utc(tz, day.and_time(NaiveTime::MIN)),
        (DueDateInput::Instant(instant), true) => instant,
    };

    Ok(format_store_instant(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_date_only_is_pushed_to_end_of_day() {
        let stored = normalize_due_date(Some("2024-01-15"), false, &Utc).unwrap();
        assert_eq!(stored, "2024-01-15 23:59:59.999Z");
    }

    #[test]
    fn test_timestamp_without_time_flag_keeps_only_the_day() {
        let stored = normalize_due_date(Some("2024-01-15T08:30:00Z"), false, &Utc).unwrap();
        assert_eq!(stored, "2024-01-15 23:59:59.999Z");
    }

    #[test]
    fn test_end_of_day_follows_configured_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let stored = normalize_due_date(Some("2024-01-15"), false, &tz).unwrap();
        assert_eq!(stored, "2024-01-15 21:59:59.999Z");
    }

    #[test]
    fn test_timed_due_date_is_kept() {
        let stored = normalize_due_date(Some("2024-01-15T08:30:00+01:00"), true, &Utc).unwrap();
        assert_eq!(stored, "2024-01-15 07:30:00.000Z");

        let naive = normalize_due_date(Some("2024-01-15 08:30"), true, &Utc).unwrap();
        assert_eq!(naive, "2024-01-15 08:30:00.000Z");
    }

    #[test]
    fn test_store_layout_is_accepted_back() {
        let stored = normalize_due_date(Some("2024-01-15 07:30:00.000Z"), true, &Utc).unwrap();
        assert_eq!(stored, "2024-01-15 07:30:00.000Z");
        assert_eq!(
            parse_store_instant(&stored),
            Some(utc(2024, 1, 15, 7, 30, 0))
        );
    }

    #[test]
    fn test_missing_due_date_is_empty_string() {
        assert_eq!(normalize_due_date(None, false, &Utc).unwrap(), "");
        assert_eq!(normalize_due_date(Some("  "), true, &Utc).unwrap(), "");
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = normalize_due_date(Some("next tuesday"), false, &Utc).unwrap_err();
        assert_eq!(err, InvalidDate("next tuesday".to_string()));
        assert_eq!(
            err.to_string(),
            "'next tuesday' is not a recognized date or timestamp"
        );
    }

    #[test]
    fn test_day_bounds() {
        let now = utc(2024, 1, 15, 10, 0, 0);
        assert_eq!(start_of_day(now, &Utc), utc(2024, 1, 15, 0, 0, 0));
        assert_eq!(
            format_store_instant(end_of_day(now, &Utc)),
            "2024-01-15 23:59:59.999Z"
        );

        // 10:00 UTC is already the next day at UTC+14.
        let kiribati = FixedOffset::east_opt(14 * 3600).unwrap();
        assert_eq!(start_of_day(now, &kiribati), utc(2024, 1, 15, 10, 0, 0));
    }

    #[test]
    fn test_layouts_compare_as_strings() {
        let stored = format_store_instant(utc(2024, 1, 15, 23, 59, 59));
        let bound = format_filter_instant(utc(2024, 1, 16, 0, 0, 0));
        assert!(stored < bound);
        assert_eq!(format_iso_millis(utc(2024, 1, 16, 0, 0, 0)), "2024-01-16T00:00:00.000Z");
    }
}
